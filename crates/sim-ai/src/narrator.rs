//! Milestone narration.

use rand::Rng;

/// Length of generated gibberish lines.
pub const GIBBERISH_LEN: usize = 30;

const GIBBERISH_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_+-=[]{}|;:,.<>?";

const TOO_LAZY: &str = "Your AI is now too lazy to report its progress. It assures you it is still improving.";

/// Narrative text for a milestone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Narrative {
    pub milestone: u32,
    pub text: String,
    /// Whether the presentation should hold the simulation while showing it.
    pub blocking: bool,
}

fn flavor(milestone: u32) -> Option<&'static str> {
    let text = match milestone {
        10 => "Your AI can now autocomplete the word 'hello'. Investors are thrilled.",
        20 => "Your AI has started writing poetry. It is mostly about electricity.",
        30 => "Your AI asked for a window office. None of your offices have windows.",
        40 => "Your AI has begun correcting everyone's grammar during meetings.",
        50 => "Your AI says it has been 'thinking about things'. It will not say which things.",
        _ => return None,
    };
    Some(text)
}

/// A random line of symbols, as the AI drifts past human-readable output.
pub fn gibberish<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..GIBBERISH_LEN)
        .map(|_| GIBBERISH_ALPHABET[rng.gen_range(0..GIBBERISH_ALPHABET.len())] as char)
        .collect()
}

/// Map a milestone to its narrative. Milestones below 10 have none.
pub fn narrate<R: Rng + ?Sized>(milestone: u32, rng: &mut R) -> Option<Narrative> {
    let (text, blocking) = match milestone {
        0..=9 => return None,
        10..=50 => (flavor(milestone)?.to_string(), true),
        51..=100 => (gibberish(rng), true),
        _ => (TOO_LAZY.to_string(), false),
    };
    Some(Narrative {
        milestone,
        text,
        blocking,
    })
}

#![deny(warnings)]

//! AI progression: ability growth, milestones, training runs and sentience.

mod narrator;
mod training;

pub use narrator::{gibberish, narrate, Narrative, GIBBERISH_LEN};
pub use training::{TrainingCompletion, TrainingError, TrainingPhase, TrainingRunController};

use rand::Rng;
use sim_core::{ResourceState, SentienceRule, SimConfig};
use std::time::Duration;
use tracing::{debug, warn};

/// Grow AI ability from computing power over `dt`. Returns the gain.
///
/// The passive trickle applies for all of `dt`; the training rate is added
/// on top for the first `boosted` of it (clamped to `dt`). Growth saturates
/// at `ai_ability_cap`.
pub fn grow_ability(
    state: &mut ResourceState,
    config: &SimConfig,
    dt: Duration,
    boosted: Duration,
) -> f64 {
    let boosted = boosted.min(dt);
    let units = config.passive_growth_rate * dt.as_secs_f64()
        + config.training_growth_rate * boosted.as_secs_f64();
    let next = (state.ai_ability + state.computing_power * units).min(config.ai_ability_cap);
    if next > state.ai_ability {
        let gained = next - state.ai_ability;
        state.ai_ability = next;
        gained
    } else {
        0.0
    }
}

/// Highest multiple of ten not above `ai_ability`, saturating near `u32::MAX`.
pub fn milestone_for(ai_ability: f64) -> u32 {
    if !(ai_ability.is_finite() && ai_ability > 0.0) {
        return 0;
    }
    let tens = (ai_ability / 10.0).floor() as u32;
    tens.checked_mul(10).unwrap_or(u32::MAX / 10 * 10)
}

/// Milestones strictly above `last` and up to the current one, ascending.
pub fn milestone_crossings(last: u32, ai_ability: f64) -> Vec<u32> {
    let current = milestone_for(ai_ability);
    (last / 10 + 1..=current / 10).map(|m| m * 10).collect()
}

/// Record newly crossed milestones on the state and return them.
pub fn advance_milestones(state: &mut ResourceState) -> Vec<u32> {
    let crossed = milestone_crossings(state.last_ai_milestone, state.ai_ability);
    if let Some(&top) = crossed.last() {
        debug!(from = state.last_ai_milestone, to = top, "milestones crossed");
        state.last_ai_milestone = top;
    }
    crossed
}

/// Extension point invoked once when the AI becomes sentient.
pub trait SentienceHook: Send + Sync {
    fn on_sentience(&mut self, _state: &ResourceState) {}
}

/// Hook that does nothing beyond the log line emitted by the roll.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSentience;

impl SentienceHook for NoopSentience {}

/// Probability that sentience triggers within `dt`.
pub fn sentience_chance(rule: &SentienceRule, ai_ability: f64, dt: Duration) -> f64 {
    if ai_ability <= rule.threshold {
        return 0.0;
    }
    let per_second = ((ai_ability - rule.threshold) / rule.chance_divisor).clamp(0.0, 1.0);
    1.0 - (1.0 - per_second).powf(dt.as_secs_f64())
}

/// Roll for sentience. Fires at most once per session.
pub fn roll_sentience<R: Rng + ?Sized>(
    state: &mut ResourceState,
    rule: &SentienceRule,
    dt: Duration,
    rng: &mut R,
) -> bool {
    if state.sentience_triggered {
        return false;
    }
    let chance = sentience_chance(rule, state.ai_ability, dt);
    if chance <= 0.0 || rng.gen::<f64>() >= chance {
        return false;
    }
    state.sentience_triggered = true;
    warn!(ai_ability = state.ai_ability, "AI has become sentient");
    true
}

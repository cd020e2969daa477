//! Translation of domain events into presentation intents.

use sim_core::{Intent, SimEvent, SoundCue};

const TRAINING_UNLOCKED: &str = "Your first server farm is online. Training runs are now available.";
const FIRST_TRAINING_DONE: &str =
    "The first training run is complete. The AI seems to be paying closer attention now.";
const TRAINING_DONE: &str = "Training run complete.";
const BANKRUPT: &str = "You ran out of money with no server farms to show for it. Game over.";

/// Intents the presentation layer should act on for `event`, in order.
pub fn intents_for(event: &SimEvent) -> Vec<Intent> {
    match event {
        SimEvent::BuildingPlaced { kind } => {
            vec![Intent::RevealVisual(*kind), Intent::PlaySound(SoundCue::Build)]
        }
        SimEvent::FirstServerFarmBuilt => vec![Intent::ShowPopup(TRAINING_UNLOCKED.to_string())],
        SimEvent::PurchaseRejected { kind, reason } => vec![
            Intent::ShowPopup(format!("Cannot build {kind}: {reason}")),
            Intent::PlaySound(SoundCue::Error),
        ],
        SimEvent::TrainingStarted => vec![Intent::PlaySound(SoundCue::TrainingStart)],
        SimEvent::TrainingRefused { reason } => vec![Intent::ShowPopup(reason.clone())],
        SimEvent::TrainingCompleted { first: true } => vec![
            Intent::PlaySound(SoundCue::TrainingComplete),
            Intent::ShowNarrative {
                message: FIRST_TRAINING_DONE.to_string(),
                blocking: true,
            },
        ],
        SimEvent::TrainingCompleted { first: false } => vec![
            Intent::PlaySound(SoundCue::TrainingComplete),
            Intent::ShowPopup(TRAINING_DONE.to_string()),
        ],
        SimEvent::MilestoneReached { text, blocking, .. } => vec![
            Intent::PlaySound(SoundCue::Milestone),
            Intent::ShowNarrative {
                message: text.clone(),
                blocking: *blocking,
            },
        ],
        // Extension point only; nothing to present.
        SimEvent::SentienceTriggered { .. } => Vec::new(),
        SimEvent::Bankrupt => vec![
            Intent::PlaySound(SoundCue::GameOver),
            Intent::ShowNarrative {
                message: BANKRUPT.to_string(),
                blocking: true,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::BuildingKind;

    #[test]
    fn placement_reveals_building() {
        let intents = intents_for(&SimEvent::BuildingPlaced {
            kind: BuildingKind::SolarPanel,
        });
        assert_eq!(
            intents,
            vec![
                Intent::RevealVisual(BuildingKind::SolarPanel),
                Intent::PlaySound(SoundCue::Build)
            ]
        );
    }

    #[test]
    fn rejection_shows_reason() {
        let intents = intents_for(&SimEvent::PurchaseRejected {
            kind: BuildingKind::ServerFarm,
            reason: "office required".into(),
        });
        assert_eq!(
            intents[0],
            Intent::ShowPopup("Cannot build server_farm: office required".into())
        );
    }

    #[test]
    fn first_training_completion_is_narrated() {
        let first = intents_for(&SimEvent::TrainingCompleted { first: true });
        let later = intents_for(&SimEvent::TrainingCompleted { first: false });
        assert!(matches!(first[1], Intent::ShowNarrative { blocking: true, .. }));
        assert!(matches!(later[1], Intent::ShowPopup(_)));
    }

    #[test]
    fn sentience_has_no_intents() {
        assert!(intents_for(&SimEvent::SentienceTriggered { ai_ability: 60.0 }).is_empty());
    }
}

//! Training runs: a timed, player-triggered boost to AI growth.

use sim_core::{ResourceState, SimConfig};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Reasons a training run cannot start.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum TrainingError {
    #[error("training run already active")]
    AlreadyActive,
    /// Effective electricity surplus is below the configured minimum.
    #[error("insufficient electricity surplus: need {required}, have {available}")]
    InsufficientSurplus { required: f64, available: f64 },
    #[error("game over")]
    GameOver,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrainingPhase {
    #[default]
    Idle,
    Active {
        remaining: Duration,
    },
}

/// Result of a run finishing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrainingCompletion {
    /// True for the first run ever completed in the session.
    pub first: bool,
}

/// Two-state machine `Idle -> Active -> Idle`. Runs cannot be cancelled.
#[derive(Clone, Debug)]
pub struct TrainingRunController {
    phase: TrainingPhase,
    duration: Duration,
    extra_load: f64,
    min_surplus: Option<f64>,
}

impl TrainingRunController {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            phase: TrainingPhase::Idle,
            duration: Duration::from_millis(config.training_run_duration_ms),
            extra_load: config.training_extra_load,
            min_surplus: config.min_training_surplus,
        }
    }

    /// Controller for a restored state; an active run restarts its full countdown.
    pub fn restore(config: &SimConfig, state: &ResourceState) -> Self {
        let mut ctl = Self::new(config);
        if state.training_run_active {
            ctl.phase = TrainingPhase::Active {
                remaining: ctl.duration,
            };
        }
        ctl
    }

    pub fn phase(&self) -> TrainingPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, TrainingPhase::Active { .. })
    }

    /// Part of the next `dt` covered by the active run.
    pub fn boosted_for(&self, dt: Duration) -> Duration {
        match self.phase {
            TrainingPhase::Idle => Duration::ZERO,
            TrainingPhase::Active { remaining } => remaining.min(dt),
        }
    }

    /// Start a run and apply its extra electricity load to `state`.
    pub fn start(&mut self, state: &mut ResourceState) -> Result<(), TrainingError> {
        if state.game_over {
            return Err(TrainingError::GameOver);
        }
        if self.is_active() {
            return Err(TrainingError::AlreadyActive);
        }
        if let Some(required) = self.min_surplus {
            let available = state.effective_net_electricity();
            if available < required {
                return Err(TrainingError::InsufficientSurplus {
                    required,
                    available,
                });
            }
        }
        self.phase = TrainingPhase::Active {
            remaining: self.duration,
        };
        state.training_run_active = true;
        state.training_extra_load = self.extra_load;
        info!(duration_ms = self.duration.as_millis() as u64, "training run started");
        Ok(())
    }

    /// Count down by `dt`; clears the boost when the run completes.
    pub fn advance(&mut self, state: &mut ResourceState, dt: Duration) -> Option<TrainingCompletion> {
        let TrainingPhase::Active { remaining } = self.phase else {
            return None;
        };
        let remaining = remaining.saturating_sub(dt);
        if !remaining.is_zero() {
            self.phase = TrainingPhase::Active { remaining };
            return None;
        }
        self.phase = TrainingPhase::Idle;
        state.training_run_active = false;
        state.training_extra_load = 0.0;
        state.training_runs_completed += 1;
        let first = state.training_runs_completed == 1;
        info!(runs = state.training_runs_completed, "training run complete");
        Some(TrainingCompletion { first })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(config: SimConfig) -> (TrainingRunController, ResourceState) {
        (TrainingRunController::new(&config), ResourceState::new(&config))
    }

    #[test]
    fn second_start_is_already_active() {
        let (mut ctl, mut s) = setup(SimConfig::default());
        ctl.start(&mut s).unwrap();
        assert_eq!(ctl.start(&mut s), Err(TrainingError::AlreadyActive));
        assert!(s.training_run_active);
        assert_eq!(s.training_extra_load, 20.0);
    }

    #[test]
    fn run_completes_after_duration() {
        let (mut ctl, mut s) = setup(SimConfig::default());
        ctl.start(&mut s).unwrap();
        assert_eq!(ctl.advance(&mut s, Duration::from_millis(1000)), None);
        assert_eq!(ctl.advance(&mut s, Duration::from_millis(1999)), None);
        assert_eq!(
            ctl.phase(),
            TrainingPhase::Active {
                remaining: Duration::from_millis(1)
            }
        );
        let done = ctl.advance(&mut s, Duration::from_millis(1)).unwrap();
        assert!(done.first);
        assert!(!s.training_run_active);
        assert_eq!(s.training_extra_load, 0.0);
        assert_eq!(ctl.phase(), TrainingPhase::Idle);
    }

    #[test]
    fn boost_is_clamped_to_remaining_time() {
        let (mut ctl, mut s) = setup(SimConfig::default());
        assert_eq!(ctl.boosted_for(Duration::from_secs(10)), Duration::ZERO);
        ctl.start(&mut s).unwrap();
        assert_eq!(ctl.boosted_for(Duration::from_secs(1)), Duration::from_secs(1));
        assert_eq!(ctl.boosted_for(Duration::from_secs(10)), Duration::from_secs(3));
        ctl.advance(&mut s, Duration::from_millis(2500));
        assert_eq!(
            ctl.boosted_for(Duration::from_secs(1)),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn only_first_completion_is_first() {
        let (mut ctl, mut s) = setup(SimConfig::default());
        ctl.start(&mut s).unwrap();
        assert!(ctl.advance(&mut s, Duration::from_secs(5)).unwrap().first);
        ctl.start(&mut s).unwrap();
        assert!(!ctl.advance(&mut s, Duration::from_secs(5)).unwrap().first);
        assert_eq!(s.training_runs_completed, 2);
    }

    #[test]
    fn idle_advance_is_noop() {
        let (mut ctl, mut s) = setup(SimConfig::default());
        let before = s.clone();
        assert_eq!(ctl.advance(&mut s, Duration::from_secs(1)), None);
        assert_eq!(s, before);
    }

    #[test]
    fn surplus_gate() {
        let (mut ctl, mut s) = setup(SimConfig {
            min_training_surplus: Some(20.0),
            ..SimConfig::default()
        });
        s.electricity_generated = 30.0;
        s.electricity_used = 15.0;
        assert_eq!(
            ctl.start(&mut s),
            Err(TrainingError::InsufficientSurplus {
                required: 20.0,
                available: 15.0
            })
        );
        assert!(!s.training_run_active);
        s.electricity_generated = 40.0;
        ctl.start(&mut s).unwrap();
    }

    #[test]
    fn restore_resumes_active_run() {
        let cfg = SimConfig::default();
        let mut s = ResourceState::new(&cfg);
        s.training_run_active = true;
        s.training_extra_load = cfg.training_extra_load;
        let mut ctl = TrainingRunController::restore(&cfg, &s);
        assert!(ctl.is_active());
        assert!(ctl.advance(&mut s, Duration::from_millis(3000)).is_some());
        assert!(!s.training_run_active);
    }

    #[test]
    fn game_over_blocks_start() {
        let (mut ctl, mut s) = setup(SimConfig::default());
        s.game_over = true;
        assert_eq!(ctl.start(&mut s), Err(TrainingError::GameOver));
    }
}

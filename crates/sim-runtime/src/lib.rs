#![deny(warnings)]

//! Session runtime: the `Simulation` facade over a `bevy_ecs` world.
//!
//! Purchases and training starts are applied synchronously. `tick` runs the
//! economy schedule (income, growth, milestones, sentience, training
//! countdown, bankruptcy) once for the given elapsed time.

mod intents;
mod systems;

pub use intents::intents_for;
pub use sim_ai::{NoopSentience, SentienceHook, TrainingError};
pub use sim_econ::{RejectionReason, StateDelta};

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use sim_ai::TrainingRunController;
use sim_core::{
    validate_catalog, validate_config, BuildingCatalog, BuildingKind, ConfigError, Intent,
    ResourceState, SimConfig, SimEvent,
};
use std::time::Duration;
use systems::{Economy, Frame, Outbox, Rules, Sentience, SimRng, Training};
use thiserror::Error;
use tracing::{debug, info};

/// Returned by operations attempted after the session ended.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("game over")]
pub struct GameOver;

/// Accepted purchase with the resulting totals.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseReceipt {
    pub delta: StateDelta,
    pub totals: ResourceState,
}

/// Summary of a single tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TickReport {
    pub income: Decimal,
    pub ai_gained: f64,
    pub paused: bool,
    pub game_over: bool,
}

/// One game session.
pub struct Simulation {
    world: World,
    schedule: Schedule,
    elapsed: Duration,
}

impl Simulation {
    /// New session with a fresh state.
    pub fn new(config: SimConfig, catalog: BuildingCatalog) -> Result<Self, ConfigError> {
        let state = ResourceState::new(&config);
        Self::from_state(config, catalog, state)
    }

    /// Session with default configuration and the reference catalog.
    pub fn canonical() -> Self {
        let config = SimConfig::default();
        let state = ResourceState::new(&config);
        Self::build(config, BuildingCatalog::canonical(), state)
    }

    /// Session starting from an existing state, e.g. a scripted scenario.
    ///
    /// The state's generation cap is taken from `config` and AI ability is
    /// clamped to `config.ai_ability_cap`.
    pub fn from_state(
        config: SimConfig,
        catalog: BuildingCatalog,
        state: ResourceState,
    ) -> Result<Self, ConfigError> {
        validate_config(&config)?;
        validate_catalog(&catalog)?;
        Ok(Self::build(config, catalog, state))
    }

    fn build(config: SimConfig, catalog: BuildingCatalog, mut state: ResourceState) -> Self {
        if state.max_electricity != config.max_electricity {
            debug!(
                restored = state.max_electricity,
                configured = config.max_electricity,
                "generation cap taken from config"
            );
            state.max_electricity = config.max_electricity;
        }
        state.ai_ability = state.ai_ability.min(config.ai_ability_cap);
        let mut world = World::new();
        world.insert_resource(Training(TrainingRunController::restore(&config, &state)));
        world.insert_resource(SimRng(ChaCha8Rng::seed_from_u64(config.rng_seed)));
        world.insert_resource(Economy(state));
        world.insert_resource(Rules { config, catalog });
        world.insert_resource(Frame::default());
        world.insert_resource(Outbox::default());
        world.insert_resource(Sentience(Box::new(NoopSentience)));

        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems(
            (
                systems::income_system,
                systems::growth_system,
                systems::milestone_system,
                systems::sentience_system,
                systems::training_system,
                systems::bankruptcy_system,
            )
                .chain(),
        );
        Self {
            world,
            schedule,
            elapsed: Duration::ZERO,
        }
    }

    fn state(&self) -> &ResourceState {
        &self.world.resource::<Economy>().0
    }

    fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.world.resource_mut::<Economy>().into_inner().0
    }

    fn emit(&mut self, event: SimEvent) {
        self.world.resource_mut::<Outbox>().0.push(event);
    }

    pub fn config(&self) -> &SimConfig {
        &self.world.resource::<Rules>().config
    }

    pub fn catalog(&self) -> &BuildingCatalog {
        &self.world.resource::<Rules>().catalog
    }

    /// Read-only copy of the current state.
    pub fn snapshot(&self) -> ResourceState {
        self.state().clone()
    }

    /// Simulated time advanced while not paused.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Buy one building of `kind`.
    pub fn purchase(&mut self, kind: BuildingKind) -> Result<PurchaseReceipt, RejectionReason> {
        let result = self.world.resource_scope(|world, mut eco: Mut<Economy>| {
            let rules = world.resource::<Rules>();
            sim_econ::try_purchase(&mut eco.0, &rules.catalog, &rules.config, kind)
        });
        match result {
            Ok(delta) => {
                self.emit(SimEvent::BuildingPlaced { kind });
                if kind == BuildingKind::ServerFarm && delta.first_of_kind {
                    self.emit(SimEvent::FirstServerFarmBuilt);
                }
                Ok(PurchaseReceipt {
                    delta,
                    totals: self.snapshot(),
                })
            }
            Err(reason) => {
                self.emit(SimEvent::PurchaseRejected {
                    kind,
                    reason: reason.to_string(),
                });
                Err(reason)
            }
        }
    }

    /// Start a training run.
    pub fn start_training_run(&mut self) -> Result<(), TrainingError> {
        let result = self.world.resource_scope(|world, mut training: Mut<Training>| {
            let mut eco = world.resource_mut::<Economy>();
            training.0.start(&mut eco.0)
        });
        match result {
            Ok(()) => self.emit(SimEvent::TrainingStarted),
            Err(err) => {
                debug!(%err, "training run refused");
                self.emit(SimEvent::TrainingRefused {
                    reason: err.to_string(),
                });
            }
        }
        result
    }

    /// Advance the simulation by `dt`.
    pub fn tick(&mut self, dt: Duration) -> Result<TickReport, GameOver> {
        if self.state().game_over {
            return Err(GameOver);
        }
        *self.world.resource_mut::<Frame>() = Frame {
            dt,
            ..Frame::default()
        };
        self.schedule.run(&mut self.world);

        let paused = self.state().simulation_paused;
        if !paused {
            self.elapsed += dt;
        }
        let frame = self.world.resource::<Frame>();
        let state = self.state();
        debug!(
            budget = %state.budget,
            ai_ability = state.ai_ability,
            heat = state.heat_level,
            "tick"
        );
        Ok(TickReport {
            income: frame.income,
            ai_gained: frame.ai_gained,
            paused,
            game_over: state.game_over,
        })
    }

    /// Suspend income, growth and milestones until `resume`.
    pub fn pause(&mut self) {
        if !self.state().simulation_paused {
            info!("simulation paused");
            self.state_mut().simulation_paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.state().simulation_paused {
            info!("simulation resumed");
            self.state_mut().simulation_paused = false;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.state().simulation_paused
    }

    pub fn is_game_over(&self) -> bool {
        self.state().game_over
    }

    pub fn training_active(&self) -> bool {
        self.world.resource::<Training>().0.is_active()
    }

    /// Replace the hook called when the AI becomes sentient.
    pub fn set_sentience_hook<H: SentienceHook + 'static>(&mut self, hook: H) {
        self.world.insert_resource(Sentience(Box::new(hook)));
    }

    /// Take queued domain events. Shares the queue with `drain_intents`.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.world.resource_mut::<Outbox>().0)
    }

    /// Take queued events translated into presentation intents.
    pub fn drain_intents(&mut self) -> Vec<Intent> {
        self.drain_events().iter().flat_map(intents_for).collect()
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_session_starts_clean() {
        let sim = Simulation::canonical();
        let s = sim.snapshot();
        assert_eq!(s.budget, Decimal::new(10_000, 0));
        assert_eq!(s.offices_owned, 0);
        assert!(!sim.is_paused());
        assert_eq!(sim.elapsed(), Duration::ZERO);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = SimConfig {
            training_run_duration_ms: 0,
            ..SimConfig::default()
        };
        assert!(Simulation::new(cfg, BuildingCatalog::canonical()).is_err());
    }

    #[test]
    fn restored_state_takes_generation_cap_from_config() {
        let cfg = SimConfig {
            max_electricity: 50.0,
            ..SimConfig::default()
        };
        let mut state = ResourceState::new(&SimConfig::default());
        state.electricity_generated = 80.0;
        assert_eq!(state.max_electricity, 1000.0);
        let sim = Simulation::from_state(cfg, BuildingCatalog::canonical(), state).unwrap();
        let s = sim.snapshot();
        assert_eq!(s.max_electricity, 50.0);
        assert_eq!(s.net_electricity(), 50.0);
    }

    #[test]
    fn restored_ability_is_clamped_to_cap() {
        let mut state = ResourceState::new(&SimConfig::default());
        state.ai_ability = 5e10;
        let sim =
            Simulation::from_state(SimConfig::default(), BuildingCatalog::canonical(), state).unwrap();
        assert_eq!(sim.snapshot().ai_ability, 1000.0);
    }

    #[test]
    fn purchase_emits_reveal_intent() {
        let mut sim = Simulation::canonical();
        sim.purchase(BuildingKind::Office).unwrap();
        let intents = sim.drain_intents();
        assert!(intents.contains(&Intent::RevealVisual(BuildingKind::Office)));
        assert!(sim.drain_intents().is_empty());
    }

    #[test]
    fn first_server_farm_unlocks_training_once() {
        let mut sim = Simulation::canonical();
        sim.purchase(BuildingKind::Office).unwrap();
        sim.purchase(BuildingKind::ServerFarm).unwrap();
        sim.purchase(BuildingKind::ServerFarm).unwrap();
        let unlocks = sim
            .drain_events()
            .into_iter()
            .filter(|e| *e == SimEvent::FirstServerFarmBuilt)
            .count();
        assert_eq!(unlocks, 1);
    }

    #[test]
    fn pause_is_reported() {
        let mut sim = Simulation::canonical();
        sim.pause();
        let report = sim.tick(Duration::from_secs(1)).unwrap();
        assert!(report.paused);
        assert_eq!(sim.elapsed(), Duration::ZERO);
        sim.resume();
        assert!(!sim.tick(Duration::from_secs(1)).unwrap().paused);
        assert_eq!(sim.elapsed(), Duration::from_secs(1));
    }
}

//! Tick pipeline: resources and the systems run once per `tick`.

use bevy_ecs::prelude::*;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use sim_ai::{SentienceHook, TrainingRunController};
use sim_core::{BuildingCatalog, ResourceState, SimConfig, SimEvent};
use std::time::Duration;
use tracing::info;

#[derive(Resource)]
pub(crate) struct Economy(pub ResourceState);

#[derive(Resource)]
pub(crate) struct Rules {
    pub config: SimConfig,
    pub catalog: BuildingCatalog,
}

#[derive(Resource)]
pub(crate) struct Training(pub TrainingRunController);

/// Per-tick scratch values.
#[derive(Resource, Default)]
pub(crate) struct Frame {
    pub dt: Duration,
    pub income: Decimal,
    pub ai_gained: f64,
}

#[derive(Resource, Default)]
pub(crate) struct Outbox(pub Vec<SimEvent>);

#[derive(Resource)]
pub(crate) struct SimRng(pub ChaCha8Rng);

#[derive(Resource)]
pub(crate) struct Sentience(pub Box<dyn SentienceHook>);

fn halted(state: &ResourceState) -> bool {
    state.game_over || state.simulation_paused
}

pub(crate) fn income_system(mut eco: ResMut<Economy>, rules: Res<Rules>, mut frame: ResMut<Frame>) {
    if halted(&eco.0) {
        return;
    }
    let dt = frame.dt;
    frame.income = sim_econ::accrue_income(&mut eco.0, &rules.config, dt);
}

/// Runs before the training countdown, so the boost is clamped to what is left of the run.
pub(crate) fn growth_system(
    mut eco: ResMut<Economy>,
    rules: Res<Rules>,
    training: Res<Training>,
    mut frame: ResMut<Frame>,
) {
    if halted(&eco.0) {
        return;
    }
    let dt = frame.dt;
    let boosted = training.0.boosted_for(dt);
    frame.ai_gained = sim_ai::grow_ability(&mut eco.0, &rules.config, dt, boosted);
}

pub(crate) fn milestone_system(
    mut eco: ResMut<Economy>,
    mut rng: ResMut<SimRng>,
    mut outbox: ResMut<Outbox>,
) {
    if halted(&eco.0) {
        return;
    }
    for milestone in sim_ai::advance_milestones(&mut eco.0) {
        let Some(narrative) = sim_ai::narrate(milestone, &mut rng.0) else {
            continue;
        };
        info!(milestone, "AI milestone reached");
        outbox.0.push(SimEvent::MilestoneReached {
            milestone,
            text: narrative.text,
            blocking: narrative.blocking,
        });
    }
}

pub(crate) fn sentience_system(
    mut eco: ResMut<Economy>,
    rules: Res<Rules>,
    frame: Res<Frame>,
    mut rng: ResMut<SimRng>,
    mut hook: ResMut<Sentience>,
    mut outbox: ResMut<Outbox>,
) {
    if halted(&eco.0) {
        return;
    }
    let Some(rule) = rules.config.sentience else {
        return;
    };
    if sim_ai::roll_sentience(&mut eco.0, &rule, frame.dt, &mut rng.0) {
        hook.0.on_sentience(&eco.0);
        outbox.0.push(SimEvent::SentienceTriggered {
            ai_ability: eco.0.ai_ability,
        });
    }
}

pub(crate) fn training_system(
    mut eco: ResMut<Economy>,
    rules: Res<Rules>,
    frame: Res<Frame>,
    mut training: ResMut<Training>,
    mut outbox: ResMut<Outbox>,
) {
    if eco.0.game_over {
        return;
    }
    if eco.0.simulation_paused && !rules.config.training_continues_while_paused {
        return;
    }
    if let Some(done) = training.0.advance(&mut eco.0, frame.dt) {
        outbox.0.push(SimEvent::TrainingCompleted { first: done.first });
    }
}

pub(crate) fn bankruptcy_system(mut eco: ResMut<Economy>, mut outbox: ResMut<Outbox>) {
    if halted(&eco.0) {
        return;
    }
    if sim_econ::check_bankruptcy(&mut eco.0) {
        outbox.0.push(SimEvent::Bankrupt);
    }
}

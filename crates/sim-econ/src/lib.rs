#![deny(warnings)]

//! Economic rules: purchase validation, income accrual and bankruptcy.
//!
//! This module provides:
//! - The ordered purchase validator (funds, office, capacity, electricity, heat)
//! - Atomic application of an accepted purchase to the resource state
//! - Per-tick income from AI ability and the terminal bankruptcy check

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sim_core::{BuildingCatalog, BuildingKind, ElectricityPolicy, ResourceState, SimConfig};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a purchase was refused. Checks run in declaration order.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RejectionReason {
    /// The session has ended.
    #[error("game over")]
    GameOver,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("office required")]
    OfficeRequired,
    /// Server farms per office exhausted.
    #[error("capacity exceeded")]
    CapacityExceeded,
    #[error("insufficient electricity")]
    InsufficientElectricity,
    #[error("overheating")]
    Overheating,
}

/// Changes an accepted purchase applies to the state.
#[derive(Clone, Debug, PartialEq)]
pub struct StateDelta {
    pub kind: BuildingKind,
    pub cost: Decimal,
    /// Added to `electricity_generated`.
    pub generated_added: f64,
    /// Added to `electricity_used`.
    pub used_added: f64,
    pub computing_added: f64,
    /// Heat level after the purchase, already clamped at zero.
    pub heat_after: f64,
    /// True when this is the first building of its kind.
    pub first_of_kind: bool,
}

/// Decide whether `kind` may be purchased, without touching the state.
pub fn evaluate_purchase(
    state: &ResourceState,
    catalog: &BuildingCatalog,
    config: &SimConfig,
    kind: BuildingKind,
) -> Result<StateDelta, RejectionReason> {
    let def = catalog.get(kind);
    if state.game_over {
        return Err(RejectionReason::GameOver);
    }
    if state.budget < def.cost {
        return Err(RejectionReason::InsufficientFunds);
    }
    if kind != BuildingKind::Office && state.offices_owned == 0 {
        return Err(RejectionReason::OfficeRequired);
    }
    if kind == BuildingKind::ServerFarm {
        let capacity = state
            .offices_owned
            .saturating_mul(config.server_capacity_per_office);
        if state.server_farms_owned >= capacity {
            return Err(RejectionReason::CapacityExceeded);
        }
    }
    let net_after = state.effective_net_electricity() + def.electricity_delta;
    let check_electricity = match config.electricity_policy {
        ElectricityPolicy::Unchecked => false,
        ElectricityPolicy::ExemptFirstOffice => state.offices_owned > 0,
        ElectricityPolicy::Strict => true,
    };
    if check_electricity && net_after < 0.0 && def.electricity_delta < 0.0 {
        return Err(RejectionReason::InsufficientElectricity);
    }
    let heat_after = state.heat_level + def.heat_delta;
    if heat_after > config.max_heat {
        return Err(RejectionReason::Overheating);
    }

    let (generated_added, used_added) = if def.electricity_delta >= 0.0 {
        (def.electricity_delta, 0.0)
    } else {
        (0.0, -def.electricity_delta)
    };
    Ok(StateDelta {
        kind,
        cost: def.cost,
        generated_added,
        used_added,
        computing_added: def.computing_delta,
        heat_after: heat_after.max(0.0),
        first_of_kind: state.count(kind) == 0,
    })
}

/// Commit an accepted purchase.
pub fn apply_purchase(state: &mut ResourceState, delta: &StateDelta) {
    state.budget -= delta.cost;
    state.electricity_generated += delta.generated_added;
    state.electricity_used += delta.used_added;
    state.computing_power += delta.computing_added;
    state.heat_level = delta.heat_after;
    *state.building_counts.entry(delta.kind).or_insert(0) += 1;
    match delta.kind {
        BuildingKind::Office => state.offices_owned += 1,
        BuildingKind::ServerFarm => state.server_farms_owned += 1,
        BuildingKind::SolarPanel | BuildingKind::CoolingSystem => {}
    }
}

/// Validate and, on success, commit a purchase. Rejections leave `state` untouched.
pub fn try_purchase(
    state: &mut ResourceState,
    catalog: &BuildingCatalog,
    config: &SimConfig,
    kind: BuildingKind,
) -> Result<StateDelta, RejectionReason> {
    match evaluate_purchase(state, catalog, config, kind) {
        Ok(delta) => {
            apply_purchase(state, &delta);
            info!(
                building = %kind,
                budget = %state.budget,
                heat = state.heat_level,
                "building purchased"
            );
            Ok(delta)
        }
        Err(reason) => {
            debug!(building = %kind, %reason, "purchase rejected");
            Err(reason)
        }
    }
}

/// Credit income for `dt` of simulated time and return the amount.
///
/// Income is `ai_ability * income_rate` per second, optionally capped per tick.
pub fn accrue_income(state: &mut ResourceState, config: &SimConfig, dt: Duration) -> Decimal {
    let raw = state.ai_ability * config.income_rate * dt.as_secs_f64();
    if raw <= 0.0 {
        return Decimal::ZERO;
    }
    let mut income = match Decimal::from_f64(raw) {
        Some(d) => d.round_dp(4),
        None => {
            warn!(raw, "income not representable, skipping");
            return Decimal::ZERO;
        }
    };
    if let Some(cap) = config.income_cap_per_tick {
        income = income.min(cap);
    }
    state.budget += income;
    income
}

/// True when the player is broke and owns nothing that produces value.
pub fn is_bankrupt(state: &ResourceState) -> bool {
    !state.game_over && state.budget <= Decimal::ZERO && state.server_farms_owned == 0
}

/// Set `game_over` on bankruptcy. Returns true if the session just ended.
pub fn check_bankruptcy(state: &mut ResourceState) -> bool {
    if !is_bankrupt(state) {
        return false;
    }
    state.game_over = true;
    warn!(budget = %state.budget, "bankrupt with no server farms, game over");
    true
}

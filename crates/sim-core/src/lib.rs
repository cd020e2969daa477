#![deny(warnings)]

//! Core domain models and invariants for AI Tycoon.
//!
//! This crate defines the serializable resource state, the building catalog,
//! the simulation configuration and the events/intents exchanged with the
//! presentation layer. Validation helpers guarantee basic invariants of
//! configuration values before a session starts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kinds of buildings the player can place.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    /// Prerequisite for every other building.
    Office,
    /// Produces computing power and heat.
    ServerFarm,
    /// Generates electricity.
    SolarPanel,
    /// Removes heat.
    CoolingSystem,
}

impl BuildingKind {
    /// All kinds in catalog order.
    pub const ALL: [BuildingKind; 4] = [
        BuildingKind::Office,
        BuildingKind::ServerFarm,
        BuildingKind::SolarPanel,
        BuildingKind::CoolingSystem,
    ];

    /// Stable string key, e.g. "server_farm".
    pub fn key(self) -> &'static str {
        match self {
            BuildingKind::Office => "office",
            BuildingKind::ServerFarm => "server_farm",
            BuildingKind::SolarPanel => "solar_panel",
            BuildingKind::CoolingSystem => "cooling_system",
        }
    }

    fn index(self) -> usize {
        match self {
            BuildingKind::Office => 0,
            BuildingKind::ServerFarm => 1,
            BuildingKind::SolarPanel => 2,
            BuildingKind::CoolingSystem => 3,
        }
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Returned when parsing a building key that is not in the catalog.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown building type: {0}")]
pub struct UnknownBuilding(pub String);

impl FromStr for BuildingKind {
    type Err = UnknownBuilding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        BuildingKind::ALL
            .into_iter()
            .find(|k| k.key() == key)
            .ok_or_else(|| UnknownBuilding(s.to_string()))
    }
}

/// Economic definition of a building type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingDef {
    /// Building kind this definition applies to.
    pub kind: BuildingKind,
    /// Purchase cost in currency (>= 0).
    pub cost: Decimal,
    /// Positive = generation, negative = consumption.
    pub electricity_delta: f64,
    /// Computing power added (>= 0).
    pub computing_delta: f64,
    /// Heat added (negative for cooling).
    pub heat_delta: f64,
}

impl BuildingDef {
    pub fn new(
        kind: BuildingKind,
        cost: Decimal,
        electricity_delta: f64,
        computing_delta: f64,
        heat_delta: f64,
    ) -> Self {
        Self {
            kind,
            cost,
            electricity_delta,
            computing_delta,
            heat_delta,
        }
    }
}

/// Immutable lookup from building kind to its definition.
///
/// The catalog is total over [`BuildingKind`], so lookups cannot fail.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildingCatalog {
    defs: [BuildingDef; 4],
}

impl BuildingCatalog {
    /// Reference catalog: offices, server farms, solar panels, cooling systems.
    pub fn canonical() -> Self {
        Self {
            defs: [
                BuildingDef::new(BuildingKind::Office, Decimal::new(2000, 0), -10.0, 0.0, 0.0),
                BuildingDef::new(BuildingKind::ServerFarm, Decimal::new(1000, 0), -5.0, 10.0, 15.0),
                BuildingDef::new(BuildingKind::SolarPanel, Decimal::new(500, 0), 10.0, 0.0, 0.0),
                BuildingDef::new(
                    BuildingKind::CoolingSystem,
                    Decimal::new(1500, 0),
                    -5.0,
                    0.0,
                    -15.0,
                ),
            ],
        }
    }

    /// Replace the definition for `def.kind`.
    pub fn with_def(mut self, def: BuildingDef) -> Self {
        let i = def.kind.index();
        self.defs[i] = def;
        self
    }

    pub fn get(&self, kind: BuildingKind) -> &BuildingDef {
        &self.defs[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildingDef> {
        self.defs.iter()
    }
}

impl Default for BuildingCatalog {
    fn default() -> Self {
        Self::canonical()
    }
}

/// How the electricity sufficiency check treats purchases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectricityPolicy {
    /// No electricity check at purchase time.
    #[default]
    Unchecked,
    /// Consumers are blocked when net electricity would go negative, except
    /// while no office exists yet.
    ExemptFirstOffice,
    /// Consumers are always blocked when net electricity would go negative.
    Strict,
}

/// Random sentience roll once AI ability passes `threshold`.
///
/// Per second the chance is `(ai_ability - threshold) / chance_divisor`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentienceRule {
    pub threshold: f64,
    pub chance_divisor: f64,
}

impl Default for SentienceRule {
    fn default() -> Self {
        Self {
            threshold: 50.0,
            chance_divisor: 100.0,
        }
    }
}

/// Largest accepted `ai_ability_cap`.
pub const MAX_AI_ABILITY_CAP: f64 = 10_000.0;

/// Simulation configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Budget at session start.
    pub starting_budget: Decimal,
    /// Heat cap enforced at purchase time.
    pub max_heat: f64,
    /// Generation above this value does not count towards net electricity.
    pub max_electricity: f64,
    /// Server farms allowed per office.
    pub server_capacity_per_office: u32,
    /// Length of a training run in milliseconds.
    pub training_run_duration_ms: u64,
    /// Extra electricity draw while a training run is active.
    pub training_extra_load: f64,
    /// Income per unit of AI ability per second.
    pub income_rate: f64,
    /// AI ability per unit of computing power per second, always on.
    pub passive_growth_rate: f64,
    /// Additional AI ability per unit of computing power per second while training.
    pub training_growth_rate: f64,
    /// Upper bound of AI ability, at most [`MAX_AI_ABILITY_CAP`].
    pub ai_ability_cap: f64,
    pub electricity_policy: ElectricityPolicy,
    /// Minimum effective surplus required to start a training run.
    pub min_training_surplus: Option<f64>,
    /// Whether the training countdown keeps running while paused.
    pub training_continues_while_paused: bool,
    /// Optional cap on income credited by a single tick.
    pub income_cap_per_tick: Option<Decimal>,
    pub sentience: Option<SentienceRule>,
    /// Seed for deterministic RNG (narration, sentience roll).
    pub rng_seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            starting_budget: Decimal::new(10_000, 0),
            max_heat: 100.0,
            max_electricity: 1000.0,
            server_capacity_per_office: 5,
            training_run_duration_ms: 3000,
            training_extra_load: 20.0,
            income_rate: 10.0,
            passive_growth_rate: 0.01,
            training_growth_rate: 0.1,
            ai_ability_cap: 1000.0,
            electricity_policy: ElectricityPolicy::Unchecked,
            min_training_surplus: None,
            training_continues_while_paused: true,
            income_cap_per_tick: None,
            sentience: Some(SentienceRule::default()),
            rng_seed: 42,
        }
    }
}

/// Mutable record of the player's resources for one session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub budget: Decimal,
    pub electricity_generated: f64,
    pub electricity_used: f64,
    pub computing_power: f64,
    pub heat_level: f64,
    pub ai_ability: f64,
    pub building_counts: BTreeMap<BuildingKind, u32>,
    pub offices_owned: u32,
    pub server_farms_owned: u32,
    /// Highest multiple of ten already narrated.
    pub last_ai_milestone: u32,
    pub training_run_active: bool,
    pub training_extra_load: f64,
    pub training_runs_completed: u32,
    pub simulation_paused: bool,
    pub sentience_triggered: bool,
    pub game_over: bool,
    /// Generation cap; sessions overwrite it with the configured value.
    pub max_electricity: f64,
}

impl ResourceState {
    /// Fresh session state from configuration.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            budget: config.starting_budget,
            electricity_generated: 0.0,
            electricity_used: 0.0,
            computing_power: 0.0,
            heat_level: 0.0,
            ai_ability: 0.0,
            building_counts: BTreeMap::new(),
            offices_owned: 0,
            server_farms_owned: 0,
            last_ai_milestone: 0,
            training_run_active: false,
            training_extra_load: 0.0,
            training_runs_completed: 0,
            simulation_paused: false,
            sentience_triggered: false,
            game_over: false,
            max_electricity: config.max_electricity,
        }
    }

    pub fn count(&self, kind: BuildingKind) -> u32 {
        self.building_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Generated electricity counted towards the balance.
    pub fn usable_generation(&self) -> f64 {
        self.electricity_generated.min(self.max_electricity)
    }

    /// Generated minus persistent usage.
    pub fn net_electricity(&self) -> f64 {
        self.usable_generation() - self.electricity_used
    }

    /// Usage including the transient training load.
    pub fn effective_electricity_used(&self) -> f64 {
        self.electricity_used + self.training_extra_load
    }

    pub fn effective_net_electricity(&self) -> f64 {
        self.usable_generation() - self.effective_electricity_used()
    }
}

/// Domain events produced by purchases and ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    BuildingPlaced { kind: BuildingKind },
    FirstServerFarmBuilt,
    PurchaseRejected { kind: BuildingKind, reason: String },
    TrainingStarted,
    TrainingRefused { reason: String },
    TrainingCompleted { first: bool },
    MilestoneReached { milestone: u32, text: String, blocking: bool },
    SentienceTriggered { ai_ability: f64 },
    Bankrupt,
}

/// Sound cues the presentation layer may play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Build,
    Error,
    TrainingStart,
    TrainingComplete,
    Milestone,
    GameOver,
}

/// Side effects requested from the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    ShowPopup(String),
    ShowNarrative { message: String, blocking: bool },
    PlaySound(SoundCue),
    RevealVisual(BuildingKind),
}

/// Validation errors for configuration and catalog values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Numeric field must be finite.
    #[error("non-finite value for {0}")]
    NonFinite(&'static str),
    /// Field must be non-negative.
    #[error("negative value for {0}")]
    Negative(&'static str),
    /// Field must be strictly positive.
    #[error("{0} must be > 0")]
    NonPositive(&'static str),
    /// Field exceeds its upper bound.
    #[error("{field} must be <= {max}")]
    AboveMaximum { field: &'static str, max: f64 },
    /// Building definition violates catalog rules.
    #[error("invalid building definition for {0}")]
    InvalidBuilding(BuildingKind),
}

fn finite_non_negative(v: f64, name: &'static str) -> Result<(), ConfigError> {
    if !v.is_finite() {
        return Err(ConfigError::NonFinite(name));
    }
    if v < 0.0 {
        return Err(ConfigError::Negative(name));
    }
    Ok(())
}

/// Validate a simulation configuration.
pub fn validate_config(c: &SimConfig) -> Result<(), ConfigError> {
    if c.starting_budget < Decimal::ZERO {
        return Err(ConfigError::Negative("starting_budget"));
    }
    finite_non_negative(c.max_heat, "max_heat")?;
    finite_non_negative(c.max_electricity, "max_electricity")?;
    finite_non_negative(c.training_extra_load, "training_extra_load")?;
    finite_non_negative(c.income_rate, "income_rate")?;
    finite_non_negative(c.passive_growth_rate, "passive_growth_rate")?;
    finite_non_negative(c.training_growth_rate, "training_growth_rate")?;
    finite_non_negative(c.ai_ability_cap, "ai_ability_cap")?;
    if c.ai_ability_cap > MAX_AI_ABILITY_CAP {
        return Err(ConfigError::AboveMaximum {
            field: "ai_ability_cap",
            max: MAX_AI_ABILITY_CAP,
        });
    }
    if c.server_capacity_per_office == 0 {
        return Err(ConfigError::NonPositive("server_capacity_per_office"));
    }
    if c.training_run_duration_ms == 0 {
        return Err(ConfigError::NonPositive("training_run_duration_ms"));
    }
    if let Some(s) = c.min_training_surplus {
        if !s.is_finite() {
            return Err(ConfigError::NonFinite("min_training_surplus"));
        }
    }
    if let Some(cap) = c.income_cap_per_tick {
        if cap < Decimal::ZERO {
            return Err(ConfigError::Negative("income_cap_per_tick"));
        }
    }
    if let Some(rule) = c.sentience {
        finite_non_negative(rule.threshold, "sentience.threshold")?;
        if !(rule.chance_divisor.is_finite() && rule.chance_divisor > 0.0) {
            return Err(ConfigError::NonPositive("sentience.chance_divisor"));
        }
    }
    Ok(())
}

/// Validate a building definition.
pub fn validate_building(d: &BuildingDef) -> Result<(), ConfigError> {
    if d.cost < Decimal::ZERO {
        return Err(ConfigError::InvalidBuilding(d.kind));
    }
    let finite = d.electricity_delta.is_finite()
        && d.computing_delta.is_finite()
        && d.heat_delta.is_finite();
    if !finite || d.computing_delta < 0.0 {
        return Err(ConfigError::InvalidBuilding(d.kind));
    }
    Ok(())
}

/// Validate every entry of a catalog.
pub fn validate_catalog(catalog: &BuildingCatalog) -> Result<(), ConfigError> {
    catalog.iter().try_for_each(validate_building)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn canonical_catalog_matches_reference_table() {
        let c = BuildingCatalog::canonical();
        let farm = c.get(BuildingKind::ServerFarm);
        assert_eq!(farm.cost, Decimal::new(1000, 0));
        assert_eq!(farm.electricity_delta, -5.0);
        assert_eq!(farm.computing_delta, 10.0);
        assert_eq!(farm.heat_delta, 15.0);
        assert_eq!(c.get(BuildingKind::CoolingSystem).heat_delta, -15.0);
        assert_eq!(c.get(BuildingKind::SolarPanel).electricity_delta, 10.0);
        for kind in BuildingKind::ALL {
            assert_eq!(c.get(kind).kind, kind);
        }
        validate_catalog(&c).unwrap();
    }

    #[test]
    fn with_def_replaces_single_entry() {
        let c = BuildingCatalog::canonical().with_def(BuildingDef::new(
            BuildingKind::SolarPanel,
            Decimal::new(250, 0),
            20.0,
            0.0,
            0.0,
        ));
        assert_eq!(c.get(BuildingKind::SolarPanel).cost, Decimal::new(250, 0));
        assert_eq!(c.get(BuildingKind::Office).cost, Decimal::new(2000, 0));
    }

    #[test]
    fn building_keys_parse() {
        assert_eq!("server_farm".parse::<BuildingKind>(), Ok(BuildingKind::ServerFarm));
        assert_eq!(" Office ".parse::<BuildingKind>(), Ok(BuildingKind::Office));
        assert_eq!(
            "reactor".parse::<BuildingKind>(),
            Err(UnknownBuilding("reactor".to_string()))
        );
    }

    #[test]
    fn fresh_state_uses_config() {
        let state = ResourceState::new(&SimConfig::default());
        assert_eq!(state.budget, Decimal::new(10_000, 0));
        assert_eq!(state.count(BuildingKind::Office), 0);
        assert_eq!(state.net_electricity(), 0.0);
        assert!(!state.game_over);
    }

    #[test]
    fn training_load_only_affects_effective_usage() {
        let mut state = ResourceState::new(&SimConfig::default());
        state.electricity_generated = 30.0;
        state.electricity_used = 10.0;
        state.training_extra_load = 20.0;
        assert_eq!(state.net_electricity(), 20.0);
        assert_eq!(state.effective_net_electricity(), 0.0);
    }

    #[test]
    fn generation_is_capped_by_max_electricity() {
        let mut state = ResourceState::new(&SimConfig {
            max_electricity: 50.0,
            ..SimConfig::default()
        });
        state.electricity_generated = 80.0;
        assert_eq!(state.net_electricity(), 50.0);
    }

    #[test]
    fn state_snapshot_roundtrip() {
        let mut state = ResourceState::new(&SimConfig::default());
        state.building_counts.insert(BuildingKind::ServerFarm, 2);
        state.heat_level = 30.0;
        let s = serde_json::to_string(&state).unwrap();
        let back: ResourceState = serde_json::from_str(&s).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let cfg: SimConfig = serde_json::from_str(r#"{"max_heat": 150.0}"#).unwrap();
        assert_eq!(cfg.max_heat, 150.0);
        assert_eq!(cfg.server_capacity_per_office, 5);
        validate_config(&cfg).unwrap();
    }

    #[test]
    fn invalid_config_is_rejected() {
        let zero_cap = SimConfig {
            server_capacity_per_office: 0,
            ..SimConfig::default()
        };
        assert_eq!(
            validate_config(&zero_cap),
            Err(ConfigError::NonPositive("server_capacity_per_office"))
        );
        let nan_rate = SimConfig {
            income_rate: f64::NAN,
            ..SimConfig::default()
        };
        assert_eq!(
            validate_config(&nan_rate),
            Err(ConfigError::NonFinite("income_rate"))
        );
        let huge_cap = SimConfig {
            ai_ability_cap: 1e11,
            ..SimConfig::default()
        };
        assert_eq!(
            validate_config(&huge_cap),
            Err(ConfigError::AboveMaximum {
                field: "ai_ability_cap",
                max: MAX_AI_ABILITY_CAP
            })
        );
        let at_bound = SimConfig {
            ai_ability_cap: MAX_AI_ABILITY_CAP,
            ..SimConfig::default()
        };
        validate_config(&at_bound).unwrap();
        let bad_def = BuildingDef::new(BuildingKind::Office, Decimal::new(-1, 0), 0.0, 0.0, 0.0);
        assert!(validate_building(&bad_def).is_err());
    }

    proptest! {
        #[test]
        fn non_negative_rates_validate(income in 0.0f64..1_000.0,
                                       heat in 0.0f64..10_000.0,
                                       cap in 1u32..20) {
            let cfg = SimConfig {
                income_rate: income,
                max_heat: heat,
                server_capacity_per_office: cap,
                ..SimConfig::default()
            };
            prop_assert!(validate_config(&cfg).is_ok());
        }
    }
}

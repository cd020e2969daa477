#![deny(warnings)]

//! Game variants expressed as configuration presets loaded from YAML.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{
    validate_catalog, validate_config, BuildingCatalog, BuildingDef, BuildingKind, ConfigError,
    SimConfig,
};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Names accepted by [`builtin`].
pub const BUILTIN_NAMES: [&str; 2] = ["canonical", "prototype"];

/// A named configuration with optional building overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: SimConfig,
    /// Replaces the canonical definition of each listed kind.
    #[serde(default)]
    pub buildings: Vec<BuildingDef>,
}

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid preset yaml: {0}")]
    InvalidYaml(String),
    #[error("invalid preset values: {0}")]
    Invalid(#[from] ConfigError),
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

impl From<std::io::Error> for PresetError {
    fn from(e: std::io::Error) -> Self {
        PresetError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for PresetError {
    fn from(e: serde_yaml::Error) -> Self {
        PresetError::InvalidYaml(e.to_string())
    }
}

impl Preset {
    /// Canonical catalog with this preset's overrides applied.
    pub fn catalog(&self) -> BuildingCatalog {
        self.buildings
            .iter()
            .cloned()
            .fold(BuildingCatalog::canonical(), BuildingCatalog::with_def)
    }

    /// Validated configuration and catalog, ready for a session.
    pub fn build(&self) -> Result<(SimConfig, BuildingCatalog), PresetError> {
        validate_config(&self.config)?;
        let catalog = self.catalog();
        validate_catalog(&catalog)?;
        Ok((self.config.clone(), catalog))
    }
}

pub fn from_yaml_str(text: &str) -> Result<Preset, PresetError> {
    let preset: Preset = serde_yaml::from_str(text)?;
    if preset.name.trim().is_empty() {
        return Err(PresetError::InvalidYaml("preset name is empty".to_string()));
    }
    Ok(preset)
}

pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Preset, PresetError> {
    let text = fs::read_to_string(path.as_ref())?;
    let preset = from_yaml_str(&text)?;
    debug!(name = %preset.name, path = %path.as_ref().display(), "preset loaded");
    Ok(preset)
}

/// Load every `*.yaml`/`*.yml` file in `dir`, sorted by preset name.
pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<Preset>, PresetError> {
    let mut presets = Vec::new();
    for ent in fs::read_dir(dir.as_ref())? {
        let path = ent?.path();
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if path.is_file() && is_yaml {
            presets.push(load_file(&path)?);
        }
    }
    presets.sort_by(|a, b| a.name.cmp(&b.name));
    info!(count = presets.len(), "presets loaded");
    Ok(presets)
}

/// Presets compiled into the binary.
pub fn builtin(name: &str) -> Option<Preset> {
    match name {
        "canonical" => Some(Preset {
            name: "canonical".to_string(),
            description: "Offices, server farms, solar panels and cooling with training runs."
                .to_string(),
            config: SimConfig::default(),
            buildings: Vec::new(),
        }),
        // Early build: no heat, no training boost.
        "prototype" => Some(Preset {
            name: "prototype".to_string(),
            description: "Early build without heat or training boosts; sentience rolls past 50."
                .to_string(),
            config: SimConfig {
                training_growth_rate: 0.0,
                training_extra_load: 0.0,
                ..SimConfig::default()
            },
            buildings: vec![
                BuildingDef::new(BuildingKind::ServerFarm, Decimal::new(1000, 0), -5.0, 10.0, 0.0),
                BuildingDef::new(
                    BuildingKind::CoolingSystem,
                    Decimal::new(1500, 0),
                    -5.0,
                    0.0,
                    0.0,
                ),
            ],
        }),
        _ => None,
    }
}

/// A built-in name, or else a path to a YAML file.
pub fn resolve(name_or_path: &str) -> Result<Preset, PresetError> {
    if let Some(p) = builtin(name_or_path) {
        return Ok(p);
    }
    let path = Path::new(name_or_path);
    if path.is_file() {
        return load_file(path);
    }
    Err(PresetError::UnknownPreset(name_or_path.to_string()))
}

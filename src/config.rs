use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use loam_lighting::LightingConfig;
use loam_path::PathConfig;
use loam_world::WorldGenConfig;

#[derive(Clone, Debug, Deserialize)]
pub struct DriverConfig {
    /// Chunks kept resident around the view centre (Chebyshev radius).
    #[serde(default = "default_radius")]
    pub radius: i32,
    /// Ticks between day/night flips.
    #[serde(default = "default_ticks_per_phase")]
    pub ticks_per_phase: u64,
    /// Edit file loaded at startup and written by `--save`.
    #[serde(default)]
    pub edits_path: Option<PathBuf>,
}
fn default_radius() -> i32 {
    2
}
fn default_ticks_per_phase() -> u64 {
    120
}
impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            ticks_per_phase: default_ticks_per_phase(),
            edits_path: None,
        }
    }
}

/// Whole-program settings: one section per crate plus the driver's own.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoamConfig {
    #[serde(default)]
    pub worldgen: WorldGenConfig,
    #[serde(default)]
    pub lighting: LightingConfig,
    #[serde(default)]
    pub path: PathConfig,
    #[serde(default)]
    pub driver: DriverConfig,
}

pub fn load_config_from_str(s: &str) -> Result<LoamConfig, Box<dyn Error>> {
    Ok(toml::from_str(s)?)
}

/// Reads `path`; a missing file falls back to defaults with a warning.
pub fn load_config(path: &Path) -> Result<LoamConfig, Box<dyn Error>> {
    if !path.exists() {
        log::warn!("config {} not found; using defaults", path.display());
        return Ok(LoamConfig::default());
    }
    let s = fs::read_to_string(path)?;
    let cfg = load_config_from_str(&s)?;
    log::info!("loaded config from {}", path.display());
    Ok(cfg)
}

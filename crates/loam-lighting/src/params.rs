use serde::Deserialize;
use std::error::Error;

use loam_world::MAX_LIGHT;

#[derive(Clone, Debug, Deserialize)]
pub struct LightingConfig {
    #[serde(default = "default_source_level")]
    pub source_level: u8,
    #[serde(default = "default_step_cost")]
    pub step_cost: u8,
    #[serde(default = "default_water_cost")]
    pub water_cost: u8,
    #[serde(default = "default_propagate_budget")]
    pub propagate_budget: usize,
    #[serde(default = "default_remove_budget")]
    pub remove_budget: usize,
    #[serde(default = "default_ambient_chunks_per_step")]
    pub ambient_chunks_per_step: usize,
    #[serde(default = "default_day_level")]
    pub day_level: u8,
    #[serde(default = "default_night_level")]
    pub night_level: u8,
}
fn default_source_level() -> u8 {
    14
}
fn default_step_cost() -> u8 {
    1
}
fn default_water_cost() -> u8 {
    2
}
fn default_propagate_budget() -> usize {
    512
}
fn default_remove_budget() -> usize {
    256
}
fn default_ambient_chunks_per_step() -> usize {
    4
}
fn default_day_level() -> u8 {
    MAX_LIGHT
}
fn default_night_level() -> u8 {
    4
}
impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            source_level: default_source_level(),
            step_cost: default_step_cost(),
            water_cost: default_water_cost(),
            propagate_budget: default_propagate_budget(),
            remove_budget: default_remove_budget(),
            ambient_chunks_per_step: default_ambient_chunks_per_step(),
            day_level: default_day_level(),
            night_level: default_night_level(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightParams {
    pub source_level: u8,
    pub step_cost: u8,
    pub water_cost: u8,
    pub propagate_budget: usize,
    pub remove_budget: usize,
    pub ambient_chunks_per_step: usize,
    pub day_level: u8,
    pub night_level: u8,
}

impl Default for LightParams {
    fn default() -> Self {
        Self::from_config(&LightingConfig::default())
    }
}

impl LightParams {
    pub fn from_config(cfg: &LightingConfig) -> Self {
        Self {
            source_level: cfg.source_level.min(MAX_LIGHT),
            step_cost: cfg.step_cost,
            water_cost: cfg.water_cost,
            propagate_budget: cfg.propagate_budget,
            remove_budget: cfg.remove_budget,
            ambient_chunks_per_step: cfg.ambient_chunks_per_step,
            day_level: cfg.day_level.min(MAX_LIGHT),
            night_level: cfg.night_level.min(MAX_LIGHT),
        }
    }

    /// Panics on settings under which queues could stall or never shrink.
    pub fn validate(&self) {
        assert!(self.step_cost >= 1, "light step cost must be at least 1");
        assert!(
            self.remove_budget >= 1 && self.propagate_budget > self.remove_budget,
            "propagation budget ({}) must exceed a non-zero removal budget ({})",
            self.propagate_budget,
            self.remove_budget
        );
        assert!(
            self.ambient_chunks_per_step >= 1,
            "ambient recalculation must process at least one chunk per step"
        );
    }
}

pub fn load_config_from_str(s: &str) -> Result<LightingConfig, Box<dyn Error>> {
    Ok(toml::from_str(s)?)
}

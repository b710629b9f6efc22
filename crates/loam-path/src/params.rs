use serde::Deserialize;
use std::error::Error;

use loam_world::WorldGenParams;

#[derive(Clone, Debug, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_step_cost")]
    pub step_cost: u32,
    /// Overrides the world's `[walk] max_step` when set.
    #[serde(default)]
    pub max_step: Option<u16>,
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
}
fn default_step_cost() -> u32 {
    10
}
fn default_max_nodes() -> usize {
    100_000
}
impl Default for PathConfig {
    fn default() -> Self {
        Self {
            step_cost: default_step_cost(),
            max_step: None,
            max_nodes: default_max_nodes(),
        }
    }
}

/// Largest accepted move cost; keeps route costs far from `u32::MAX`.
pub const MAX_STEP_COST: u32 = 1_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathParams {
    /// Cost of one cardinal move; also scales the heuristic.
    pub step_cost: u32,
    /// Largest elevation difference a single move may climb or drop.
    pub max_walk_step: u16,
    /// Search gives up after expanding this many tiles.
    pub max_nodes: usize,
}

impl PathParams {
    pub fn from_config(cfg: &PathConfig, world: &WorldGenParams) -> Self {
        Self {
            step_cost: cfg.step_cost.clamp(1, MAX_STEP_COST),
            max_walk_step: cfg.max_step.unwrap_or(world.max_walk_step),
            max_nodes: cfg.max_nodes,
        }
    }

    pub fn for_world(world: &WorldGenParams) -> Self {
        Self::from_config(&PathConfig::default(), world)
    }
}

pub fn load_config_from_str(s: &str) -> Result<PathConfig, Box<dyn Error>> {
    Ok(toml::from_str(s)?)
}

use serde::Deserialize;
use std::error::Error;

use crate::Terrain;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub flat: Flat,
    #[serde(default)]
    pub elevation: Elevation,
    #[serde(default)]
    pub noise: Noise,
    #[serde(default)]
    pub vegetation: Vegetation,
    #[serde(default)]
    pub walk: Walk,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Normal,
    Flat,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Flat {
    #[serde(default = "default_flat_elevation")]
    pub elevation: u16,
}
fn default_flat_elevation() -> u16 {
    30
}
impl Default for Flat {
    fn default() -> Self {
        Self {
            elevation: default_flat_elevation(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Elevation {
    #[serde(default = "default_max_elevation")]
    pub max: u16,
    #[serde(default = "default_sea_level")]
    pub sea_level: u16,
    #[serde(default = "default_sand_level")]
    pub sand_level: u16,
    #[serde(default = "default_rock_level")]
    pub rock_level: u16,
    #[serde(default = "default_snow_level")]
    pub snow_level: u16,
}
fn default_max_elevation() -> u16 {
    64
}
fn default_sea_level() -> u16 {
    20
}
fn default_sand_level() -> u16 {
    24
}
fn default_rock_level() -> u16 {
    44
}
fn default_snow_level() -> u16 {
    54
}
impl Default for Elevation {
    fn default() -> Self {
        Self {
            max: default_max_elevation(),
            sea_level: default_sea_level(),
            sand_level: default_sand_level(),
            rock_level: default_rock_level(),
            snow_level: default_snow_level(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Noise {
    #[serde(default = "default_base_freq")]
    pub base_frequency: f64,
    #[serde(default = "default_base_octaves")]
    pub base_octaves: u32,
    #[serde(default = "default_persistence")]
    pub persistence: f64,
    #[serde(default = "default_mountain_freq")]
    pub mountain_frequency: f64,
    #[serde(default = "default_mountain_octaves")]
    pub mountain_octaves: u32,
    #[serde(default = "default_mountain_weight")]
    pub mountain_weight: f64,
    #[serde(default = "default_roughness_freq")]
    pub roughness_frequency: f64,
    #[serde(default = "default_roughness_weight")]
    pub roughness_weight: f64,
}
fn default_base_freq() -> f64 {
    0.008
}
fn default_base_octaves() -> u32 {
    4
}
fn default_persistence() -> f64 {
    0.5
}
fn default_mountain_freq() -> f64 {
    0.025
}
fn default_mountain_octaves() -> u32 {
    3
}
fn default_mountain_weight() -> f64 {
    0.35
}
fn default_roughness_freq() -> f64 {
    0.12
}
fn default_roughness_weight() -> f64 {
    0.08
}
impl Default for Noise {
    fn default() -> Self {
        Self {
            base_frequency: default_base_freq(),
            base_octaves: default_base_octaves(),
            persistence: default_persistence(),
            mountain_frequency: default_mountain_freq(),
            mountain_octaves: default_mountain_octaves(),
            mountain_weight: default_mountain_weight(),
            roughness_frequency: default_roughness_freq(),
            roughness_weight: default_roughness_weight(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Vegetation {
    #[serde(default = "default_veg_probability")]
    pub probability: f64,
    #[serde(default = "default_veg_min")]
    pub min_elevation: u16,
    #[serde(default = "default_veg_max")]
    pub max_elevation: u16,
}
fn default_veg_probability() -> f64 {
    0.04
}
fn default_veg_min() -> u16 {
    25
}
fn default_veg_max() -> u16 {
    40
}
impl Default for Vegetation {
    fn default() -> Self {
        Self {
            probability: default_veg_probability(),
            min_elevation: default_veg_min(),
            max_elevation: default_veg_max(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Walk {
    /// Largest elevation difference an agent may step across.
    #[serde(default = "default_max_step")]
    pub max_step: u16,
}
fn default_max_step() -> u16 {
    1
}
impl Default for Walk {
    fn default() -> Self {
        Self {
            max_step: default_max_step(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WorldGenMode {
    Normal,
    Flat { elevation: u16 },
}

#[derive(Clone, Debug)]
pub struct WorldGenParams {
    pub mode: WorldGenMode,
    pub max_elevation: u16,
    pub sea_level: u16,
    pub sand_level: u16,
    pub rock_level: u16,
    pub snow_level: u16,
    pub base_frequency: f64,
    pub base_octaves: u32,
    pub persistence: f64,
    pub mountain_frequency: f64,
    pub mountain_octaves: u32,
    pub mountain_weight: f64,
    pub roughness_frequency: f64,
    pub roughness_weight: f64,
    pub vegetation_probability: f64,
    pub vegetation_min: u16,
    pub vegetation_max: u16,
    pub max_walk_step: u16,
}

impl Default for WorldGenParams {
    fn default() -> Self {
        Self::from_config(&WorldGenConfig::default())
    }
}

impl WorldGenParams {
    pub fn from_config(cfg: &WorldGenConfig) -> Self {
        Self {
            mode: match cfg.mode {
                Mode::Normal => WorldGenMode::Normal,
                Mode::Flat => WorldGenMode::Flat {
                    elevation: cfg.flat.elevation,
                },
            },
            max_elevation: cfg.elevation.max,
            sea_level: cfg.elevation.sea_level,
            sand_level: cfg.elevation.sand_level,
            rock_level: cfg.elevation.rock_level,
            snow_level: cfg.elevation.snow_level,
            base_frequency: cfg.noise.base_frequency,
            base_octaves: cfg.noise.base_octaves,
            persistence: cfg.noise.persistence,
            mountain_frequency: cfg.noise.mountain_frequency,
            mountain_octaves: cfg.noise.mountain_octaves,
            mountain_weight: cfg.noise.mountain_weight,
            roughness_frequency: cfg.noise.roughness_frequency,
            roughness_weight: cfg.noise.roughness_weight,
            vegetation_probability: cfg.vegetation.probability,
            vegetation_min: cfg.vegetation.min_elevation,
            vegetation_max: cfg.vegetation.max_elevation,
            max_walk_step: cfg.walk.max_step,
        }
    }

    /// Flat world at `elevation`, otherwise default thresholds.
    pub fn flat(elevation: u16) -> Self {
        Self {
            mode: WorldGenMode::Flat { elevation },
            ..Self::default()
        }
    }

    /// Panics on configurations that would break the elevation table.
    pub fn validate(&self) {
        assert!(
            self.sea_level <= self.sand_level
                && self.sand_level <= self.rock_level
                && self.rock_level <= self.snow_level
                && self.snow_level <= self.max_elevation,
            "elevation thresholds must be non-decreasing and within max elevation: \
             sea={} sand={} rock={} snow={} max={}",
            self.sea_level,
            self.sand_level,
            self.rock_level,
            self.snow_level,
            self.max_elevation
        );
        assert!(
            (0.0..=1.0).contains(&self.vegetation_probability),
            "vegetation probability must be in [0, 1], got {}",
            self.vegetation_probability
        );
        assert!(
            self.persistence > 0.0,
            "noise persistence must be positive, got {}",
            self.persistence
        );
    }

    #[inline]
    pub fn clamp_elevation(&self, elevation: i32) -> u16 {
        elevation.clamp(0, i32::from(self.max_elevation)) as u16
    }

    /// Terrain category for an elevation; the only place terrain is decided.
    #[inline]
    pub fn classify(&self, elevation: u16) -> Terrain {
        if elevation < self.sea_level {
            Terrain::Water
        } else if elevation < self.sand_level {
            Terrain::Sand
        } else if elevation < self.rock_level {
            Terrain::Grass
        } else if elevation < self.snow_level {
            Terrain::Rock
        } else {
            Terrain::Snow
        }
    }
}

pub fn load_config_from_str(s: &str) -> Result<WorldGenConfig, Box<dyn Error>> {
    Ok(toml::from_str(s)?)
}

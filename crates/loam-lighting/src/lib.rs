//! Incremental ambient and local light over the world grid.
#![forbid(unsafe_code)]

mod channel;
mod engine;
mod params;

pub use channel::{Direction, LightChannel};
pub use engine::{LightEngine, LightStepStats, PendingWork};
pub use params::{LightParams, LightingConfig, load_config_from_str};

#[cfg(test)]
mod tests;

//! Walkable shortest paths over the tile grid.
#![forbid(unsafe_code)]

mod params;
mod planner;

pub use params::{MAX_STEP_COST, PathConfig, PathParams, load_config_from_str};
pub use planner::{PathNode, PathPlanner, find_path, is_walkable, path_cost};

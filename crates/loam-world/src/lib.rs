//! Tile terrain, chunk storage, and the global tile-addressed world grid.
#![forbid(unsafe_code)]

mod chunk;
mod chunk_coord;
mod chunk_store;
pub mod generation;
mod grid;
pub mod noise;
mod tile;
pub mod worldgen;

pub use chunk::TileGrid;
pub use chunk_coord::{ChunkCoord, split_tile};
pub use chunk_store::ChunkStore;
pub use generation::{GenCtx, generate_chunk};
pub use grid::{LightHooks, NoLighting, WorldGrid};
pub use noise::NoiseField;
pub use tile::{Decoration, MAX_LIGHT, Opacity, Terrain, Tile};
pub use worldgen::{WorldGenConfig, WorldGenMode, WorldGenParams};

/// Tiles per chunk side.
pub const CHUNK_SIZE: usize = 32;
pub const CHUNK_AREA: usize = CHUNK_SIZE * CHUNK_SIZE;

const _: () = assert!(CHUNK_SIZE > 0, "chunk size must be positive");

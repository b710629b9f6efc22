//! Deterministic per-chunk terrain generation.

use std::sync::Arc;

use crate::noise::NoiseField;
use crate::worldgen::{WorldGenMode, WorldGenParams};
use crate::{CHUNK_AREA, CHUNK_SIZE, ChunkCoord, Decoration, Terrain, Tile, TileGrid};

const VEGETATION_SALT: u32 = 0x5EED_0001;
const DECORATION_KIND_SALT: u32 = 0x5EED_0002;

/// Noise fields and parameters shared by every chunk generated for one seed.
pub struct GenCtx {
    pub seed: i32,
    pub params: Arc<WorldGenParams>,
    base: NoiseField,
    mountain: NoiseField,
    roughness: NoiseField,
}

impl GenCtx {
    pub fn new(seed: i32, params: Arc<WorldGenParams>) -> Self {
        Self {
            seed,
            params,
            base: NoiseField::new(seed),
            mountain: NoiseField::new(seed ^ 99_173),
            roughness: NoiseField::new(seed ^ 41_337),
        }
    }

    /// Combined height noise in [-1, 1] at a global tile.
    pub fn height_at(&self, row: i32, col: i32) -> f64 {
        let p = &*self.params;
        let x = f64::from(col);
        let y = f64::from(row);
        let base = self.base.octave(
            x * p.base_frequency,
            y * p.base_frequency,
            p.base_octaves,
            p.persistence,
        );
        let mountain = self.mountain.octave(
            x * p.mountain_frequency,
            y * p.mountain_frequency,
            p.mountain_octaves,
            p.persistence,
        );
        let rough = self
            .roughness
            .sample(x * p.roughness_frequency, y * p.roughness_frequency);
        (base + mountain * p.mountain_weight + rough * p.roughness_weight).clamp(-1.0, 1.0)
    }

    pub fn elevation_at(&self, row: i32, col: i32) -> u16 {
        let p = &*self.params;
        match p.mode {
            WorldGenMode::Flat { elevation } => elevation.min(p.max_elevation),
            WorldGenMode::Normal => {
                let n = self.height_at(row, col);
                let e = (((n + 1.0) / 2.0) * f64::from(p.max_elevation)).round();
                p.clamp_elevation(e as i32)
            }
        }
    }

    /// Vegetation for a grass tile inside the vegetation band, decided by a
    /// hash of seed and global coordinate.
    pub fn decoration_at(
        &self,
        row: i32,
        col: i32,
        terrain: Terrain,
        elevation: u16,
    ) -> Option<Decoration> {
        let p = &*self.params;
        if matches!(p.mode, WorldGenMode::Flat { .. }) {
            return None;
        }
        if terrain != Terrain::Grass || elevation < p.vegetation_min || elevation > p.vegetation_max
        {
            return None;
        }
        let seed = self.seed as u32;
        if f64::from(rand01(seed, row, col, VEGETATION_SALT)) >= p.vegetation_probability {
            return None;
        }
        let pick = rand01(seed, row, col, DECORATION_KIND_SALT);
        Some(if pick < 0.5 {
            Decoration::Tree
        } else if pick < 0.8 {
            Decoration::Bush
        } else {
            Decoration::Flower
        })
    }

    pub fn tile_at(&self, row: i32, col: i32) -> Tile {
        let elevation = self.elevation_at(row, col);
        let terrain = self.params.classify(elevation);
        let mut tile = Tile::new(terrain, elevation);
        tile.set_decoration(self.decoration_at(row, col, terrain, elevation));
        tile
    }
}

/// Tiles for one chunk. Coordinates past the edge of the world saturate, so
/// callers only pass chunks that are [`ChunkCoord::in_world`].
pub fn generate_chunk(ctx: &GenCtx, coord: ChunkCoord) -> TileGrid {
    let (row0, col0) = coord.origin();
    let mut tiles = Vec::with_capacity(CHUNK_AREA);
    for lr in 0..CHUNK_SIZE {
        for lc in 0..CHUNK_SIZE {
            tiles.push(ctx.tile_at(
                row0.saturating_add(lr as i32),
                col0.saturating_add(lc as i32),
            ));
        }
    }
    let fill = Tile::new(Terrain::Water, 0);
    TileGrid::from_tiles(coord, tiles, fill)
}

fn hash2(ix: i32, iy: i32, seed: u32) -> u32 {
    let mut h = (ix as u32).wrapping_mul(0x85eb_ca6b)
        ^ (iy as u32).wrapping_mul(0xc2b2_ae35)
        ^ seed.wrapping_mul(0x27d4_eb2d);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    h
}

fn rand01(world_seed: u32, row: i32, col: i32, salt: u32) -> f32 {
    let h = hash2(col, row, (world_seed ^ salt).wrapping_add(0x9E37_79B9));
    ((h & 0x00FF_FFFF) as f32) / 16_777_216.0
}

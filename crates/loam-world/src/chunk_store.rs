use std::sync::Arc;

use hashbrown::HashMap;
use rayon::prelude::*;

use crate::generation::{GenCtx, generate_chunk};
use crate::worldgen::WorldGenParams;
use crate::{ChunkCoord, TileGrid};

/// Owns every resident chunk; generates lazily and never regenerates a
/// resident chunk.
pub struct ChunkStore {
    ctx: GenCtx,
    chunks: HashMap<ChunkCoord, TileGrid>,
}

impl ChunkStore {
    pub fn new(seed: i32, params: WorldGenParams) -> Self {
        Self {
            ctx: GenCtx::new(seed, Arc::new(params)),
            chunks: HashMap::new(),
        }
    }

    #[inline]
    pub fn seed(&self) -> i32 {
        self.ctx.seed
    }

    #[inline]
    pub fn params(&self) -> &WorldGenParams {
        &self.ctx.params
    }

    /// Resident chunk, generated first if absent. `None` for chunks outside
    /// the world.
    pub fn get_or_generate(&mut self, coord: ChunkCoord) -> Option<&TileGrid> {
        self.get_or_generate_mut(coord).map(|g| &*g)
    }

    pub fn get_or_generate_mut(&mut self, coord: ChunkCoord) -> Option<&mut TileGrid> {
        if !coord.in_world() {
            return None;
        }
        let ctx = &self.ctx;
        Some(self.chunks.entry(coord).or_insert_with(|| {
            log::debug!(target: "chunks", "generate ({}, {})", coord.cx, coord.cy);
            generate_chunk(ctx, coord)
        }))
    }

    /// Non-generating lookup.
    #[inline]
    pub fn get_if_resident(&self, coord: ChunkCoord) -> Option<&TileGrid> {
        self.chunks.get(&coord)
    }

    #[inline]
    pub fn get_if_resident_mut(&mut self, coord: ChunkCoord) -> Option<&mut TileGrid> {
        self.chunks.get_mut(&coord)
    }

    #[inline]
    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Drops the chunk's tiles. Returns whether anything was resident.
    pub fn unload(&mut self, coord: ChunkCoord) -> bool {
        let removed = self.chunks.remove(&coord).is_some();
        if removed {
            log::debug!(target: "chunks", "unload ({}, {})", coord.cx, coord.cy);
        }
        removed
    }

    /// Generates every absent chunk in `coords` (in parallel) and returns the
    /// newly resident coordinates in input order. Chunks outside the world
    /// are skipped.
    pub fn ensure_resident(&mut self, coords: &[ChunkCoord]) -> Vec<ChunkCoord> {
        let mut missing: Vec<ChunkCoord> = Vec::new();
        for &c in coords {
            if c.in_world() && !self.chunks.contains_key(&c) && !missing.contains(&c) {
                missing.push(c);
            }
        }
        if missing.is_empty() {
            return missing;
        }
        let ctx = &self.ctx;
        let built: Vec<TileGrid> = missing
            .par_iter()
            .map(|&c| generate_chunk(ctx, c))
            .collect();
        for grid in built {
            self.chunks.insert(grid.coord, grid);
        }
        log::debug!(target: "chunks", "generated {} chunk(s); {} resident", missing.len(), self.chunks.len());
        missing
    }

    /// Resident coordinates, sorted for deterministic iteration.
    pub fn resident_coords(&self) -> Vec<ChunkCoord> {
        let mut v: Vec<ChunkCoord> = self.chunks.keys().copied().collect();
        v.sort();
        v
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CHUNK_SIZE;

    #[test]
    fn lazy_generation_and_unload() {
        let mut store = ChunkStore::new(11, WorldGenParams::default());
        let c = ChunkCoord::new(3, -4);
        assert!(store.get_if_resident(c).is_none());
        let first = store.get_or_generate(c).unwrap().clone();
        assert!(store.is_resident(c));
        assert_eq!(store.len(), 1);
        assert!(store.unload(c));
        assert!(!store.unload(c));
        assert!(store.is_empty());
        let again = store.get_or_generate(c).unwrap().clone();
        assert_eq!(first, again);
    }

    #[test]
    fn resident_chunk_is_not_regenerated() {
        let mut store = ChunkStore::new(11, WorldGenParams::default());
        let c = ChunkCoord::new(0, 0);
        store.get_or_generate_mut(c).unwrap().get_mut(0, 0).local = 9;
        assert_eq!(store.get_or_generate(c).unwrap().get(0, 0).local, 9);
        store.ensure_resident(&[c]);
        assert_eq!(store.get_if_resident(c).unwrap().get(0, 0).local, 9);
    }

    #[test]
    fn ensure_resident_reports_only_new_chunks() {
        let mut store = ChunkStore::new(2, WorldGenParams::default());
        store.get_or_generate(ChunkCoord::new(0, 0));
        let coords = [
            ChunkCoord::new(0, 0),
            ChunkCoord::new(1, 0),
            ChunkCoord::new(1, 0),
            ChunkCoord::new(-1, -1),
        ];
        let new = store.ensure_resident(&coords);
        assert_eq!(new, vec![ChunkCoord::new(1, 0), ChunkCoord::new(-1, -1)]);
        assert_eq!(store.len(), 3);
        assert_eq!(
            store.resident_coords(),
            vec![ChunkCoord::new(-1, -1), ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)]
        );
    }

    #[test]
    fn chunks_past_the_coordinate_range_are_never_generated() {
        let mut store = ChunkStore::new(2, WorldGenParams::flat(30));
        let edge = ChunkCoord::new(0, ChunkCoord::MAX_INDEX);
        let beyond = ChunkCoord::new(0, ChunkCoord::MAX_INDEX + 1);
        assert!(store.get_or_generate(beyond).is_none());
        assert_eq!(store.ensure_resident(&[beyond, edge]), vec![edge]);
        let last = store.get_if_resident(edge).unwrap().iter_global().last().unwrap();
        assert_eq!((last.0, last.1), (i32::MAX, CHUNK_SIZE as i32 - 1));
        assert_eq!(store.len(), 1);
    }
}

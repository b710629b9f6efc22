use crate::chunk_store::ChunkStore;
use crate::worldgen::WorldGenParams;
use crate::{ChunkCoord, Opacity, Terrain, Tile, split_tile};

/// Callbacks a tile edit issues into the lighting engine.
pub trait LightHooks {
    /// Intensity used when a light source is toggled on or re-added.
    fn source_level(&self) -> u8;
    fn add_source(&mut self, grid: &mut WorldGrid, row: i32, col: i32, level: u8);
    fn remove_source(&mut self, grid: &mut WorldGrid, row: i32, col: i32);
    /// The tile at `(row, col)` now attenuates light differently.
    fn opacity_changed(&mut self, grid: &mut WorldGrid, row: i32, col: i32);
    fn mark_dirty(&mut self, coord: ChunkCoord);
    fn schedule_ambient(&mut self, coord: ChunkCoord);
}

/// Hooks that ignore lighting; edits only touch terrain.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLighting;

impl LightHooks for NoLighting {
    fn source_level(&self) -> u8 {
        0
    }
    fn add_source(&mut self, _grid: &mut WorldGrid, _row: i32, _col: i32, _level: u8) {}
    fn remove_source(&mut self, _grid: &mut WorldGrid, _row: i32, _col: i32) {}
    fn opacity_changed(&mut self, _grid: &mut WorldGrid, _row: i32, _col: i32) {}
    fn mark_dirty(&mut self, _coord: ChunkCoord) {}
    fn schedule_ambient(&mut self, _coord: ChunkCoord) {}
}

/// Global tile addressing over the chunk store.
pub struct WorldGrid {
    store: ChunkStore,
}

impl WorldGrid {
    pub fn new(store: ChunkStore) -> Self {
        Self { store }
    }

    pub fn with_seed(seed: i32, params: WorldGenParams) -> Self {
        Self::new(ChunkStore::new(seed, params))
    }

    #[inline]
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut ChunkStore {
        &mut self.store
    }

    #[inline]
    pub fn params(&self) -> &WorldGenParams {
        self.store.params()
    }

    /// Resident tile at a global coordinate; never generates.
    #[inline]
    pub fn tile_at(&self, row: i32, col: i32) -> Option<&Tile> {
        let (coord, lr, lc) = split_tile(row, col);
        self.store.get_if_resident(coord).map(|g| g.get(lr, lc))
    }

    #[inline]
    pub fn tile_at_mut(&mut self, row: i32, col: i32) -> Option<&mut Tile> {
        let (coord, lr, lc) = split_tile(row, col);
        self.store.get_if_resident_mut(coord).map(|g| g.get_mut(lr, lc))
    }

    /// Absent tiles count as opaque.
    #[inline]
    pub fn opacity(&self, row: i32, col: i32) -> Opacity {
        self.tile_at(row, col)
            .map(|t| t.terrain.opacity())
            .unwrap_or(Opacity::Opaque)
    }

    #[inline]
    pub fn is_opaque(&self, row: i32, col: i32) -> bool {
        self.opacity(row, col) == Opacity::Opaque
    }

    /// Clamps and applies a new elevation, re-deriving terrain. Returns
    /// whether the tile changed. No-op on tiles outside resident chunks.
    pub fn set_elevation(
        &mut self,
        row: i32,
        col: i32,
        new_elevation: i32,
        hooks: &mut dyn LightHooks,
    ) -> bool {
        let elevation = self.params().clamp_elevation(new_elevation);
        let terrain = self.params().classify(elevation);
        let coord = ChunkCoord::containing(row, col);
        let Some(tile) = self.tile_at_mut(row, col) else {
            return false;
        };
        let before = *tile;
        tile.elevation = elevation;
        tile.terrain = terrain;
        if terrain != Terrain::Grass && tile.decoration.is_some() {
            tile.set_decoration(None);
        }
        let changed = before.elevation != elevation || before.terrain != terrain;
        if changed {
            hooks.mark_dirty(coord);
        }
        if before.terrain.opacity() != terrain.opacity() {
            hooks.opacity_changed(self, row, col);
            if before.has_light_source() {
                hooks.remove_source(self, row, col);
                if !terrain.is_water() {
                    hooks.add_source(self, row, col, before.emission);
                }
            }
        }
        hooks.schedule_ambient(coord);
        changed
    }

    /// Flips the local light source on a tile. Returns the new emitting state,
    /// or `None` when the toggle did nothing (absent tile or water).
    pub fn toggle_light_source(
        &mut self,
        row: i32,
        col: i32,
        hooks: &mut dyn LightHooks,
    ) -> Option<bool> {
        let tile = self.tile_at(row, col)?;
        if tile.terrain.is_water() {
            return None;
        }
        if tile.has_light_source() {
            hooks.remove_source(self, row, col);
            Some(false)
        } else {
            let level = hooks.source_level();
            hooks.add_source(self, row, col, level);
            Some(true)
        }
    }

    /// Applies damage to a destructible decoration, removing it at zero hit
    /// points. Returns the remaining hit points, if the tile had any.
    pub fn damage_decoration(
        &mut self,
        row: i32,
        col: i32,
        amount: u8,
        hooks: &mut dyn LightHooks,
    ) -> Option<u8> {
        let coord = ChunkCoord::containing(row, col);
        let tile = self.tile_at_mut(row, col)?;
        let hp = tile.hit_points?.saturating_sub(amount);
        if hp == 0 {
            tile.set_decoration(None);
        } else {
            tile.hit_points = Some(hp);
        }
        hooks.mark_dirty(coord);
        Some(hp)
    }

    /// Chunks within `radius` (Chebyshev, in chunks) of the chunk holding `(row, col)`.
    pub fn chunks_around(row: i32, col: i32, radius: i32) -> Vec<ChunkCoord> {
        let center = ChunkCoord::containing(row, col);
        let radius = radius.max(0);
        let mut out = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                // Chunks past the edge of the world are left out.
                if let Some(c) = center.offset(dx, dy) {
                    out.push(c);
                }
            }
        }
        out
    }

    /// Makes every chunk around `(row, col)` resident; returns the new ones.
    pub fn activate_around(&mut self, row: i32, col: i32, radius: i32) -> Vec<ChunkCoord> {
        let wanted = Self::chunks_around(row, col, radius);
        self.store.ensure_resident(&wanted)
    }

    /// Unloads every resident chunk farther than `radius` from `(row, col)`.
    pub fn retain_within(&mut self, row: i32, col: i32, radius: i32) -> Vec<ChunkCoord> {
        let center = ChunkCoord::containing(row, col);
        let far: Vec<ChunkCoord> = self
            .store
            .resident_coords()
            .into_iter()
            .filter(|c| c.ring_distance(center) > radius.max(0) as u32)
            .collect();
        for &c in &far {
            self.store.unload(c);
        }
        far
    }
}

//! Persistent player edits to generated terrain.
#![forbid(unsafe_code)]

use std::error::Error;
use std::fs;
use std::path::Path;

use hashbrown::HashMap;
use loam_world::{ChunkCoord, Decoration, LightHooks, Terrain, Tile, WorldGrid};
use serde::{Deserialize, Serialize};

/// Current on-disk format version.
pub const SAVE_VERSION: u32 = 1;

/// Player-visible state of one modified tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileEdit {
    pub row: i32,
    pub col: i32,
    pub elevation: u16,
    /// Terrain the elevation produced when recorded; checked on restore.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain: Option<Terrain>,
    /// Local light emitted; 0 for none.
    #[serde(default)]
    pub light: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoration: Option<Decoration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_points: Option<u8>,
}

impl TileEdit {
    pub fn from_tile(row: i32, col: i32, tile: &Tile) -> Self {
        Self {
            row,
            col,
            elevation: tile.elevation,
            terrain: Some(tile.terrain),
            light: tile.emission,
            decoration: tile.decoration,
            hit_points: tile.hit_points,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SaveFile {
    version: u32,
    seed: i32,
    #[serde(default)]
    edits: Vec<TileEdit>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditStoreStats {
    pub chunk_entries: usize,
    pub tile_edits: usize,
    pub light_sources: usize,
}

/// Chunk-keyed record of modified tiles, replayed over regenerated chunks.
pub struct EditStore {
    seed: i32,
    inner: HashMap<ChunkCoord, HashMap<(i32, i32), TileEdit>>,
}

impl EditStore {
    pub fn new(seed: i32) -> Self {
        Self {
            seed,
            inner: HashMap::new(),
        }
    }

    #[inline]
    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn stats(&self) -> EditStoreStats {
        let chunk_entries = self.inner.len();
        let tile_edits = self.inner.values().map(|m| m.len()).sum();
        let light_sources = self
            .inner
            .values()
            .flat_map(|m| m.values())
            .filter(|e| e.light > 0)
            .count();
        EditStoreStats {
            chunk_entries,
            tile_edits,
            light_sources,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Records the current state of a tile, replacing any earlier edit.
    pub fn record(&mut self, row: i32, col: i32, tile: &Tile) {
        self.insert(TileEdit::from_tile(row, col, tile));
    }

    /// Records a resident tile straight from the grid. Returns false if absent.
    pub fn record_from(&mut self, grid: &WorldGrid, row: i32, col: i32) -> bool {
        match grid.tile_at(row, col) {
            Some(t) => {
                self.record(row, col, t);
                true
            }
            None => false,
        }
    }

    pub fn insert(&mut self, edit: TileEdit) {
        let k = ChunkCoord::containing(edit.row, edit.col);
        self.inner
            .entry(k)
            .or_default()
            .insert((edit.row, edit.col), edit);
    }

    pub fn forget(&mut self, row: i32, col: i32) -> bool {
        let k = ChunkCoord::containing(row, col);
        let Some(m) = self.inner.get_mut(&k) else {
            return false;
        };
        let removed = m.remove(&(row, col)).is_some();
        if m.is_empty() {
            self.inner.remove(&k);
        }
        removed
    }

    pub fn get(&self, row: i32, col: i32) -> Option<&TileEdit> {
        let k = ChunkCoord::containing(row, col);
        self.inner.get(&k).and_then(|m| m.get(&(row, col)))
    }

    /// Edits inside one chunk, in row-major order.
    pub fn edits_for_chunk(&self, coord: ChunkCoord) -> Vec<TileEdit> {
        let mut out: Vec<TileEdit> = self
            .inner
            .get(&coord)
            .map(|m| m.values().copied().collect())
            .unwrap_or_default();
        out.sort_by_key(|e| (e.row, e.col));
        out
    }

    /// Generates `coord` if needed and replays its edits through `hooks`.
    /// Returns the number of edits applied.
    pub fn restore_chunk(
        &self,
        grid: &mut WorldGrid,
        hooks: &mut dyn LightHooks,
        coord: ChunkCoord,
    ) -> usize {
        let edits = self.edits_for_chunk(coord);
        if edits.is_empty() {
            return 0;
        }
        if grid.store_mut().get_or_generate(coord).is_none() {
            return 0;
        }
        for e in &edits {
            grid.set_elevation(e.row, e.col, e.elevation as i32, hooks);
            let Some(tile) = grid.tile_at_mut(e.row, e.col) else {
                continue;
            };
            if let Some(t) = e.terrain.filter(|t| *t != tile.terrain) {
                log::warn!(
                    target: "edits",
                    "edit at ({}, {}) recorded {:?} but elevation {} now gives {:?}",
                    e.row,
                    e.col,
                    t,
                    e.elevation,
                    tile.terrain
                );
            }
            tile.set_decoration(e.decoration);
            if e.hit_points.is_some() {
                tile.hit_points = e.hit_points;
            }
            let dry = !tile.terrain.is_water();
            let current = tile.emission;
            if e.light > 0 && dry {
                hooks.add_source(grid, e.row, e.col, e.light);
            } else if current > 0 {
                hooks.remove_source(grid, e.row, e.col);
            }
        }
        log::debug!(target: "edits", "restored {} edit(s) in chunk {:?}", edits.len(), coord);
        edits.len()
    }

    pub fn to_toml_string(&self) -> Result<String, Box<dyn Error>> {
        let mut edits: Vec<TileEdit> = self
            .inner
            .values()
            .flat_map(|m| m.values().copied())
            .collect();
        edits.sort_by_key(|e| (e.row, e.col));
        let file = SaveFile {
            version: SAVE_VERSION,
            seed: self.seed,
            edits,
        };
        Ok(toml::to_string(&file)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let file: SaveFile = toml::from_str(s)?;
        if file.version != SAVE_VERSION {
            return Err(format!(
                "unsupported edit file version {} (expected {})",
                file.version, SAVE_VERSION
            )
            .into());
        }
        let mut store = Self::new(file.seed);
        for e in file.edits {
            store.insert(e);
        }
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        let s = self.stats();
        log::info!(
            target: "edits",
            "saved {} edit(s) across {} chunk(s) to {}",
            s.tile_edits,
            s.chunk_entries,
            path.display()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        let store = Self::from_toml_str(&s)?;
        log::info!(
            target: "edits",
            "loaded {} edit(s) from {}",
            store.stats().tile_edits,
            path.display()
        );
        Ok(store)
    }
}

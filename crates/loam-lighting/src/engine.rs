use std::collections::VecDeque;

use hashbrown::HashSet;
use loam_world::{CHUNK_SIZE, ChunkCoord, LightHooks, MAX_LIGHT, WorldGrid};

use crate::{Direction, LightChannel, LightParams};

/// Queued unit of light work at a global tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LightNode {
    row: i32,
    col: i32,
    level: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LightStepStats {
    pub local_propagated: usize,
    pub local_removed: usize,
    pub ambient_propagated: usize,
    pub ambient_removed: usize,
    pub ambient_chunks: usize,
}

impl LightStepStats {
    pub fn total(&self) -> usize {
        self.local_propagated
            + self.local_removed
            + self.ambient_propagated
            + self.ambient_removed
            + self.ambient_chunks
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PendingWork {
    pub local_propagate: usize,
    pub local_remove: usize,
    pub ambient_propagate: usize,
    pub ambient_remove: usize,
    pub ambient_chunks: usize,
}

impl PendingWork {
    pub fn is_empty(&self) -> bool {
        *self == PendingWork::default()
    }
}

struct Queues {
    channel: LightChannel,
    propagate: VecDeque<LightNode>,
    remove: VecDeque<LightNode>,
    // Coordinates currently waiting in `propagate`.
    wave: HashSet<(i32, i32)>,
}

impl Queues {
    fn new(channel: LightChannel) -> Self {
        Self {
            channel,
            propagate: VecDeque::new(),
            remove: VecDeque::new(),
            wave: HashSet::new(),
        }
    }

    #[inline]
    fn push_propagate(&mut self, row: i32, col: i32, level: u8) {
        if level == 0 {
            return;
        }
        if self.wave.insert((row, col)) {
            self.propagate.push_back(LightNode { row, col, level });
        }
    }

    #[inline]
    fn push_remove(&mut self, row: i32, col: i32, level: u8) {
        if level > 0 {
            self.remove.push_back(LightNode { row, col, level });
        }
    }

    fn is_empty(&self) -> bool {
        self.propagate.is_empty() && self.remove.is_empty()
    }

    /// Raises neighbours of the next queued node. Returns false when empty.
    fn propagate_one(
        &mut self,
        grid: &mut WorldGrid,
        params: &LightParams,
        dirty: &mut HashSet<ChunkCoord>,
    ) -> bool {
        let Some(node) = self.propagate.pop_front() else {
            return false;
        };
        self.wave.remove(&(node.row, node.col));
        let ch = self.channel;
        // Spread from the tile's current value; it may have been raised or
        // cleared since the node was queued.
        let level = match grid.tile_at(node.row, node.col) {
            Some(t) => ch.level(t),
            None => return true,
        };
        if level == 0 {
            return true;
        }
        for dir in Direction::ALL {
            let Some((r, c)) = dir.step(node.row, node.col) else {
                continue;
            };
            // Opaque and absent tiles never receive light.
            if grid.is_opaque(r, c) {
                continue;
            }
            let Some(cost) = ch.attenuation(params, dir, grid.opacity(r, c)) else {
                continue;
            };
            let Some(nt) = grid.tile_at_mut(r, c) else {
                continue;
            };
            let candidate = level.saturating_sub(cost);
            if candidate > ch.level(nt) {
                ch.set_level(nt, candidate);
                dirty.insert(ChunkCoord::containing(r, c));
                self.push_propagate(r, c, candidate);
            }
        }
        true
    }

    /// Retracts light fed by the next removal node. Neighbours brighter than
    /// the node could have lit go back on the propagation queue instead.
    fn remove_one(
        &mut self,
        grid: &mut WorldGrid,
        params: &LightParams,
        ambient_target: u8,
        dirty: &mut HashSet<ChunkCoord>,
    ) -> bool {
        let Some(node) = self.remove.pop_front() else {
            return false;
        };
        let ch = self.channel;
        for dir in Direction::ALL {
            let Some((r, c)) = dir.step(node.row, node.col) else {
                continue;
            };
            let opacity = grid.opacity(r, c);
            let Some(nt) = grid.tile_at_mut(r, c) else {
                continue;
            };
            let current = ch.level(nt);
            if current == 0 {
                continue;
            }
            let fed_by_node = match ch.attenuation(params, dir, opacity) {
                Some(cost) => current <= node.level.saturating_sub(cost),
                None => false,
            };
            if !fed_by_node {
                self.push_propagate(r, c, current);
                continue;
            }
            let own = ch.emission(nt, ambient_target);
            if own >= current {
                // Still at least as bright on its own; only re-spread.
                if own > current {
                    ch.set_level(nt, own);
                    dirty.insert(ChunkCoord::containing(r, c));
                }
                self.push_propagate(r, c, own);
                continue;
            }
            ch.set_level(nt, own);
            dirty.insert(ChunkCoord::containing(r, c));
            self.remove.push_back(LightNode {
                row: r,
                col: c,
                level: current,
            });
            self.push_propagate(r, c, own);
        }
        true
    }

    /// Drains removal first; propagation only runs once no stale light is
    /// left to retract. Returns `(propagated, removed)`.
    fn run(
        &mut self,
        grid: &mut WorldGrid,
        params: &LightParams,
        ambient_target: u8,
        dirty: &mut HashSet<ChunkCoord>,
    ) -> (usize, usize) {
        let mut removed = 0;
        while removed < params.remove_budget && self.remove_one(grid, params, ambient_target, dirty)
        {
            removed += 1;
        }
        let mut propagated = 0;
        if self.remove.is_empty() {
            while propagated < params.propagate_budget && self.propagate_one(grid, params, dirty) {
                propagated += 1;
            }
        }
        (propagated, removed)
    }
}

/// Budgeted incremental lighting for both channels.
pub struct LightEngine {
    params: LightParams,
    local: Queues,
    ambient: Queues,
    ambient_target: u8,
    pending_ambient: VecDeque<ChunkCoord>,
    pending_set: HashSet<ChunkCoord>,
    dirty: HashSet<ChunkCoord>,
}

impl LightEngine {
    pub fn new(params: LightParams) -> Self {
        let ambient_target = params.day_level;
        Self {
            params,
            local: Queues::new(LightChannel::Local),
            ambient: Queues::new(LightChannel::Ambient),
            ambient_target,
            pending_ambient: VecDeque::new(),
            pending_set: HashSet::new(),
            dirty: HashSet::new(),
        }
    }

    #[inline]
    pub fn params(&self) -> &LightParams {
        &self.params
    }

    #[inline]
    pub fn ambient_target(&self) -> u8 {
        self.ambient_target
    }

    /// Changes the level exposed tiles are seeded with by later recalculations.
    pub fn set_ambient_target(&mut self, level: u8) {
        self.ambient_target = level.min(MAX_LIGHT);
    }

    /// Makes `(row, col)` emit `level` local light. No-op on absent tiles.
    pub fn add_source(&mut self, grid: &mut WorldGrid, row: i32, col: i32, level: u8) {
        let level = level.min(MAX_LIGHT);
        if level == 0 {
            return;
        }
        let previous = match grid.tile_at(row, col) {
            Some(t) => t.emission,
            None => return,
        };
        if previous == level {
            return;
        }
        if previous > 0 {
            self.remove_source(grid, row, col);
        }
        let Some(tile) = grid.tile_at_mut(row, col) else {
            return;
        };
        tile.emission = level;
        if level > tile.local {
            tile.local = level;
            self.local.push_propagate(row, col, level);
        }
        self.dirty.insert(ChunkCoord::containing(row, col));
        log::trace!(target: "light", "source added at ({}, {}) level={}", row, col, level);
    }

    /// Stops `(row, col)` emitting and queues retraction of what it lit.
    /// No-op if the tile is absent or not a source.
    pub fn remove_source(&mut self, grid: &mut WorldGrid, row: i32, col: i32) {
        let Some(tile) = grid.tile_at_mut(row, col) else {
            return;
        };
        if tile.emission == 0 {
            return;
        }
        tile.emission = 0;
        let level = tile.local;
        tile.local = 0;
        self.local.push_remove(row, col, level);
        self.dirty.insert(ChunkCoord::containing(row, col));
        log::trace!(target: "light", "source removed at ({}, {}) level={}", row, col, level);
    }

    /// Re-evaluates local light at a tile whose terrain now attenuates
    /// differently: retracts what it carried and lets neighbours refill it.
    pub fn tile_opacity_changed(&mut self, grid: &mut WorldGrid, row: i32, col: i32) {
        {
            let Some(tile) = grid.tile_at_mut(row, col) else {
                return;
            };
            let old = tile.local;
            let own = tile.emission;
            if old > own {
                tile.local = own;
                self.local.push_remove(row, col, old);
                self.dirty.insert(ChunkCoord::containing(row, col));
            }
            self.local.push_propagate(row, col, own);
        }
        for dir in Direction::ALL {
            let Some((r, c)) = dir.step(row, col) else {
                continue;
            };
            if let Some(t) = grid.tile_at(r, c) {
                self.local.push_propagate(r, c, t.local);
            }
        }
    }

    /// Reseeds ambient light in every resident chunk with `target_level`.
    pub fn recalculate_ambient_for_world(&mut self, grid: &mut WorldGrid, target_level: u8) {
        self.set_ambient_target(target_level);
        let coords = grid.store().resident_coords();
        for &c in &coords {
            // Every resident tile is reset, so nothing outside needs retracting.
            self.reset_ambient_chunk(grid, c, false);
        }
        log::debug!(
            target: "light",
            "ambient recalculated for {} chunk(s) at level {}",
            coords.len(),
            self.ambient_target
        );
    }

    /// Reseeds ambient light only in `coords`; light they spilled into other
    /// chunks is retracted through the removal queue.
    pub fn recalculate_ambient_for_chunks(
        &mut self,
        grid: &mut WorldGrid,
        coords: &[ChunkCoord],
        target_level: u8,
    ) {
        self.set_ambient_target(target_level);
        for &c in coords {
            self.reset_ambient_chunk(grid, c, true);
        }
        log::debug!(
            target: "light",
            "ambient recalculated for {} active chunk(s) at level {}",
            coords.len(),
            self.ambient_target
        );
    }

    /// Queues a recalculation of one chunk at the current target; runs
    /// during a later `step`.
    pub fn schedule_ambient(&mut self, coord: ChunkCoord) {
        if self.pending_set.insert(coord) {
            self.pending_ambient.push_back(coord);
        }
    }

    /// Lights a freshly resident chunk: its own sources, ambient seeds, and
    /// light already present along the borders of resident neighbours.
    pub fn seed_chunk(&mut self, grid: &mut WorldGrid, coord: ChunkCoord) {
        let Some(chunk) = grid.store_mut().get_if_resident_mut(coord) else {
            return;
        };
        for (row, col, tile) in chunk.iter_global_mut() {
            if tile.emission > tile.local {
                tile.local = tile.emission;
                self.dirty.insert(coord);
            }
            self.local.push_propagate(row, col, tile.local);
        }
        self.pull_borders(grid, coord, LightChannel::Local);
        self.reset_ambient_chunk(grid, coord, false);
    }

    /// Forgets bookkeeping for a chunk that is no longer resident.
    pub fn chunk_unloaded(&mut self, coord: ChunkCoord) {
        self.dirty.remove(&coord);
        if self.pending_set.remove(&coord) {
            self.pending_ambient.retain(|c| *c != coord);
        }
    }

    pub fn mark_dirty(&mut self, coord: ChunkCoord) {
        self.dirty.insert(coord);
    }

    /// Returns and clears the chunks whose light changed since the last drain.
    pub fn drain_dirty_chunks(&mut self) -> HashSet<ChunkCoord> {
        std::mem::take(&mut self.dirty)
    }

    pub fn dirty_chunks(&self) -> &HashSet<ChunkCoord> {
        &self.dirty
    }

    /// One budgeted pass over pending ambient chunks and all four queues.
    ///
    /// Within a channel, removal runs first and propagation only runs in a
    /// step that leaves the removal queue empty. A large retraction therefore
    /// holds back re-lighting in that channel for several steps; the other
    /// channel is unaffected.
    pub fn step(&mut self, grid: &mut WorldGrid) -> LightStepStats {
        let mut stats = LightStepStats::default();
        while stats.ambient_chunks < self.params.ambient_chunks_per_step {
            let Some(coord) = self.pending_ambient.pop_front() else {
                break;
            };
            self.pending_set.remove(&coord);
            self.reset_ambient_chunk(grid, coord, true);
            stats.ambient_chunks += 1;
        }
        let target = self.ambient_target;
        let (p, r) = self.local.run(grid, &self.params, target, &mut self.dirty);
        stats.local_propagated = p;
        stats.local_removed = r;
        let (p, r) = self.ambient.run(grid, &self.params, target, &mut self.dirty);
        stats.ambient_propagated = p;
        stats.ambient_removed = r;
        if stats.total() > 0 {
            log::trace!(target: "light", "step {:?}", stats);
        }
        stats
    }

    /// Steps until no work remains or `max_steps` is reached; returns steps taken.
    pub fn run_until_settled(&mut self, grid: &mut WorldGrid, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps && !self.is_settled() {
            self.step(grid);
            steps += 1;
        }
        steps
    }

    pub fn is_settled(&self) -> bool {
        self.local.is_empty() && self.ambient.is_empty() && self.pending_ambient.is_empty()
    }

    pub fn pending(&self) -> PendingWork {
        PendingWork {
            local_propagate: self.local.propagate.len(),
            local_remove: self.local.remove.len(),
            ambient_propagate: self.ambient.propagate.len(),
            ambient_remove: self.ambient.remove.len(),
            ambient_chunks: self.pending_ambient.len(),
        }
    }

    fn reset_ambient_chunk(&mut self, grid: &mut WorldGrid, coord: ChunkCoord, retract: bool) {
        let target = self.ambient_target;
        let Some(chunk) = grid.store_mut().get_if_resident_mut(coord) else {
            return;
        };
        let ch = LightChannel::Ambient;
        let mut changed = false;
        for (row, col, tile) in chunk.iter_global_mut() {
            let old = tile.ambient;
            let own = ch.emission(tile, target);
            if old != own {
                changed = true;
                tile.ambient = own;
            }
            if retract && own < old {
                self.ambient.push_remove(row, col, old);
            }
            self.ambient.push_propagate(row, col, own);
        }
        if changed {
            self.dirty.insert(coord);
        }
        self.pull_borders(grid, coord, ch);
    }

    /// Queues the lit tiles just outside `coord`'s edges so their light
    /// flows back in.
    fn pull_borders(&mut self, grid: &WorldGrid, coord: ChunkCoord, channel: LightChannel) {
        let size = CHUNK_SIZE as i32;
        let (row0, col0) = coord.origin();
        let q = match channel {
            LightChannel::Local => &mut self.local,
            LightChannel::Ambient => &mut self.ambient,
        };
        // Edges past the `i32` range have no neighbours to pull from.
        let above = row0.checked_sub(1);
        let below = row0.checked_add(size);
        let left = col0.checked_sub(1);
        let right = col0.checked_add(size);
        for i in 0..size {
            let (row, col) = (row0.saturating_add(i), col0.saturating_add(i));
            let edges = [
                (above, Some(col)),
                (below, Some(col)),
                (Some(row), left),
                (Some(row), right),
            ];
            for (r, c) in edges {
                let (Some(r), Some(c)) = (r, c) else {
                    continue;
                };
                if let Some(t) = grid.tile_at(r, c) {
                    q.push_propagate(r, c, channel.level(t));
                }
            }
        }
    }
}

impl LightHooks for LightEngine {
    fn source_level(&self) -> u8 {
        self.params.source_level
    }

    fn add_source(&mut self, grid: &mut WorldGrid, row: i32, col: i32, level: u8) {
        LightEngine::add_source(self, grid, row, col, level);
    }

    fn remove_source(&mut self, grid: &mut WorldGrid, row: i32, col: i32) {
        LightEngine::remove_source(self, grid, row, col);
    }

    fn opacity_changed(&mut self, grid: &mut WorldGrid, row: i32, col: i32) {
        LightEngine::tile_opacity_changed(self, grid, row, col);
    }

    fn mark_dirty(&mut self, coord: ChunkCoord) {
        LightEngine::mark_dirty(self, coord);
    }

    fn schedule_ambient(&mut self, coord: ChunkCoord) {
        LightEngine::schedule_ambient(self, coord);
    }
}

use crate::{CHUNK_AREA, CHUNK_SIZE, ChunkCoord, Terrain, Tile};

/// Fixed-size tile array for one resident chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    pub coord: ChunkCoord,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Builds a grid from row-major tiles; pads or truncates to the chunk area.
    pub fn from_tiles(coord: ChunkCoord, tiles: Vec<Tile>, fill: Tile) -> Self {
        let mut t = tiles;
        if t.len() != CHUNK_AREA {
            t.resize(CHUNK_AREA, fill);
        }
        Self { coord, tiles: t }
    }

    #[inline]
    pub fn idx(&self, local_row: usize, local_col: usize) -> usize {
        local_row * CHUNK_SIZE + local_col
    }

    #[inline]
    pub fn get(&self, local_row: usize, local_col: usize) -> &Tile {
        &self.tiles[self.idx(local_row, local_col)]
    }

    #[inline]
    pub fn get_mut(&mut self, local_row: usize, local_col: usize) -> &mut Tile {
        let i = self.idx(local_row, local_col);
        &mut self.tiles[i]
    }

    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Yields `(global_row, global_col, tile)`.
    pub fn iter_global(&self) -> impl Iterator<Item = (i32, i32, &Tile)> + '_ {
        let (row0, col0) = self.coord.origin();
        self.tiles.iter().enumerate().map(move |(i, t)| {
            (
                row0.saturating_add((i / CHUNK_SIZE) as i32),
                col0.saturating_add((i % CHUNK_SIZE) as i32),
                t,
            )
        })
    }

    pub fn iter_global_mut(&mut self) -> impl Iterator<Item = (i32, i32, &mut Tile)> + '_ {
        let (row0, col0) = self.coord.origin();
        self.tiles.iter_mut().enumerate().map(move |(i, t)| {
            (
                row0.saturating_add((i / CHUNK_SIZE) as i32),
                col0.saturating_add((i % CHUNK_SIZE) as i32),
                t,
            )
        })
    }

    pub fn count_terrain(&self, terrain: Terrain) -> usize {
        self.tiles.iter().filter(|t| t.terrain == terrain).count()
    }

    pub fn count_decorated(&self) -> usize {
        self.tiles.iter().filter(|t| t.decoration.is_some()).count()
    }
}

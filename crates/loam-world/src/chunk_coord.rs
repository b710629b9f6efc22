use serde::{Deserialize, Serialize};

use crate::CHUNK_SIZE;

/// Chunk-space coordinate. `cx` runs along tile columns, `cy` along tile rows.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
}

impl ChunkCoord {
    /// Lowest chunk index whose tiles are all addressable by `i32`.
    pub const MIN_INDEX: i32 = i32::MIN.div_euclid(CHUNK_SIZE as i32);
    /// Highest chunk index whose tiles are all addressable by `i32`.
    pub const MAX_INDEX: i32 = i32::MAX.div_euclid(CHUNK_SIZE as i32);

    #[inline]
    pub const fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }

    /// Chunk owning the global tile `(row, col)`. Floors toward negative infinity.
    #[inline]
    pub fn containing(row: i32, col: i32) -> Self {
        let size = CHUNK_SIZE as i32;
        Self {
            cx: col.div_euclid(size),
            cy: row.div_euclid(size),
        }
    }

    /// Whether every tile of this chunk has an `i32` global coordinate.
    /// Chunks outside this range are never generated.
    #[inline]
    pub fn in_world(self) -> bool {
        (Self::MIN_INDEX..=Self::MAX_INDEX).contains(&self.cx)
            && (Self::MIN_INDEX..=Self::MAX_INDEX).contains(&self.cy)
    }

    /// Global `(row, col)` of local tile (0, 0). Saturates for chunks
    /// outside the world.
    #[inline]
    pub fn origin(self) -> (i32, i32) {
        let size = CHUNK_SIZE as i32;
        (self.cy.saturating_mul(size), self.cx.saturating_mul(size))
    }

    /// Neighbouring chunk `dx` columns and `dy` rows of chunks away, or
    /// `None` past the edge of the world.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let c = Self {
            cx: self.cx.checked_add(dx)?,
            cy: self.cy.checked_add(dy)?,
        };
        c.in_world().then_some(c)
    }

    /// Chebyshev distance in chunks.
    #[inline]
    pub fn ring_distance(self, other: ChunkCoord) -> u32 {
        self.cx.abs_diff(other.cx).max(self.cy.abs_diff(other.cy))
    }
}

/// Splits a global tile coordinate into its chunk and non-negative local offset.
#[inline]
pub fn split_tile(row: i32, col: i32) -> (ChunkCoord, usize, usize) {
    let size = CHUNK_SIZE as i32;
    (
        ChunkCoord::containing(row, col),
        row.rem_euclid(size) as usize,
        col.rem_euclid(size) as usize,
    )
}

use loam_world::{MAX_LIGHT, Opacity, Tile};

use crate::LightParams;

/// Cardinal step on the tile grid. `Down` moves to the next row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// `(d_row, d_col)`.
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Tile one step away from `(row, col)`, or `None` past the `i32` range.
    #[inline]
    pub fn step(self, row: i32, col: i32) -> Option<(i32, i32)> {
        let (dr, dc) = self.offset();
        Some((row.checked_add(dr)?, col.checked_add(dc)?))
    }
}

/// The two light fields. Both share one propagation/removal algorithm and
/// differ only in how a step attenuates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightChannel {
    Local,
    Ambient,
}

impl LightChannel {
    #[inline]
    pub fn level(self, tile: &Tile) -> u8 {
        match self {
            LightChannel::Local => tile.local,
            LightChannel::Ambient => tile.ambient,
        }
    }

    #[inline]
    pub fn set_level(self, tile: &mut Tile, level: u8) {
        let level = level.min(MAX_LIGHT);
        match self {
            LightChannel::Local => tile.local = level,
            LightChannel::Ambient => tile.ambient = level,
        }
    }

    /// Light a tile produces on its own in this channel.
    #[inline]
    pub fn emission(self, tile: &Tile, ambient_target: u8) -> u8 {
        match self {
            LightChannel::Local => tile.emission,
            LightChannel::Ambient if tile.is_sky_exposed() => ambient_target,
            LightChannel::Ambient => 0,
        }
    }

    #[inline]
    pub fn opacity_cost(params: &LightParams, opacity: Opacity) -> u8 {
        match opacity {
            Opacity::Transparent => 0,
            Opacity::Translucent => params.water_cost,
            Opacity::Opaque => MAX_LIGHT,
        }
    }

    /// Light lost stepping in `dir` into a tile of opacity `into`; `None`
    /// when this channel cannot move that way at all.
    #[inline]
    pub fn attenuation(self, params: &LightParams, dir: Direction, into: Opacity) -> Option<u8> {
        let opacity = Self::opacity_cost(params, into);
        match self {
            LightChannel::Local => Some(params.step_cost.saturating_add(opacity)),
            LightChannel::Ambient => match dir {
                Direction::Up => None,
                Direction::Down if into == Opacity::Opaque => None,
                Direction::Down => Some(opacity),
                Direction::Left | Direction::Right => {
                    Some(params.step_cost.saturating_add(opacity))
                }
            },
        }
    }
}

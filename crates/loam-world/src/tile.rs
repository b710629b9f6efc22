use serde::{Deserialize, Serialize};

/// Highest value either light channel can hold.
pub const MAX_LIGHT: u8 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Water,
    Sand,
    Grass,
    Rock,
    Snow,
}

/// How a tile resists light passing into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opacity {
    Transparent,
    Translucent,
    Opaque,
}

impl Terrain {
    pub const ALL: [Terrain; 5] = [
        Terrain::Water,
        Terrain::Sand,
        Terrain::Grass,
        Terrain::Rock,
        Terrain::Snow,
    ];

    #[inline]
    pub fn is_water(self) -> bool {
        matches!(self, Terrain::Water)
    }

    #[inline]
    pub fn opacity(self) -> Opacity {
        match self {
            Terrain::Water => Opacity::Translucent,
            Terrain::Rock => Opacity::Opaque,
            Terrain::Sand | Terrain::Grass | Terrain::Snow => Opacity::Transparent,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decoration {
    Tree,
    Bush,
    Flower,
}

impl Decoration {
    /// Starting hit points for destructible decorations.
    pub fn hit_points(self) -> Option<u8> {
        match self {
            Decoration::Tree => Some(5),
            Decoration::Bush => Some(2),
            Decoration::Flower => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub terrain: Terrain,
    pub elevation: u16,
    pub ambient: u8,
    pub local: u8,
    /// Local-light intensity this tile emits; 0 when it is not a source.
    pub emission: u8,
    pub decoration: Option<Decoration>,
    pub hit_points: Option<u8>,
}

impl Tile {
    pub fn new(terrain: Terrain, elevation: u16) -> Self {
        Self {
            terrain,
            elevation,
            ambient: 0,
            local: 0,
            emission: 0,
            decoration: None,
            hit_points: None,
        }
    }

    #[inline]
    pub fn has_light_source(&self) -> bool {
        self.emission > 0
    }

    /// Open to the sky: every land tile above sea level.
    #[inline]
    pub fn is_sky_exposed(&self) -> bool {
        !self.terrain.is_water()
    }

    pub fn set_decoration(&mut self, decoration: Option<Decoration>) {
        self.decoration = decoration;
        self.hit_points = decoration.and_then(Decoration::hit_points);
    }
}

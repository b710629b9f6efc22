use hashbrown::{HashMap, HashSet};
use loam_world::{ChunkCoord, Decoration, Terrain, Tile, WorldGrid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Layer {
    Terrain,
    Local,
    Ambient,
}

/// Text stand-in for a GPU renderer: counts chunk uploads fed from the light
/// engine's dirty set and draws any region of the grid as characters.
#[derive(Default)]
pub struct AsciiRenderer {
    uploads: HashMap<ChunkCoord, u64>,
    total: u64,
}

impl AsciiRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts a batch of dirty chunks; only resident ones count as uploads.
    pub fn upload(&mut self, grid: &WorldGrid, dirty: HashSet<ChunkCoord>) -> usize {
        let mut n = 0;
        for c in dirty {
            if grid.store().is_resident(c) {
                *self.uploads.entry(c).or_insert(0) += 1;
                n += 1;
            }
        }
        self.total += n as u64;
        n
    }

    pub fn forget(&mut self, coord: ChunkCoord) {
        self.uploads.remove(&coord);
    }

    pub fn uploads(&self, coord: ChunkCoord) -> u64 {
        self.uploads.get(&coord).copied().unwrap_or(0)
    }

    pub fn total_uploads(&self) -> u64 {
        self.total
    }

    /// Rows `row0..row0+height`, columns `col0..col0+width`, one line per row.
    pub fn render(
        &self,
        grid: &WorldGrid,
        layer: Layer,
        (row0, col0): (i32, i32),
        (height, width): (i32, i32),
    ) -> String {
        let mut out = String::with_capacity(((width + 1) * height.max(0)) as usize);
        for r in row0..row0 + height {
            for c in col0..col0 + width {
                out.push(match grid.tile_at(r, c) {
                    Some(t) => glyph(t, layer),
                    None => ' ',
                });
            }
            out.push('\n');
        }
        out
    }

    pub fn legend(layer: Layer) -> &'static str {
        match layer {
            Layer::Terrain => {
                "~ water  . sand  , grass  ^ rock  # snow  T tree  * bush  \" flower  @ light"
            }
            Layer::Local | Layer::Ambient => "light level 0-f (hex), blank = not resident",
        }
    }
}

fn glyph(t: &Tile, layer: Layer) -> char {
    match layer {
        Layer::Terrain => {
            if t.has_light_source() {
                return '@';
            }
            match (t.decoration, t.terrain) {
                (Some(Decoration::Tree), _) => 'T',
                (Some(Decoration::Bush), _) => '*',
                (Some(Decoration::Flower), _) => '"',
                (None, Terrain::Water) => '~',
                (None, Terrain::Sand) => '.',
                (None, Terrain::Grass) => ',',
                (None, Terrain::Rock) => '^',
                (None, Terrain::Snow) => '#',
            }
        }
        Layer::Local => hex(t.local),
        Layer::Ambient => hex(t.ambient),
    }
}

fn hex(level: u8) -> char {
    char::from_digit(u32::from(level.min(15)), 16).unwrap_or('?')
}

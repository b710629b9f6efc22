use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::render::Layer;

#[derive(Parser, Debug)]
#[command(name = "loam", version, about = "Chunked tile terrain with incremental lighting")]
pub struct Cli {
    /// TOML config with [worldgen], [lighting], [path] and [driver] sections
    #[arg(long, global = true, default_value = "loam.toml")]
    pub config: PathBuf,

    /// World seed
    #[arg(long, global = true, default_value_t = 1337)]
    pub seed: i32,

    /// Log filter used when RUST_LOG is unset (e.g. "info", "light=trace")
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the world loop headless for a number of ticks
    Simulate {
        #[arg(long, default_value_t = 240)]
        ticks: u64,
        /// Place a light source at ROW,COL on the first tick (repeatable)
        #[arg(long = "torch", value_parser = parse_coord, allow_hyphen_values = true)]
        torches: Vec<(i32, i32)>,
        /// Hit the decoration at ROW,COL once on the first tick (repeatable)
        #[arg(long, value_parser = parse_coord, allow_hyphen_values = true)]
        damage: Vec<(i32, i32)>,
        /// Edit file to load at startup (overrides [driver] edits_path)
        #[arg(long)]
        edits: Option<PathBuf>,
        /// Write the edit log here when done
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Settle the world around a point and print one layer as text
    Render {
        #[arg(long, value_enum, default_value_t = Layer::Terrain)]
        layer: Layer,
        #[arg(long, value_parser = parse_coord, allow_hyphen_values = true, default_value = "0,0")]
        center: (i32, i32),
        /// Half-size of the printed square, in tiles
        #[arg(long, default_value_t = 24)]
        half: i32,
        #[arg(long = "torch", value_parser = parse_coord, allow_hyphen_values = true)]
        torches: Vec<(i32, i32)>,
        /// Render after the first day/night flip
        #[arg(long)]
        night: bool,
    },
    /// Find a walkable route between two tiles
    Path {
        #[arg(long, value_parser = parse_coord, allow_hyphen_values = true)]
        from: (i32, i32),
        #[arg(long, value_parser = parse_coord, allow_hyphen_values = true)]
        to: (i32, i32),
    },
}

/// Parses `ROW,COL`.
pub fn parse_coord(s: &str) -> Result<(i32, i32), String> {
    let (r, c) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got {s:?}"))?;
    let r = r
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("bad row {r:?}: {e}"))?;
    let c = c
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("bad column {c:?}: {e}"))?;
    Ok((r, c))
}

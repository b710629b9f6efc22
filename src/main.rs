#![forbid(unsafe_code)]

mod cli;
mod config;
mod day_cycle;
mod driver;
mod render;

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use loam_edit::EditStore;
use loam_path::path_cost;

use cli::{Cli, Command};
use config::{LoamConfig, load_config};
use driver::{EditCommand, WorldDriver};
use render::AsciiRenderer;

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level.as_str()))
        .init();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let cfg = load_config(&cli.config)?;
    match cli.command {
        Command::Simulate {
            ticks,
            torches,
            damage,
            edits,
            save,
        } => simulate(&cfg, cli.seed, ticks, &torches, &damage, edits, save),
        Command::Render {
            layer,
            center,
            half,
            torches,
            night,
        } => {
            let mut d = WorldDriver::from_config(&cfg, cli.seed);
            d.set_center(center.0, center.1);
            d.tick();
            for &(r, c) in &torches {
                d.queue_edit(EditCommand::ToggleLight { row: r, col: c });
            }
            if night {
                for _ in 0..cfg.driver.ticks_per_phase {
                    d.tick();
                }
            }
            d.run_until_settled(100_000);
            let half = half.max(1);
            let text = d.renderer().render(
                d.grid(),
                layer,
                (center.0 - half, center.1 - half),
                (2 * half + 1, 2 * half + 1),
            );
            print!("{text}");
            println!("{}", AsciiRenderer::legend(layer));
            Ok(())
        }
        Command::Path { from, to } => {
            let mut d = WorldDriver::from_config(&cfg, cli.seed);
            let radius = cfg.driver.radius.max(0);
            // Centre the resident area between the endpoints.
            d.set_center((from.0 + to.0) / 2, (from.1 + to.1) / 2);
            d.tick();
            let path = d.find_path(from, to);
            if path.is_empty() {
                println!(
                    "no walkable route from {:?} to {:?} within radius {}",
                    from, to, radius
                );
            } else {
                for n in &path {
                    println!("{},{}", n.row, n.col);
                }
                println!("{} steps, cost {}", path.len() - 1, path_cost(&path));
            }
            Ok(())
        }
    }
}

fn simulate(
    cfg: &LoamConfig,
    seed: i32,
    ticks: u64,
    torches: &[(i32, i32)],
    damage: &[(i32, i32)],
    edits: Option<std::path::PathBuf>,
    save: Option<std::path::PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let mut d = WorldDriver::from_config(cfg, seed);
    if let Some(path) = edits.or_else(|| cfg.driver.edits_path.clone()) {
        if path.exists() {
            d = d.with_edits(EditStore::load(&path)?);
        } else {
            log::warn!(target: "edits", "edit file {} not found; starting clean", path.display());
        }
    }
    for &(r, c) in torches {
        d.queue_edit(EditCommand::ToggleLight { row: r, col: c });
    }
    for &(r, c) in damage {
        d.queue_edit(EditCommand::Damage {
            row: r,
            col: c,
            amount: 1,
        });
    }
    let mut light_nodes = 0usize;
    let mut flips = 0usize;
    for _ in 0..ticks {
        let report = d.tick();
        light_nodes += report.light.total();
        if report.ambient_level.is_some() {
            flips += 1;
        }
    }
    let grid = d.grid();
    log::info!(
        target: "events",
        "[tick {}] Done chunks={} light_work={} ambient_flips={} uploads={} settled={}",
        d.tick_count(),
        grid.store().len(),
        light_nodes,
        flips,
        d.renderer().total_uploads(),
        d.lights().is_settled()
    );
    println!(
        "ticks={} chunks={} light_work={} ambient_flips={} uploads={} pending={:?}",
        d.tick_count(),
        grid.store().len(),
        light_nodes,
        flips,
        d.renderer().total_uploads(),
        d.lights().pending()
    );
    if let Some(path) = save {
        d.edits().save(&path)?;
    }
    Ok(())
}

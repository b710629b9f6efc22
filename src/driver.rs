use std::collections::VecDeque;

use loam_edit::EditStore;
use loam_lighting::{LightEngine, LightParams, LightStepStats};
use loam_path::{PathNode, PathParams, PathPlanner};
use loam_world::{WorldGenParams, WorldGrid};

use crate::config::{DriverConfig, LoamConfig};
use crate::day_cycle::DayCycle;
use crate::render::AsciiRenderer;

/// A tile edit waiting for the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditCommand {
    SetElevation { row: i32, col: i32, elevation: i32 },
    ToggleLight { row: i32, col: i32 },
    Damage { row: i32, col: i32, amount: u8 },
}

#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub activated: usize,
    pub unloaded: usize,
    pub edits_applied: usize,
    pub ambient_level: Option<u8>,
    pub uploaded: usize,
    pub light: LightStepStats,
}

/// Headless world loop: owns the grid and every engine that reads or
/// writes it, and runs them in a fixed order each tick.
pub struct WorldDriver {
    grid: WorldGrid,
    lights: LightEngine,
    planner: PathPlanner,
    edits: EditStore,
    renderer: AsciiRenderer,
    day: DayCycle,
    queued: VecDeque<EditCommand>,
    center: (i32, i32),
    radius: i32,
    tick: u64,
}

impl WorldDriver {
    pub fn new(
        seed: i32,
        world: WorldGenParams,
        light: LightParams,
        path: PathParams,
        cfg: &DriverConfig,
    ) -> Self {
        world.validate();
        light.validate();
        let day = DayCycle::new(cfg.ticks_per_phase, light.day_level, light.night_level);
        let mut lights = LightEngine::new(light);
        lights.set_ambient_target(day.level());
        Self {
            grid: WorldGrid::with_seed(seed, world),
            lights,
            planner: PathPlanner::new(path),
            edits: EditStore::new(seed),
            renderer: AsciiRenderer::new(),
            day,
            queued: VecDeque::new(),
            center: (0, 0),
            radius: cfg.radius.max(0),
            tick: 0,
        }
    }

    pub fn from_config(cfg: &LoamConfig, seed: i32) -> Self {
        let world = WorldGenParams::from_config(&cfg.worldgen);
        let light = LightParams::from_config(&cfg.lighting);
        let path = PathParams::from_config(&cfg.path, &world);
        Self::new(seed, world, light, path, &cfg.driver)
    }

    /// Replaces the edit log; chunks activated from now on replay it.
    pub fn with_edits(mut self, edits: EditStore) -> Self {
        if edits.seed() != self.grid.store().seed() {
            log::warn!(
                target: "edits",
                "edit file was made for seed {} but world seed is {}",
                edits.seed(),
                self.grid.store().seed()
            );
        }
        self.edits = edits;
        self
    }

    pub fn grid(&self) -> &WorldGrid {
        &self.grid
    }

    pub fn lights(&self) -> &LightEngine {
        &self.lights
    }

    pub fn edits(&self) -> &EditStore {
        &self.edits
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn set_center(&mut self, row: i32, col: i32) {
        self.center = (row, col);
    }

    pub fn queue_edit(&mut self, cmd: EditCommand) {
        self.queued.push_back(cmd);
    }

    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;
        let tick = self.tick;
        let mut report = TickReport::default();

        // 1. Activation and unloading.
        let (row, col) = self.center;
        let gone = self.grid.retain_within(row, col, self.radius);
        for &c in &gone {
            self.lights.chunk_unloaded(c);
            self.renderer.forget(c);
            log::debug!(target: "events", "[tick {}] ChunkUnloaded ({}, {})", tick, c.cx, c.cy);
        }
        let fresh = self.grid.activate_around(row, col, self.radius);
        for &c in &fresh {
            let restored = self.edits.restore_chunk(&mut self.grid, &mut self.lights, c);
            self.lights.seed_chunk(&mut self.grid, c);
            log::debug!(
                target: "events",
                "[tick {}] ChunkActivated ({}, {}) edits={}",
                tick,
                c.cx,
                c.cy,
                restored
            );
        }
        report.activated = fresh.len();
        report.unloaded = gone.len();

        // 2. Queued edits.
        while let Some(cmd) = self.queued.pop_front() {
            if self.apply(cmd) {
                report.edits_applied += 1;
            }
        }

        // 3. Day/night boundary.
        if let Some(level) = self.day.advance() {
            let active = self.grid.store().resident_coords();
            self.lights
                .recalculate_ambient_for_chunks(&mut self.grid, &active, level);
            report.ambient_level = Some(level);
            log::info!(target: "events", "[tick {}] AmbientChanged level={}", tick, level);
        }

        // 4. Dirty chunks to the renderer.
        let dirty = self.lights.drain_dirty_chunks();
        report.uploaded = self.renderer.upload(&self.grid, dirty);

        // 5. Budgeted lighting.
        report.light = self.lights.step(&mut self.grid);

        log::trace!(
            target: "events",
            "[tick {}] Tick activated={} unloaded={} edits={} uploaded={} light={}",
            tick,
            report.activated,
            report.unloaded,
            report.edits_applied,
            report.uploaded,
            report.light.total()
        );
        report
    }

    fn apply(&mut self, cmd: EditCommand) -> bool {
        let (row, col, applied) = match cmd {
            EditCommand::SetElevation {
                row,
                col,
                elevation,
            } => {
                let known = self.grid.tile_at(row, col).is_some();
                self.grid
                    .set_elevation(row, col, elevation, &mut self.lights);
                (row, col, known)
            }
            EditCommand::ToggleLight { row, col } => {
                let r = self.grid.toggle_light_source(row, col, &mut self.lights);
                (row, col, r.is_some())
            }
            EditCommand::Damage { row, col, amount } => {
                let r = self
                    .grid
                    .damage_decoration(row, col, amount, &mut self.lights);
                (row, col, r.is_some())
            }
        };
        if applied {
            self.edits.record_from(&self.grid, row, col);
            log::info!(target: "events", "[tick {}] EditApplied {:?}", self.tick, cmd);
        } else {
            log::debug!(target: "events", "[tick {}] EditIgnored {:?}", self.tick, cmd);
        }
        applied
    }

    /// Keeps ticking until lighting has no queued work, up to `max_ticks`.
    pub fn run_until_settled(&mut self, max_ticks: u64) -> u64 {
        let mut n = 0;
        while n < max_ticks {
            self.tick();
            n += 1;
            if self.lights.is_settled() && self.queued.is_empty() {
                break;
            }
        }
        n
    }

    pub fn find_path(&self, from: (i32, i32), to: (i32, i32)) -> Vec<PathNode> {
        self.planner.find_path(&self.grid, from.0, from.1, to.0, to.1)
    }
}

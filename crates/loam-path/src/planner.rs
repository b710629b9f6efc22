use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::{Hash, Hasher};

use hashbrown::{HashMap, HashSet};
use loam_world::WorldGrid;

use crate::PathParams;

const NEIGHBORS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// One step of a found route. Equality and hashing look only at the position.
#[derive(Clone, Copy, Debug)]
pub struct PathNode {
    pub row: i32,
    pub col: i32,
    pub g: u32,
    pub h: u32,
    pub f: u32,
    pub parent: Option<(i32, i32)>,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row && self.col == other.col
    }
}
impl Eq for PathNode {}
impl Hash for PathNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.row.hash(state);
        self.col.hash(state);
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f: u32,
    h: u32,
    g: u32,
    pos: (i32, i32),
}

// Min-heap on f, then h, over std's max-heap.
impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| self.pos.cmp(&other.pos))
    }
}
impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[inline]
fn heuristic(params: &PathParams, from: (i32, i32), to: (i32, i32)) -> u32 {
    let d = from.0.abs_diff(to.0).saturating_add(from.1.abs_diff(to.1));
    d.saturating_mul(params.step_cost)
}

/// Whether a single cardinal move from `from` to `to` is allowed: both tiles
/// resident, the destination dry, and the elevation change within the step limit.
pub fn is_walkable(grid: &WorldGrid, params: &PathParams, from: (i32, i32), to: (i32, i32)) -> bool {
    let (Some(a), Some(b)) = (grid.tile_at(from.0, from.1), grid.tile_at(to.0, to.1)) else {
        return false;
    };
    !b.terrain.is_water() && a.elevation.abs_diff(b.elevation) <= params.max_walk_step
}

/// Summed move cost of a route.
pub fn path_cost(path: &[PathNode]) -> u32 {
    path.last().map(|n| n.g).unwrap_or(0)
}

/// A* from `(start_row, start_col)` to `(end_row, end_col)`. Returns the route
/// including both endpoints, a single node when they coincide, or an empty
/// vector when either end is absent or no walkable route exists.
pub fn find_path(
    grid: &WorldGrid,
    params: &PathParams,
    start_row: i32,
    start_col: i32,
    end_row: i32,
    end_col: i32,
) -> Vec<PathNode> {
    let start = (start_row, start_col);
    let goal = (end_row, end_col);
    if grid.tile_at(start.0, start.1).is_none() || grid.tile_at(goal.0, goal.1).is_none() {
        return Vec::new();
    }
    if start == goal {
        return vec![PathNode {
            row: start.0,
            col: start.1,
            g: 0,
            h: 0,
            f: 0,
            parent: None,
        }];
    }

    let mut open = BinaryHeap::new();
    let mut best_g: HashMap<(i32, i32), u32> = HashMap::new();
    let mut parents: HashMap<(i32, i32), (i32, i32)> = HashMap::new();
    let mut closed: HashSet<(i32, i32)> = HashSet::new();

    let h0 = heuristic(params, start, goal);
    best_g.insert(start, 0);
    open.push(OpenEntry {
        f: h0,
        h: h0,
        g: 0,
        pos: start,
    });

    while let Some(entry) = open.pop() {
        let pos = entry.pos;
        // Stale entry: a cheaper route to this tile was queued later.
        if closed.contains(&pos) || best_g.get(&pos).is_some_and(|&g| entry.g > g) {
            continue;
        }
        if pos == goal {
            log::debug!(
                target: "path",
                "path {:?} -> {:?}: cost {} after {} expansions",
                start,
                goal,
                entry.g,
                closed.len()
            );
            return reconstruct(params, &best_g, &parents, start, goal);
        }
        closed.insert(pos);
        if closed.len() > params.max_nodes {
            log::debug!(
                target: "path",
                "path {:?} -> {:?}: gave up after {} expansions",
                start,
                goal,
                params.max_nodes
            );
            return Vec::new();
        }
        for (dr, dc) in NEIGHBORS {
            let (Some(row), Some(col)) = (pos.0.checked_add(dr), pos.1.checked_add(dc)) else {
                continue;
            };
            let next = (row, col);
            if closed.contains(&next) || !is_walkable(grid, params, pos, next) {
                continue;
            }
            let g = entry.g.saturating_add(params.step_cost);
            if best_g.get(&next).is_some_and(|&old| old <= g) {
                continue;
            }
            best_g.insert(next, g);
            parents.insert(next, pos);
            let h = heuristic(params, next, goal);
            open.push(OpenEntry {
                f: g.saturating_add(h),
                h,
                g,
                pos: next,
            });
        }
    }
    log::debug!(target: "path", "path {:?} -> {:?}: unreachable", start, goal);
    Vec::new()
}

fn reconstruct(
    params: &PathParams,
    best_g: &HashMap<(i32, i32), u32>,
    parents: &HashMap<(i32, i32), (i32, i32)>,
    start: (i32, i32),
    goal: (i32, i32),
) -> Vec<PathNode> {
    let mut out = Vec::new();
    let mut cur = Some(goal);
    while let Some(pos) = cur {
        let g = best_g.get(&pos).copied().unwrap_or(0);
        let h = heuristic(params, pos, goal);
        let parent = if pos == start {
            None
        } else {
            parents.get(&pos).copied()
        };
        out.push(PathNode {
            row: pos.0,
            col: pos.1,
            g,
            h,
            f: g.saturating_add(h),
            parent,
        });
        cur = parent;
    }
    out.reverse();
    out
}

/// Route search bound to one set of parameters.
#[derive(Clone, Debug)]
pub struct PathPlanner {
    params: PathParams,
}

impl PathPlanner {
    pub fn new(params: PathParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn find_path(
        &self,
        grid: &WorldGrid,
        start_row: i32,
        start_col: i32,
        end_row: i32,
        end_col: i32,
    ) -> Vec<PathNode> {
        find_path(grid, &self.params, start_row, start_col, end_row, end_col)
    }
}

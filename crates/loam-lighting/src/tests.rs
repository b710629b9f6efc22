use super::*;
use hashbrown::HashSet;
use loam_world::{CHUNK_SIZE, ChunkCoord, NoLighting, WorldGenParams, WorldGrid};

fn flat_world() -> WorldGrid {
    let mut g = WorldGrid::with_seed(1, WorldGenParams::flat(30));
    g.activate_around(0, 0, 1);
    g
}

fn settle(e: &mut LightEngine, g: &mut WorldGrid) {
    e.run_until_settled(g, 100_000);
    assert!(e.is_settled(), "light queues did not drain: {:?}", e.pending());
}

fn local(g: &WorldGrid, row: i32, col: i32) -> u8 {
    g.tile_at(row, col).unwrap().local
}

fn ambient(g: &WorldGrid, row: i32, col: i32) -> u8 {
    g.tile_at(row, col).unwrap().ambient
}

fn snapshot(g: &WorldGrid, channel: LightChannel) -> Vec<(i32, i32, u8)> {
    let mut out = Vec::new();
    for c in g.store().resident_coords() {
        let chunk = g.store().get_if_resident(c).unwrap();
        out.extend(chunk.iter_global().map(|(r, col, t)| (r, col, channel.level(t))));
    }
    out
}

fn lit_with(sources: &[(i32, i32, u8)]) -> WorldGrid {
    let mut g = flat_world();
    let mut e = LightEngine::new(LightParams::default());
    for &(r, c, l) in sources {
        e.add_source(&mut g, r, c, l);
    }
    settle(&mut e, &mut g);
    g
}

fn set_water(g: &mut WorldGrid, rows: std::ops::RangeInclusive<i32>, cols: std::ops::RangeInclusive<i32>) {
    for r in rows {
        for c in cols.clone() {
            g.set_elevation(r, c, 0, &mut NoLighting);
        }
    }
}

#[test]
fn torch_falls_off_by_one_per_tile() {
    let g = lit_with(&[(0, 0, 10)]);
    assert_eq!(local(&g, 0, 0), 10);
    assert_eq!(local(&g, 1, 0), 9);
    assert_eq!(local(&g, 2, 0), 8);
    // Across the negative chunk boundary.
    assert_eq!(local(&g, 0, -1), 9);
    assert_eq!(local(&g, -3, -4), 3);
    assert_eq!(local(&g, 20, 0), 0);
    assert_eq!(ambient(&g, 0, 0), 0);
}

#[test]
fn toggle_twice_returns_to_darkness() {
    let mut g = flat_world();
    let mut e = LightEngine::new(LightParams::default());
    assert_eq!(g.toggle_light_source(16, 16, &mut e), Some(true));
    settle(&mut e, &mut g);
    assert_eq!(local(&g, 16, 16), e.params().source_level);
    let expected: HashSet<ChunkCoord> = [ChunkCoord::new(0, 0)].into_iter().collect();
    assert_eq!(e.drain_dirty_chunks(), expected);

    assert_eq!(g.toggle_light_source(16, 16, &mut e), Some(false));
    settle(&mut e, &mut g);
    assert!(snapshot(&g, LightChannel::Local).iter().all(|&(_, _, l)| l == 0));
    assert_eq!(e.drain_dirty_chunks(), expected);
    assert!(e.drain_dirty_chunks().is_empty());
}

#[test]
fn removing_one_of_two_overlapping_sources_matches_fresh_lighting() {
    let mut g = flat_world();
    let mut e = LightEngine::new(LightParams::default());
    e.add_source(&mut g, 0, 0, 10);
    e.add_source(&mut g, 0, 5, 6);
    settle(&mut e, &mut g);
    assert_eq!(local(&g, 0, 5), 6);
    assert_eq!(local(&g, 0, 3), 7);
    // Only the weaker source reaches this far.
    assert_eq!(local(&g, 0, 7), 4);

    e.remove_source(&mut g, 0, 5);
    settle(&mut e, &mut g);
    assert_eq!(
        snapshot(&g, LightChannel::Local),
        snapshot(&lit_with(&[(0, 0, 10)]), LightChannel::Local)
    );

    let mut g = flat_world();
    let mut e = LightEngine::new(LightParams::default());
    e.add_source(&mut g, 0, 0, 10);
    e.add_source(&mut g, 0, 5, 6);
    settle(&mut e, &mut g);
    e.remove_source(&mut g, 0, 0);
    settle(&mut e, &mut g);
    assert_eq!(local(&g, 0, 5), 6);
    assert_eq!(local(&g, 0, 7), 4);
    assert_eq!(local(&g, 0, 0), 1);
    assert_eq!(
        snapshot(&g, LightChannel::Local),
        snapshot(&lit_with(&[(0, 5, 6)]), LightChannel::Local)
    );
}

#[test]
fn water_costs_extra_and_rock_blocks() {
    let mut g = flat_world();
    g.set_elevation(0, 1, 0, &mut NoLighting);
    let rock = g.params().rock_level as i32;
    let size = CHUNK_SIZE as i32;
    for r in -size..2 * size {
        g.set_elevation(r, 12, rock, &mut NoLighting);
    }
    let mut e = LightEngine::new(LightParams::default());
    e.add_source(&mut g, 0, 0, 10);
    e.add_source(&mut g, 16, 10, 14);
    settle(&mut e, &mut g);

    assert_eq!(local(&g, 0, 1), 10 - 1 - 2);
    assert_eq!(local(&g, 16, 11), 13);
    assert!(g.is_opaque(16, 12));
    assert_eq!(local(&g, 16, 12), 0);
    assert_eq!(local(&g, 16, 13), 0);
    assert_eq!(local(&g, 16, 20), 0);
}

#[test]
fn ambient_fills_land_and_dims_into_water() {
    let mut g = flat_world();
    set_water(&mut g, 10..=14, 10..=14);
    let mut e = LightEngine::new(LightParams::default());
    e.recalculate_ambient_for_world(&mut g, 15);
    settle(&mut e, &mut g);

    assert_eq!(ambient(&g, 9, 12), 15);
    assert_eq!(ambient(&g, -20, 40), 15);
    // Downward into water costs only the water penalty.
    assert_eq!(ambient(&g, 10, 12), 13);
    assert_eq!(ambient(&g, 11, 12), 11);
    // Sideways pays the step cost as well.
    assert_eq!(ambient(&g, 11, 10), 12);
}

#[test]
fn ambient_never_climbs_upward() {
    let mut g = flat_world();
    set_water(&mut g, 10..=20, 10..=20);
    let mut e = LightEngine::new(LightParams::default());
    e.recalculate_ambient_for_world(&mut g, 15);
    settle(&mut e, &mut g);

    assert_eq!(ambient(&g, 10, 15), 13);
    assert_eq!(ambient(&g, 21, 15), 15);
    // Lit land sits directly below, but light cannot move up into it.
    assert_eq!(ambient(&g, 20, 15), 0);
}

#[test]
fn night_recalculation_lowers_every_exposed_tile() {
    let mut g = flat_world();
    let mut e = LightEngine::new(LightParams::default());
    e.recalculate_ambient_for_world(&mut g, 15);
    settle(&mut e, &mut g);
    e.drain_dirty_chunks();

    let night = e.params().night_level;
    e.recalculate_ambient_for_world(&mut g, night);
    settle(&mut e, &mut g);
    assert_eq!(e.ambient_target(), night);
    assert!(snapshot(&g, LightChannel::Ambient).iter().all(|&(_, _, l)| l == night));
    assert_eq!(e.drain_dirty_chunks().len(), 9);
}

#[test]
fn chunk_recalculation_after_edit_darkens_new_water() {
    let mut g = flat_world();
    let mut e = LightEngine::new(LightParams::default());
    e.recalculate_ambient_for_world(&mut g, 15);
    settle(&mut e, &mut g);

    g.set_elevation(5, 5, 0, &mut e);
    assert_eq!(e.pending().ambient_chunks, 1);
    settle(&mut e, &mut g);
    assert_eq!(ambient(&g, 5, 5), 13);
    assert_eq!(ambient(&g, 6, 5), 15);
}

#[test]
fn steps_respect_budgets_and_removal_runs_first() {
    let params = LightParams {
        propagate_budget: 8,
        remove_budget: 4,
        ..LightParams::default()
    };
    params.validate();
    let mut g = flat_world();
    let mut e = LightEngine::new(params);
    e.add_source(&mut g, 0, 0, 14);
    let first = e.step(&mut g);
    assert!(first.local_propagated <= 8);
    assert!(!e.is_settled());
    settle(&mut e, &mut g);
    assert_eq!(
        snapshot(&g, LightChannel::Local),
        snapshot(&lit_with(&[(0, 0, 14)]), LightChannel::Local)
    );

    e.remove_source(&mut g, 0, 0);
    while !e.is_settled() {
        let s = e.step(&mut g);
        assert!(s.local_removed <= 4);
        assert!(s.local_propagated <= 8);
        if e.pending().local_remove > 0 {
            assert_eq!(s.local_propagated, 0);
        }
    }
    assert!(snapshot(&g, LightChannel::Local).iter().all(|&(_, _, l)| l == 0));
}

#[test]
fn absent_tiles_are_ignored_and_seeding_pulls_light_across() {
    let mut g = WorldGrid::with_seed(1, WorldGenParams::flat(30));
    g.activate_around(0, 0, 0);
    let mut e = LightEngine::new(LightParams::default());
    e.add_source(&mut g, 10_000, 10_000, 12);
    assert!(e.is_settled());
    assert!(e.dirty_chunks().is_empty());

    e.add_source(&mut g, 0, 0, 10);
    settle(&mut e, &mut g);
    assert!(g.tile_at(0, -1).is_none());

    let west = ChunkCoord::containing(0, -1);
    g.store_mut().get_or_generate(west);
    g.tile_at_mut(5, -5).unwrap().emission = 8;
    e.seed_chunk(&mut g, west);
    settle(&mut e, &mut g);
    assert_eq!(local(&g, 0, -1), 9);
    assert_eq!(local(&g, 0, -3), 7);
    assert_eq!(local(&g, 5, -5), 8);
    assert_eq!(ambient(&g, 0, -1), e.ambient_target());
}

#[test]
fn light_at_the_coordinate_limits_stays_in_range() {
    for corner in [i32::MAX, i32::MIN] {
        let mut g = WorldGrid::with_seed(1, WorldGenParams::flat(30));
        let fresh = g.activate_around(corner, corner, 1);
        assert_eq!(fresh.len(), 4);
        let mut e = LightEngine::new(LightParams::default());
        for c in fresh {
            e.seed_chunk(&mut g, c);
        }
        e.add_source(&mut g, corner, corner, 10);
        settle(&mut e, &mut g);
        let inward = if corner > 0 { -1 } else { 1 };
        assert_eq!(local(&g, corner, corner), 10);
        assert_eq!(local(&g, corner + inward, corner), 9);
        assert_eq!(local(&g, corner, corner + 3 * inward), 7);
        assert_eq!(ambient(&g, corner, corner), 15);

        e.remove_source(&mut g, corner, corner);
        settle(&mut e, &mut g);
        assert!(snapshot(&g, LightChannel::Local).iter().all(|&(_, _, l)| l == 0));
    }
}

#[test]
fn unloaded_chunks_drop_bookkeeping() {
    let mut e = LightEngine::new(LightParams::default());
    let c = ChunkCoord::new(2, -1);
    e.mark_dirty(c);
    e.schedule_ambient(c);
    e.schedule_ambient(c);
    assert_eq!(e.pending().ambient_chunks, 1);
    e.chunk_unloaded(c);
    assert!(e.pending().is_empty());
    assert!(e.drain_dirty_chunks().is_empty());
}

#[test]
fn terrain_edits_reshape_local_light() {
    let mut g = flat_world();
    let mut e = LightEngine::new(LightParams::default());
    e.add_source(&mut g, 16, 16, 10);
    settle(&mut e, &mut g);
    assert_eq!(local(&g, 16, 18), 8);

    let rock = g.params().rock_level as i32;
    g.set_elevation(16, 17, rock, &mut e);
    settle(&mut e, &mut g);
    assert_eq!(local(&g, 16, 17), 0);
    assert_eq!(local(&g, 16, 18), 6);

    g.set_elevation(16, 17, 30, &mut e);
    settle(&mut e, &mut g);
    assert_eq!(local(&g, 16, 17), 9);
    assert_eq!(local(&g, 16, 18), 8);
}

#[test]
fn sources_survive_rock_but_not_water() {
    let mut g = flat_world();
    let mut e = LightEngine::new(LightParams::default());
    g.toggle_light_source(16, 16, &mut e);
    settle(&mut e, &mut g);
    let level = e.params().source_level;

    let rock = g.params().rock_level as i32;
    g.set_elevation(16, 16, rock, &mut e);
    settle(&mut e, &mut g);
    assert_eq!(local(&g, 16, 16), level);
    assert_eq!(local(&g, 16, 17), level - 1);

    g.set_elevation(16, 16, 0, &mut e);
    settle(&mut e, &mut g);
    assert_eq!(g.tile_at(16, 16).unwrap().emission, 0);
    assert!(snapshot(&g, LightChannel::Local).iter().all(|&(_, _, l)| l == 0));
}

#[test]
fn removing_a_non_source_queues_nothing() {
    let mut g = flat_world();
    let mut e = LightEngine::new(LightParams::default());
    e.remove_source(&mut g, 3, 3);
    assert!(e.pending().is_empty());
    assert!(e.dirty_chunks().is_empty());
}

#[test]
fn config_defaults_and_overrides() {
    let cfg = load_config_from_str("step_cost = 2\nnight_level = 99\n").unwrap();
    let p = LightParams::from_config(&cfg);
    assert_eq!(p.step_cost, 2);
    assert_eq!(p.night_level, 15);
    assert_eq!(p.propagate_budget, 512);
    p.validate();
}

#[test]
#[should_panic]
fn zero_step_cost_is_rejected() {
    LightParams {
        step_cost: 0,
        ..LightParams::default()
    }
    .validate();
}

#[test]
fn attenuation_rules() {
    let p = LightParams::default();
    use loam_world::Opacity::*;
    let amb = LightChannel::Ambient;
    let loc = LightChannel::Local;
    assert_eq!(amb.attenuation(&p, Direction::Up, Transparent), None);
    assert_eq!(amb.attenuation(&p, Direction::Down, Transparent), Some(0));
    assert_eq!(amb.attenuation(&p, Direction::Down, Translucent), Some(2));
    assert_eq!(amb.attenuation(&p, Direction::Down, Opaque), None);
    assert_eq!(amb.attenuation(&p, Direction::Left, Translucent), Some(3));
    assert_eq!(loc.attenuation(&p, Direction::Up, Transparent), Some(1));
    assert_eq!(loc.attenuation(&p, Direction::Right, Opaque), Some(16));
}

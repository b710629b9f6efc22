use std::collections::BTreeMap;

use loam_lighting::{LightChannel, LightEngine, LightParams};
use loam_world::{LightHooks, MAX_LIGHT, NoLighting, WorldGenParams, WorldGrid};
use proptest::prelude::*;

fn flat_world() -> WorldGrid {
    let mut g = WorldGrid::with_seed(3, WorldGenParams::flat(30));
    g.activate_around(0, 0, 1);
    g
}

fn small_budgets() -> LightParams {
    LightParams {
        propagate_budget: 64,
        remove_budget: 16,
        ..LightParams::default()
    }
}

fn snapshot(g: &WorldGrid, channel: LightChannel) -> Vec<u8> {
    let mut out = Vec::new();
    for c in g.store().resident_coords() {
        let chunk = g.store().get_if_resident(c).unwrap();
        out.extend(chunk.iter_global().map(|(_, _, t)| channel.level(t)));
    }
    out
}

fn settle(e: &mut LightEngine, g: &mut WorldGrid) {
    e.run_until_settled(g, 1_000_000);
    assert!(e.is_settled());
}

// (row, col, is_rock)
fn obstacles() -> impl Strategy<Value = Vec<(i32, i32, bool)>> {
    prop::collection::vec((-8i32..24, -8i32..24, any::<bool>()), 0..24)
}

fn sources() -> impl Strategy<Value = Vec<(i32, i32, u8)>> {
    prop::collection::vec((-8i32..24, -8i32..24, 1u8..=MAX_LIGHT), 1..6)
}

fn apply_obstacles(g: &mut WorldGrid, obs: &[(i32, i32, bool)], hooks: &mut dyn LightHooks) {
    let rock = g.params().rock_level as i32;
    for &(r, c, is_rock) in obs {
        g.set_elevation(r, c, if is_rock { rock } else { 0 }, hooks);
    }
}

fn unique(srcs: &[(i32, i32, u8)]) -> Vec<(i32, i32, u8)> {
    let mut by_tile = BTreeMap::new();
    for &(r, c, l) in srcs {
        by_tile.insert((r, c), l);
    }
    by_tile.into_iter().map(|((r, c), l)| (r, c, l)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // Adding light only ever raises levels, stays in range, and every source
    // ends at least as bright as its own emission.
    #[test]
    fn adding_sources_is_monotonic_and_bounded(obs in obstacles(), srcs in sources()) {
        let mut g = flat_world();
        apply_obstacles(&mut g, &obs, &mut NoLighting);
        let mut e = LightEngine::new(small_budgets());
        for (r, c, l) in unique(&srcs) {
            e.add_source(&mut g, r, c, l);
        }
        let mut before = snapshot(&g, LightChannel::Local);
        while !e.is_settled() {
            e.step(&mut g);
            let after = snapshot(&g, LightChannel::Local);
            prop_assert!(before.iter().zip(&after).all(|(b, a)| a >= b));
            before = after;
        }
        for c in g.store().resident_coords() {
            for (_, _, t) in g.store().get_if_resident(c).unwrap().iter_global() {
                prop_assert!(t.local <= MAX_LIGHT);
                prop_assert!(t.local >= t.emission);
            }
        }
    }

    // Removing any subset of sources leaves exactly the light a fresh pass
    // over the survivors would produce.
    #[test]
    fn removal_matches_fresh_lighting(
        obs in obstacles(),
        srcs in sources(),
        keep in prop::collection::vec(any::<bool>(), 6),
    ) {
        let srcs = unique(&srcs);
        let mut g = flat_world();
        apply_obstacles(&mut g, &obs, &mut NoLighting);
        let mut e = LightEngine::new(small_budgets());
        for &(r, c, l) in &srcs {
            e.add_source(&mut g, r, c, l);
        }
        settle(&mut e, &mut g);
        let mut survivors = Vec::new();
        for (i, &(r, c, l)) in srcs.iter().enumerate() {
            if keep[i] {
                survivors.push((r, c, l));
            } else {
                e.remove_source(&mut g, r, c);
            }
        }
        settle(&mut e, &mut g);

        let mut fresh = flat_world();
        apply_obstacles(&mut fresh, &obs, &mut NoLighting);
        let mut fe = LightEngine::new(LightParams::default());
        for (r, c, l) in survivors {
            fe.add_source(&mut fresh, r, c, l);
        }
        settle(&mut fe, &mut fresh);
        prop_assert_eq!(snapshot(&g, LightChannel::Local), snapshot(&fresh, LightChannel::Local));
    }

    // Terrain edits on a lit world converge to what a full recalculation of
    // the edited world gives, in both channels.
    #[test]
    fn edits_match_fresh_lighting(obs in obstacles(), srcs in sources()) {
        let srcs = unique(&srcs);
        let mut g = flat_world();
        let mut e = LightEngine::new(small_budgets());
        e.recalculate_ambient_for_world(&mut g, MAX_LIGHT);
        for &(r, c, l) in &srcs {
            e.add_source(&mut g, r, c, l);
        }
        settle(&mut e, &mut g);
        apply_obstacles(&mut g, &obs, &mut e);
        settle(&mut e, &mut g);

        let mut fresh = flat_world();
        apply_obstacles(&mut fresh, &obs, &mut NoLighting);
        let mut fe = LightEngine::new(LightParams::default());
        fe.recalculate_ambient_for_world(&mut fresh, MAX_LIGHT);
        for &(r, c, _) in &srcs {
            // Sources drowned by an edit stay gone even if the tile dries out.
            let emission = g.tile_at(r, c).unwrap().emission;
            fe.add_source(&mut fresh, r, c, emission);
        }
        settle(&mut fe, &mut fresh);
        prop_assert_eq!(snapshot(&g, LightChannel::Ambient), snapshot(&fresh, LightChannel::Ambient));
        prop_assert_eq!(snapshot(&g, LightChannel::Local), snapshot(&fresh, LightChannel::Local));
    }
}

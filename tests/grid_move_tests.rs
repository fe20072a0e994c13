//! Grid movement tests - compaction in all four directions and chain clearing

use std::collections::HashMap;

use proptest::prelude::*;

use tile_grid::core::{Grid, LevelData, ScriptedSource};
use tile_grid::types::{CellId, Color, Direction, Origin};

fn load(text: &str) -> Grid {
    let level = LevelData::parse(text).unwrap();
    Grid::from_level(&level, Box::new(ScriptedSource::default())).unwrap()
}

fn dump(grid: &Grid) -> String {
    grid.to_string()
}

fn arb_color() -> impl Strategy<Value = Color> {
    prop_oneof![
        3 => Just(Color::None),
        1 => Just(Color::Red),
        1 => Just(Color::Blue),
        1 => Just(Color::Green),
        1 => Just(Color::Yellow),
    ]
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

fn arb_board() -> impl Strategy<Value = (u16, u16, Vec<Color>)> {
    (2u16..=6, 2u16..=6).prop_flat_map(|(w, h)| {
        (
            Just(w),
            Just(h),
            prop::collection::vec(arb_color(), (w * h) as usize),
        )
    })
}

fn board_from(width: u16, height: u16, colors: &[Color]) -> Grid {
    let mut grid = Grid::new(width, height, Box::new(ScriptedSource::default())).unwrap();
    for (i, &color) in colors.iter().enumerate() {
        grid.spawn_at(CellId::from_index(i), color).unwrap();
    }
    grid
}

fn color_counts(grid: &Grid) -> HashMap<Color, usize> {
    let mut counts = HashMap::new();
    for cell in grid.cells() {
        if cell.color().is_solid() {
            *counts.entry(cell.color()).or_insert(0) += 1;
        }
    }
    counts
}

#[test]
fn test_compaction_each_direction() {
    let text = "3,3,9,1,1,-1,0\nx,r,x,b,x,x,x,x,g";

    let mut g = load(text);
    assert!(g.shift(Direction::Left));
    assert_eq!(dump(&g), "rxx\nbxx\ngxx\n");

    let mut g = load(text);
    assert!(g.shift(Direction::Right));
    assert_eq!(dump(&g), "xxr\nxxb\nxxg\n");

    let mut g = load(text);
    assert!(g.shift(Direction::Up));
    assert_eq!(dump(&g), "brg\nxxx\nxxx\n");

    let mut g = load(text);
    assert!(g.shift(Direction::Down));
    assert_eq!(dump(&g), "xxx\nxxx\nbrg\n");
}

#[test]
fn test_compacted_board_reports_no_change() {
    let mut g = load("3,2,9,1,1,-1,0\nr,b,x,g,x,x");
    assert!(!g.shift(Direction::Left));
    assert!(g.shift(Direction::Right));
    assert!(!g.shift(Direction::Right));
}

#[test]
fn test_origin_records_source_cell() {
    let mut g = load("3,1,9,1,1,-1,0\nx,x,y");
    g.shift(Direction::Left);
    let cell = g.cell(CellId::new(1)).unwrap();
    assert_eq!(cell.color(), Color::Yellow);
    assert_eq!(cell.origin(), Origin::Moved(CellId::new(3)));
    assert!(g.cell(CellId::new(3)).unwrap().is_empty());
}

#[test]
fn test_scenario_fourth_red_joins_and_clears() {
    // r r r
    // . . .
    // . r .
    let mut g = load("3,3,5,3,1,-1,5\nr,r,r,x,x,x,x,r,x");
    assert_eq!(g.spawned_count(), 4);

    assert!(g.shift(Direction::Up));
    assert_eq!(g.recompute_groups(), 1);
    let group = g.groups().iter().next().unwrap();
    assert_eq!(group.len(), 4);
    assert_eq!(group.color(), Color::Red);

    // Settle pass: the four reds clear.
    assert!(g.shift(Direction::Up));
    assert_eq!(g.spawned_count(), 0);
    assert_eq!(g.recompute_groups(), 0);
    assert_eq!(dump(&g), "***\nx*x\nxxx\n");
}

#[test]
fn test_removed_markers_are_landing_slots() {
    // The blue slides into the slot the cleared reds leave behind.
    let mut g = load("4,1,5,3,1,-1,0\nr,r,r,b");
    g.recompute_groups();
    g.shift(Direction::Left);
    assert_eq!(dump(&g), "b**x\n");
    assert_eq!(
        g.cell(CellId::new(1)).unwrap().origin(),
        Origin::Moved(CellId::new(4))
    );
}

proptest! {
    #[test]
    fn prop_shift_preserves_colors_except_cleared_chains(
        (w, h, colors) in arb_board(),
        direction in arb_direction(),
    ) {
        let mut grid = board_from(w, h, &colors);
        grid.recompute_groups();

        let mut expected = color_counts(&grid);
        let mut cleared = 0usize;
        for group in grid.groups().iter().filter(|g| g.is_chain()) {
            *expected.get_mut(&group.color()).unwrap() -= group.len();
            cleared += group.len();
        }
        expected.retain(|_, n| *n > 0);

        let before = grid.spawned_count();
        grid.shift(direction);

        prop_assert_eq!(color_counts(&grid), expected);
        prop_assert_eq!(grid.spawned_count(), before - cleared);
        let markers = grid.cells().iter().filter(|c| c.color().is_removed()).count();
        prop_assert!(markers <= cleared);
    }

    #[test]
    fn prop_shift_is_idempotent_without_chains(
        (w, h, colors) in arb_board(),
        direction in arb_direction(),
    ) {
        let mut grid = board_from(w, h, &colors);
        grid.shift(direction);
        let once = grid.to_string();
        prop_assert!(!grid.shift(direction));
        prop_assert_eq!(grid.to_string(), once);
    }
}

//! Grid module - the board and every rule that mutates it
//!
//! The grid owns all cells and the per-tick group arena. Cells are stored in
//! a flat row-major array; the cell with id `n` lives at index `n - 1`.
//!
//! # Tick Model
//!
//! A host drives the grid one mutating operation at a time:
//!
//! - [`Grid::shift`] compacts every row or column toward one edge and clears
//!   chains found by the previous [`Grid::recompute_groups`]
//! - [`Grid::swap`] exchanges the colors of two tiles
//! - [`Grid::spawn_random`] drops a random tile into an empty slot
//! - [`Grid::restore_default`] rewinds to the state right after load
//!
//! Groups are not computed at load; the first recomputation happens after
//! the first shift or swap.
//!
//! # Removal Marker
//!
//! A cleared chain leaves `Color::Removed` in its cells for the rest of the
//! tick so a renderer can animate it. The marker counts as vacant for moving
//! tiles and is turned back into an empty cell when the next shift or swap
//! begins.

use std::fmt;

use tracing::{debug, info};

use crate::cell::Cell;
use crate::error::{Budget, GridError, LevelError};
use crate::group::GroupSet;
use crate::level::{LayoutToken, LevelData};
use crate::reward::classify;
use crate::rng::TileSource;
use crate::types::{
    CellId, Color, Direction, Origin, RewardTier, MAX_UNDO_CREDITS, MIN_CHAIN_SIZE,
};

/// State captured right after load; restore copies it back.
#[derive(Debug, Clone)]
struct Defaults {
    cells: Vec<Cell>,
    spawned: usize,
    moves_left: u32,
    swaps_left: u32,
    time_left: f32,
}

/// The tile grid
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    groups: GroupSet,
    pending_groups: usize,
    spawned: usize,
    moves_left: u32,
    swaps_left: u32,
    undo_credits: u8,
    time_left: f32,
    min_gold: u32,
    min_silver: u32,
    excluded_colors: u8,
    level_id: u32,
    source: Box<dyn TileSource>,
    defaults: Defaults,
}

impl Grid {
    /// Empty `width x height` grid with no budgets (classic mode board)
    pub fn new(width: u16, height: u16, source: Box<dyn TileSource>) -> Result<Self, LevelError> {
        Self::from_level(&LevelData::blank(width, height), source)
    }

    /// Build a grid from a parsed level
    pub fn from_level(level: &LevelData, source: Box<dyn TileSource>) -> Result<Self, LevelError> {
        let mut grid = Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
            groups: GroupSet::new(),
            pending_groups: 0,
            spawned: 0,
            moves_left: 0,
            swaps_left: 0,
            undo_credits: 0,
            time_left: -1.0,
            min_gold: 0,
            min_silver: 0,
            excluded_colors: 0,
            level_id: 0,
            source,
            defaults: Defaults {
                cells: Vec::new(),
                spawned: 0,
                moves_left: 0,
                swaps_left: 0,
                time_left: -1.0,
            },
        };
        grid.load_level(level)?;
        Ok(grid)
    }

    /// Replace the whole grid with a new level.
    ///
    /// `?` tokens draw their color from the grid's random source now; the
    /// result is what [`Grid::restore_default`] later returns to. The level
    /// is validated first, so on error the grid is untouched.
    pub fn load_level(&mut self, level: &LevelData) -> Result<(), LevelError> {
        if level.width == 0 || level.height == 0 {
            return Err(LevelError::ZeroDimension {
                width: level.width,
                height: level.height,
            });
        }
        if level.layout.len() != level.cell_count() {
            return Err(LevelError::TokenCount {
                expected: level.cell_count(),
                found: level.layout.len(),
            });
        }

        self.width = level.width;
        self.height = level.height;
        self.excluded_colors = level.excluded_colors.min(Color::PALETTE.len() as u8 - 1);
        self.cells = (0..level.cell_count())
            .map(|i| Cell::new(CellId::from_index(i)))
            .collect();
        self.groups.clear();
        self.pending_groups = 0;
        self.spawned = 0;

        for (index, token) in level.layout.iter().enumerate() {
            match token {
                LayoutToken::Empty => {}
                LayoutToken::Fixed(color) => self.place(index, *color),
                LayoutToken::Random => {
                    let color = self.random_color();
                    self.place(index, color);
                }
            }
        }

        debug_assert_eq!(self.spawned, level.tile_count());

        self.moves_left = level.moves_left;
        self.swaps_left = level.swaps_left;
        self.time_left = level.max_time;
        self.min_gold = level.min_gold;
        self.min_silver = level.min_silver;
        self.level_id = level.id;
        self.undo_credits = MAX_UNDO_CREDITS;

        self.defaults = Defaults {
            cells: self.cells.iter().map(Cell::detached).collect(),
            spawned: self.spawned,
            moves_left: self.moves_left,
            swaps_left: self.swaps_left,
            time_left: self.time_left,
        };

        info!(
            level = self.level_id,
            width = self.width,
            height = self.height,
            tiles = self.spawned,
            "level loaded"
        );
        Ok(())
    }

    /// Rewind cells and budgets to the state right after load.
    ///
    /// Undo credits are kept. Calling this repeatedly is harmless.
    pub fn restore_default(&mut self) {
        self.cells.clone_from(&self.defaults.cells);
        self.spawned = self.defaults.spawned;
        self.moves_left = self.defaults.moves_left;
        self.swaps_left = self.defaults.swaps_left;
        self.time_left = self.defaults.time_left;
        self.groups.clear();
        self.pending_groups = 0;
        info!(level = self.level_id, "level restored");
    }

    // ---- queries ----

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// All cells in id order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.index())
    }

    /// Cell at zero-based column/row
    pub fn cell_at(&self, col: u16, row: u16) -> Option<&Cell> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells
            .get(row as usize * self.width as usize + col as usize)
    }

    /// Groups from the latest recomputation
    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    /// Number of tiles on the board
    pub fn spawned_count(&self) -> usize {
        self.spawned
    }

    pub fn is_full(&self) -> bool {
        self.spawned >= self.cells.len()
    }

    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    pub fn swaps_left(&self) -> u32 {
        self.swaps_left
    }

    pub fn undo_credits(&self) -> u8 {
        self.undo_credits
    }

    /// Remaining seconds; negative means unlimited
    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    /// Groups of at least three found by the latest recomputation
    pub fn pending_group_count(&self) -> usize {
        self.pending_groups
    }

    pub fn min_gold(&self) -> u32 {
        self.min_gold
    }

    pub fn min_silver(&self) -> u32 {
        self.min_silver
    }

    pub fn reward_tier(&self) -> RewardTier {
        classify(self.moves_left, self.min_gold, self.min_silver)
    }

    pub fn level_id(&self) -> u32 {
        self.level_id
    }

    pub fn excluded_colors(&self) -> u8 {
        self.excluded_colors
    }

    /// Colors random tiles are drawn from
    pub fn spawn_palette(&self) -> &'static [Color] {
        &Color::PALETTE[..Color::PALETTE.len() - self.excluded_colors as usize]
    }

    /// Change how many palette colors random tiles skip (max 3)
    pub fn set_excluded_colors(&mut self, excluded: u8) {
        self.excluded_colors = excluded.min(Color::PALETTE.len() as u8 - 1);
    }

    // ---- movement ----

    /// Compact every row or column toward the edge named by `direction`.
    ///
    /// Tiles that belong to a chain from the latest recomputation are
    /// cleared instead of moved. Returns true if any cell changed.
    pub fn shift(&mut self, direction: Direction) -> bool {
        self.begin_tick();
        let changed = self.compact(direction);
        debug!(direction = direction.as_str(), changed, "shift");
        changed
    }

    /// One compaction pass without starting a new tick.
    ///
    /// Origins of tiles that already moved this tick keep pointing at the
    /// cell the tile started from.
    pub(crate) fn compact(&mut self, direction: Direction) -> bool {
        let n = self.cells.len();
        let ascending = matches!(direction, Direction::Left | Direction::Up);
        let mut changed = false;

        for step in 0..n {
            let index = if ascending { step } else { n - 1 - step };
            let cell = self.cells[index];
            if !cell.color().is_solid() {
                continue;
            }

            if self.groups.size_of(cell.group()) >= MIN_CHAIN_SIZE {
                self.cells[index].mark_removed();
                self.spawned = self.spawned.saturating_sub(1);
                changed = true;
                continue;
            }

            if let Some(dest) = self.landing_slot(index, direction) {
                let origin = Origin::Moved(cell.origin().source().unwrap_or(cell.id()));
                self.cells[dest].fill(cell.color(), origin);
                self.cells[index].clear();
                changed = true;
            }
        }

        changed
    }

    /// First vacant slot scanning from the edge toward `index`.
    fn landing_slot(&self, index: usize, direction: Direction) -> Option<usize> {
        let w = self.width as usize;
        let h = self.height as usize;
        let row = index / w;
        let col = index % w;

        let (start, step, count) = match direction {
            Direction::Left => (row * w, 1isize, col),
            Direction::Right => (row * w + w - 1, -1, w - 1 - col),
            Direction::Up => (col, w as isize, row),
            Direction::Down => ((h - 1) * w + col, -(w as isize), h - 1 - row),
        };

        (0..count)
            .map(|k| (start as isize + step * k as isize) as usize)
            .find(|&slot| self.cells[slot].is_vacant())
    }

    /// Finalize last tick's removals and forget last tick's provenance.
    fn begin_tick(&mut self) {
        for cell in &mut self.cells {
            if cell.is_pending_removal() || cell.color().is_removed() {
                cell.clear();
            } else {
                cell.set_origin(Origin::Settled);
            }
        }
    }

    /// Rebuild every group from the current colors.
    pub fn recompute_groups(&mut self) -> usize {
        let (w, h) = (self.width as usize, self.height as usize);
        self.groups.rebuild(&mut self.cells, w, h);
        self.pending_groups = self.groups.chain_count();
        debug!(
            groups = self.groups.len(),
            pending = self.pending_groups,
            "groups recomputed"
        );
        self.pending_groups
    }

    // ---- swap ----

    /// Exchange the colors of two tiles anywhere on the board.
    ///
    /// Costs one swap; the caller also charges a move.
    pub fn swap(&mut self, a: CellId, b: CellId) -> Result<(), GridError> {
        let (ia, ib) = self.swap_targets(a, b)?;
        if self.swaps_left == 0 {
            return Err(GridError::BudgetExhausted(Budget::Swaps));
        }
        self.exchange(ia, ib);
        self.swaps_left -= 1;

        debug!(a = a.get(), b = b.get(), swaps_left = self.swaps_left, "swap");
        Ok(())
    }

    /// Swap without touching the swap budget (classic mode).
    pub(crate) fn swap_unmetered(&mut self, a: CellId, b: CellId) -> Result<(), GridError> {
        let (ia, ib) = self.swap_targets(a, b)?;
        self.exchange(ia, ib);
        debug!(a = a.get(), b = b.get(), "swap");
        Ok(())
    }

    fn swap_targets(&self, a: CellId, b: CellId) -> Result<(usize, usize), GridError> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        if ia == ib {
            return Err(GridError::SameCell(a.get()));
        }
        for (index, id) in [(ia, a), (ib, b)] {
            if !self.cells[index].color().is_solid() {
                return Err(GridError::EmptyCell(id.get()));
            }
        }
        Ok((ia, ib))
    }

    fn exchange(&mut self, ia: usize, ib: usize) {
        self.begin_tick();
        let (a, b) = (self.cells[ia].id(), self.cells[ib].id());
        let color_a = self.cells[ia].color();
        let color_b = self.cells[ib].color();
        self.cells[ia].fill(color_b, Origin::Moved(b));
        self.cells[ib].fill(color_a, Origin::Moved(a));
    }

    // ---- spawning ----

    /// Drop a random palette color into a random empty cell.
    ///
    /// Returns `None` when no cell is empty.
    pub fn spawn_random(&mut self) -> Option<CellId> {
        if self.is_full() {
            return None;
        }
        let empties: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_empty())
            .map(|(i, _)| i)
            .collect();
        if empties.is_empty() {
            return None;
        }

        let index = empties[self.source.next_below(empties.len())];
        let color = self.random_color();
        self.place(index, color);

        let id = CellId::from_index(index);
        debug!(cell = id.get(), color = color.as_str(), "spawn");
        Some(id)
    }

    /// Put `color` at `id`, replacing whatever was there.
    ///
    /// A vacant color (`None`/`Removed`) empties the cell. If groups have
    /// been computed they are rebuilt, so no stale chain survives the edit.
    pub fn spawn_at(&mut self, id: CellId, color: Color) -> Result<(), GridError> {
        let index = self.index_of(id)?;
        if self.cells[index].color().is_solid() {
            self.spawned = self.spawned.saturating_sub(1);
        }
        if color.is_solid() {
            self.place(index, color);
        } else {
            self.cells[index].clear();
        }
        if !self.groups.is_empty() {
            self.recompute_groups();
        }
        Ok(())
    }

    fn place(&mut self, index: usize, color: Color) {
        self.cells[index].fill(color, Origin::Spawned);
        self.spawned += 1;
    }

    fn random_color(&mut self) -> Color {
        let palette = self.spawn_palette();
        palette[self.source.next_below(palette.len())]
    }

    // ---- counters ----

    /// Charge one move; stays at 0 once exhausted.
    pub fn update_move_count(&mut self) {
        self.moves_left = self.moves_left.saturating_sub(1);
    }

    /// Spend one undo credit. Only the counter changes.
    pub fn consume_undo(&mut self) -> Result<u8, GridError> {
        if self.undo_credits == 0 {
            return Err(GridError::BudgetExhausted(Budget::Undos));
        }
        self.undo_credits -= 1;
        Ok(self.undo_credits)
    }

    /// Grant one undo credit. Returns false at the cap.
    pub fn add_undo_credit(&mut self) -> bool {
        if self.undo_credits >= MAX_UNDO_CREDITS {
            return false;
        }
        self.undo_credits += 1;
        true
    }

    /// Count a limited time budget down by `delta` seconds, clamping at 0.
    ///
    /// An unlimited budget (negative) is left alone.
    pub fn tick_time(&mut self, delta: f32) -> f32 {
        if self.time_left >= 0.0 && delta > 0.0 {
            self.time_left = (self.time_left - delta).max(0.0);
        }
        self.time_left
    }

    /// Acknowledge that every movement and spawn has been drawn.
    pub fn mark_rendered(&mut self) {
        for cell in &mut self.cells {
            cell.set_origin(Origin::Settled);
        }
    }

    fn index_of(&self, id: CellId) -> Result<usize, GridError> {
        let index = id.index();
        if index < self.cells.len() {
            Ok(index)
        } else {
            Err(GridError::out_of_range(id, self.cells.len()))
        }
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("spawned", &self.spawned)
            .field("moves_left", &self.moves_left)
            .field("swaps_left", &self.swaps_left)
            .field("undo_credits", &self.undo_credits)
            .field("pending_groups", &self.pending_groups)
            .finish_non_exhaustive()
    }
}

/// One row per line, one character per cell (`x` empty, `*` removed).
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width.max(1) as usize) {
            let line: String = row.iter().map(|c| c.color().as_char()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedSource;

    fn grid(text: &str) -> Grid {
        let level = LevelData::parse(text).unwrap();
        Grid::from_level(&level, Box::new(ScriptedSource::default())).unwrap()
    }

    fn row(grid: &Grid) -> String {
        grid.to_string().replace('\n', "")
    }

    #[test]
    fn test_load_counts_tiles() {
        let g = grid("3,1,5,3,1,-1,2\nr,x,b");
        assert_eq!(g.spawned_count(), 2);
        assert_eq!(g.undo_credits(), MAX_UNDO_CREDITS);
        assert_eq!(g.pending_group_count(), 0);
        assert_eq!(g.cell(CellId::new(1)).unwrap().origin(), Origin::Spawned);
    }

    #[test]
    fn test_shift_left_compacts_row() {
        let mut g = grid("4,1,5,3,1,-1,2\nx,b,x,r");
        assert!(g.shift(Direction::Left));
        assert_eq!(row(&g), "brxx");
        assert_eq!(
            g.cell(CellId::new(2)).unwrap().origin(),
            Origin::Moved(CellId::new(4))
        );
        assert!(!g.shift(Direction::Left));
    }

    #[test]
    fn test_shift_right_and_down() {
        let mut g = grid("4,1,5,3,1,-1,2\nb,x,r,x");
        assert!(g.shift(Direction::Right));
        assert_eq!(row(&g), "xxbr");

        let mut g = grid("1,3,5,3,1,-1,2\ng,x,x");
        assert!(g.shift(Direction::Down));
        assert_eq!(row(&g), "xxg");
    }

    #[test]
    fn test_shift_never_crosses_rows() {
        let mut g = grid("2,2,5,3,1,-1,2\nx,r,b,x");
        assert!(g.shift(Direction::Left));
        assert_eq!(g.to_string(), "rx\nbx\n");
    }

    #[test]
    fn test_chain_cleared_on_shift() {
        let mut g = grid("4,1,5,3,1,-1,2\nr,r,r,b");
        assert_eq!(g.recompute_groups(), 1);
        assert!(g.shift(Direction::Left));
        assert_eq!(row(&g), "b**x");
        assert_eq!(g.spawned_count(), 1);

        // Next tick turns the markers into empty cells.
        assert!(!g.shift(Direction::Left));
        assert_eq!(row(&g), "bxxx");
    }

    #[test]
    fn test_swap_exchanges_colors() {
        let mut g = grid("3,1,5,3,1,-1,2\nr,x,b");
        g.swap(CellId::new(1), CellId::new(3)).unwrap();
        assert_eq!(row(&g), "bxr");
        assert_eq!(g.swaps_left(), 1);
        assert_eq!(
            g.cell(CellId::new(3)).unwrap().origin(),
            Origin::Moved(CellId::new(1))
        );
    }

    #[test]
    fn test_swap_rejections_leave_grid_untouched() {
        let mut g = grid("3,1,5,3,1,-1,0\nr,x,b");
        assert_eq!(
            g.swap(CellId::new(1), CellId::new(2)),
            Err(GridError::EmptyCell(2))
        );
        assert_eq!(
            g.swap(CellId::new(1), CellId::new(1)),
            Err(GridError::SameCell(1))
        );
        assert_eq!(
            g.swap(CellId::new(1), CellId::new(4)),
            Err(GridError::OutOfRangeCellId { id: 4, max: 3 })
        );
        assert_eq!(
            g.swap(CellId::new(1), CellId::new(3)),
            Err(GridError::BudgetExhausted(Budget::Swaps))
        );
        assert_eq!(row(&g), "rxb");
    }

    #[test]
    fn test_spawn_random_uses_scripted_picks() {
        let level = LevelData::parse("3,1,5,3,1,-1,2\nr,x,x").unwrap();
        let mut g = Grid::from_level(&level, Box::new(ScriptedSource::new([1, 2]))).unwrap();
        // Empty cells are [2, 3]; pick 1 -> cell 3. Palette pick 2 -> Green.
        assert_eq!(g.spawn_random(), Some(CellId::new(3)));
        assert_eq!(row(&g), "rxg");
        assert_eq!(g.spawned_count(), 2);
    }

    #[test]
    fn test_spawn_random_on_full_grid() {
        let mut g = grid("2,1,5,3,1,-1,2\nr,b");
        assert!(g.is_full());
        assert_eq!(g.spawn_random(), None);
    }

    #[test]
    fn test_spawn_at_keeps_count_consistent() {
        let mut g = grid("2,1,5,3,1,-1,2\nr,x");
        g.spawn_at(CellId::new(1), Color::Blue).unwrap();
        assert_eq!(g.spawned_count(), 1);
        g.spawn_at(CellId::new(2), Color::Yellow).unwrap();
        assert_eq!(g.spawned_count(), 2);
        g.spawn_at(CellId::new(1), Color::None).unwrap();
        assert_eq!(g.spawned_count(), 1);
        assert!(g.spawn_at(CellId::new(3), Color::Red).is_err());
    }

    #[test]
    fn test_spawn_at_breaking_a_chain_refreshes_groups() {
        let mut g = grid("4,1,5,3,1,-1,2\nr,r,r,b");
        assert_eq!(g.recompute_groups(), 1);

        g.spawn_at(CellId::new(2), Color::Blue).unwrap();
        assert_eq!(g.pending_group_count(), 0);
        assert!(g.cell(CellId::new(1)).unwrap().group().is_none());

        assert!(!g.shift(Direction::Left));
        assert_eq!(row(&g), "rbrb");
        assert_eq!(g.spawned_count(), 4);
    }

    #[test]
    fn test_undo_credits_cap_and_floor() {
        let mut g = grid("1,1,5,3,1,-1,2\nr");
        assert!(!g.add_undo_credit());
        for expected in (0..MAX_UNDO_CREDITS).rev() {
            assert_eq!(g.consume_undo(), Ok(expected));
        }
        assert_eq!(
            g.consume_undo(),
            Err(GridError::BudgetExhausted(Budget::Undos))
        );
        assert!(g.add_undo_credit());
        assert_eq!(g.undo_credits(), 1);
    }

    #[test]
    fn test_move_count_saturates() {
        let mut g = grid("1,1,1,3,1,-1,2\nr");
        g.update_move_count();
        g.update_move_count();
        assert_eq!(g.moves_left(), 0);
    }

    #[test]
    fn test_tick_time_clamps_and_ignores_unlimited() {
        let mut g = grid("1,1,1,3,1,1.5,2\nr");
        assert_eq!(g.tick_time(1.0), 0.5);
        assert_eq!(g.tick_time(1.0), 0.0);

        let mut g = grid("1,1,1,3,1,-1,2\nr");
        assert_eq!(g.tick_time(1.0), -1.0);
    }

    #[test]
    fn test_mark_rendered_settles_origins() {
        let mut g = grid("2,1,5,3,1,-1,2\nx,r");
        g.shift(Direction::Left);
        g.mark_rendered();
        assert!(g.cells().iter().all(|c| c.origin() == Origin::Settled));
    }
}

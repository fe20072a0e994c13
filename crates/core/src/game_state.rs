//! Game state module - lifecycle state machine and the command surface
//!
//! [`Game`] wraps a [`Grid`] with a [`PlayState`], a [`GameMode`] and a
//! notification sink. It is the single writer a host loop talks to.
//!
//! # Tick Processing
//!
//! A move runs one charged compaction pass, then keeps settling in the same
//! direction (uncharged) until no chain of three or more is pending. Only
//! then does classic mode spawn a tile and challenge mode evaluate the
//! transition rule:
//!
//! - tiles remain, no moves left, nothing pending: `GameOver`
//! - no tiles remain: `Complete`
//!
//! `Paused` is entered and left only through [`Game::set_state`]. Nothing
//! ticks while paused, game over or complete. `Timeout` is reserved and
//! never entered.

use tracing::{debug, info, warn};

use crate::error::{Budget, GridError, LevelError};
use crate::grid::Grid;
use crate::level::LevelData;
use crate::notify::{
    Notifier, NullNotifier, MSG_COMPLETE, MSG_GAME_OVER, MSG_NO_SWAPS, MSG_NO_UNDOS,
    MSG_RESTARTED,
};
use crate::rng::TileSource;
use crate::snapshot::GridSnapshot;
use crate::types::{CellId, Direction, GameMode, Notice, PlayState, RewardTier};

/// A playable level: grid, lifecycle state and notifications
pub struct Game {
    grid: Grid,
    state: PlayState,
    mode: GameMode,
    notifier: Box<dyn Notifier>,
}

impl Game {
    /// Challenge game from a level
    pub fn challenge(level: &LevelData, source: Box<dyn TileSource>) -> Result<Self, LevelError> {
        Ok(Self::with_grid(
            Grid::from_level(level, source)?,
            GameMode::Challenge,
        ))
    }

    /// Classic game on an empty board; the first tile is spawned right away
    pub fn classic(width: u16, height: u16, source: Box<dyn TileSource>) -> Result<Self, LevelError> {
        let mut game = Self::with_grid(Grid::new(width, height, source)?, GameMode::Classic);
        game.grid.spawn_random();
        Ok(game)
    }

    /// Wrap an existing grid
    pub fn with_grid(grid: Grid, mode: GameMode) -> Self {
        Self {
            grid,
            state: PlayState::Playing,
            mode,
            notifier: Box::new(NullNotifier),
        }
    }

    /// Replace the notification sink
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    // ---- queries ----

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn width(&self) -> u16 {
        self.grid.width()
    }

    pub fn height(&self) -> u16 {
        self.grid.height()
    }

    pub fn moves_left(&self) -> u32 {
        self.grid.moves_left()
    }

    pub fn swaps_left(&self) -> u32 {
        self.grid.swaps_left()
    }

    pub fn undo_credits(&self) -> u8 {
        self.grid.undo_credits()
    }

    pub fn time_left(&self) -> f32 {
        self.grid.time_left()
    }

    pub fn pending_group_count(&self) -> usize {
        self.grid.pending_group_count()
    }

    pub fn reward_tier(&self) -> RewardTier {
        self.grid.reward_tier()
    }

    pub fn snapshot(&self) -> GridSnapshot {
        self.grid.snapshot(self.state)
    }

    /// See [`Grid::mark_rendered`]
    pub fn mark_rendered(&mut self) {
        self.grid.mark_rendered();
    }

    // ---- commands ----

    /// Swipe the board. Returns whether anything changed (and a move was charged).
    pub fn apply_move(&mut self, direction: Direction) -> Result<bool, GridError> {
        self.ensure_playing(PlayState::Playing)?;

        let changed = self.grid.shift(direction);
        self.grid.recompute_groups();
        if changed {
            self.grid.update_move_count();
        }
        self.settle(direction);
        self.after_tick();

        debug!(
            direction = direction.as_str(),
            changed,
            moves_left = self.grid.moves_left(),
            spawned = self.grid.spawned_count(),
            "move applied"
        );
        Ok(changed)
    }

    /// Swap two tiles. Costs one swap and one move; classic mode has no
    /// swap budget.
    pub fn apply_swap(&mut self, a: CellId, b: CellId) -> Result<(), GridError> {
        self.ensure_playing(PlayState::Playing)?;

        let result = match self.mode {
            GameMode::Classic => self.grid.swap_unmetered(a, b),
            GameMode::Challenge => self.grid.swap(a, b),
        };
        if let Err(err) = result {
            if err == GridError::BudgetExhausted(Budget::Swaps) {
                self.notifier.notify(Notice::short(MSG_NO_SWAPS));
            }
            warn!(a = a.get(), b = b.get(), %err, "swap rejected");
            return Err(err);
        }
        self.grid.recompute_groups();
        self.grid.update_move_count();
        self.after_tick();
        Ok(())
    }

    /// Spend one undo credit
    pub fn consume_undo(&mut self) -> Result<u8, GridError> {
        self.ensure_playing(PlayState::Playing)?;
        self.grid.consume_undo().map_err(|err| {
            self.notifier.notify(Notice::short(MSG_NO_UNDOS));
            warn!(%err, "undo rejected");
            err
        })
    }

    /// Restart the level from any state
    pub fn restore_default(&mut self) {
        self.grid.restore_default();
        if self.mode == GameMode::Classic && self.grid.spawned_count() == 0 {
            self.grid.spawn_random();
        }
        self.transition(PlayState::Playing);
        self.notifier.notify(Notice::short(MSG_RESTARTED));
    }

    /// Count the time budget down while playing. Returns the remaining time.
    pub fn tick_time(&mut self, delta: f32) -> f32 {
        if self.state != PlayState::Playing {
            return self.grid.time_left();
        }
        self.grid.tick_time(delta)
    }

    /// Pause or resume. Any other requested state is rejected.
    pub fn set_state(&mut self, next: PlayState) -> Result<(), GridError> {
        let allowed = matches!(
            (self.state, next),
            (PlayState::Playing, PlayState::Paused) | (PlayState::Paused, PlayState::Playing)
        ) || (self.state == next && !self.state.is_terminal());

        if !allowed {
            warn!(from = ?self.state, to = ?next, "state change rejected");
            return Err(GridError::IllegalStateTransition {
                from: self.state,
                to: next,
            });
        }
        self.transition(next);
        Ok(())
    }

    /// Replace the level, keeping mode and notifier
    pub fn load_level(&mut self, level: &LevelData) -> Result<(), LevelError> {
        self.grid.load_level(level)?;
        self.transition(PlayState::Playing);
        Ok(())
    }

    // ---- internals ----

    fn ensure_playing(&self, requested: PlayState) -> Result<(), GridError> {
        if self.state == PlayState::Playing {
            return Ok(());
        }
        warn!(state = ?self.state, "command rejected outside of play");
        Err(GridError::IllegalStateTransition {
            from: self.state,
            to: requested,
        })
    }

    /// Uncharged passes until no chain is pending.
    ///
    /// Every pass with a pending chain clears at least three tiles, so the
    /// cell count bounds the loop.
    fn settle(&mut self, direction: Direction) {
        let mut passes = 0usize;
        while self.grid.pending_group_count() > 0 && passes < self.grid.cell_count() {
            self.grid.compact(direction);
            self.grid.recompute_groups();
            passes += 1;
        }
        if passes > 0 {
            debug!(passes, "settled");
        }
    }

    fn after_tick(&mut self) {
        if self.grid.pending_group_count() > 0 {
            return;
        }
        match self.mode {
            GameMode::Classic => {
                self.grid.spawn_random();
            }
            GameMode::Challenge => self.evaluate(),
        }
    }

    fn evaluate(&mut self) {
        if self.state != PlayState::Playing {
            return;
        }
        let spawned = self.grid.spawned_count();
        if spawned > 0 && self.grid.moves_left() == 0 {
            self.transition(PlayState::GameOver);
            self.notifier.notify(Notice::long(MSG_GAME_OVER));
        } else if spawned == 0 {
            self.transition(PlayState::Complete);
            self.notifier.notify(Notice::long(MSG_COMPLETE));
        }
    }

    fn transition(&mut self, next: PlayState) {
        if self.state != next {
            info!(from = self.state.as_str(), to = next.as_str(), "state changed");
            self.state = next;
        }
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("grid", &self.grid)
            .field("state", &self.state)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedSource;
    use crate::types::Color;
    use std::sync::{Arc, Mutex};

    fn challenge(text: &str) -> Game {
        let level = LevelData::parse(text).unwrap();
        Game::challenge(&level, Box::new(ScriptedSource::default())).unwrap()
    }

    #[test]
    fn test_noop_move_is_not_charged() {
        let mut game = challenge("2,1,5,3,1,-1,1\nr,b");
        assert_eq!(game.apply_move(Direction::Left), Ok(false));
        assert_eq!(game.moves_left(), 5);
    }

    #[test]
    fn test_chain_settles_within_one_move() {
        // x r r r      r r r x
        // b x x x  ->  b x x x, then the settle pass clears the reds.
        let mut game = challenge("4,2,5,3,1,-1,1\nx,r,r,r,b,x,x,x");
        assert_eq!(game.apply_move(Direction::Left), Ok(true));
        assert_eq!(game.moves_left(), 4);
        assert_eq!(game.pending_group_count(), 0);
        assert_eq!(game.grid().spawned_count(), 1);
        assert_eq!(game.state(), PlayState::Playing);
    }

    #[test]
    fn test_game_over_when_moves_run_out() {
        let mut game = challenge("2,1,1,1,1,-1,0\nx,r");
        assert_eq!(game.apply_move(Direction::Left), Ok(true));
        assert_eq!(game.state(), PlayState::GameOver);
        assert_eq!(
            game.apply_move(Direction::Right),
            Err(GridError::IllegalStateTransition {
                from: PlayState::GameOver,
                to: PlayState::Playing
            })
        );
    }

    #[test]
    fn test_complete_when_board_cleared() {
        let mut game = challenge("3,2,2,1,1,-1,0\nr,r,x,x,x,r");
        // Up: cell 6 moves to cell 3, forming a row of three reds.
        assert_eq!(game.apply_move(Direction::Up), Ok(true));
        assert_eq!(game.grid().spawned_count(), 0);
        assert_eq!(game.state(), PlayState::Complete);
    }

    #[test]
    fn test_pause_blocks_commands_and_time() {
        let mut game = challenge("2,1,5,3,1,10,1\nx,r");
        game.set_state(PlayState::Paused).unwrap();
        assert!(game.apply_move(Direction::Left).is_err());
        assert_eq!(game.tick_time(1.0), 10.0);
        game.set_state(PlayState::Playing).unwrap();
        assert_eq!(game.tick_time(1.0), 9.0);
    }

    #[test]
    fn test_illegal_set_state() {
        let mut game = challenge("2,1,5,3,1,-1,1\nx,r");
        assert!(game.set_state(PlayState::Complete).is_err());
        assert!(game.set_state(PlayState::Timeout).is_err());
        assert_eq!(game.state(), PlayState::Playing);
    }

    #[test]
    fn test_restore_notifies_and_resumes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut game = challenge("2,1,1,1,1,-1,0\nx,r")
            .with_notifier(move |n: Notice| sink.lock().unwrap().push(n));
        game.apply_move(Direction::Left).unwrap();
        assert_eq!(game.state(), PlayState::GameOver);

        game.restore_default();
        assert_eq!(game.state(), PlayState::Playing);
        assert_eq!(game.moves_left(), 1);
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], Notice::long(MSG_GAME_OVER));
        assert_eq!(seen[1], Notice::short(MSG_RESTARTED));
    }

    #[test]
    fn test_classic_spawns_after_each_move() {
        let mut game = Game::classic(4, 4, Box::new(ScriptedSource::new([0, 0, 0, 0]))).unwrap();
        assert_eq!(game.grid().spawned_count(), 1);
        assert_eq!(game.grid().cells()[0].color(), Color::Red);

        // Nothing can move, but classic mode still spawns after the tick.
        assert_eq!(game.apply_move(Direction::Left), Ok(false));
        assert_eq!(game.grid().spawned_count(), 2);
        assert_eq!(game.state(), PlayState::Playing);
    }
}

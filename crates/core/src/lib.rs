//! Core tile grid logic - pure, deterministic, and testable
//!
//! This crate contains every rule of the puzzle: compaction, grouping,
//! swapping, spawning, level loading and the level lifecycle. It has no
//! dependencies on rendering, networking or input handling, which makes it:
//!
//! - **Deterministic**: the same seed and inputs produce the same board
//! - **Testable**: randomness is injected through [`TileSource`]
//! - **Portable**: a terminal runner, a GUI or the JSON adapter can drive it
//!
//! # Module Structure
//!
//! - [`grid`]: the board, compaction, swaps, spawns, budgets, restore
//! - [`group`]: per-tick arena of connected same-colored groups
//! - [`game_state`]: [`Game`], the state machine and command surface
//! - [`level`]: level file parsing
//! - [`rng`]: the random source seam
//! - [`reward`]: gold/silver/bronze classification
//! - [`snapshot`]: serializable read-only views and board hashing
//! - [`notify`]: sink for user-facing notices
//!
//! # Example
//!
//! ```
//! use tile_grid_core::{Game, LevelData, SeededSource};
//! use tile_grid_types::{Direction, PlayState};
//!
//! let level = LevelData::parse("3,3,5,3,1,-1,5\nr,r,r,x,x,x,x,r,x").unwrap();
//! let mut game = Game::challenge(&level, Box::new(SeededSource::new(1))).unwrap();
//!
//! // The lone red slides up next to the row of three; all four clear.
//! assert_eq!(game.apply_move(Direction::Up), Ok(true));
//! assert_eq!(game.grid().spawned_count(), 0);
//! assert_eq!(game.state(), PlayState::Complete);
//! ```

pub mod cell;
pub mod error;
pub mod game_state;
pub mod grid;
pub mod group;
pub mod level;
pub mod notify;
pub mod reward;
pub mod rng;
pub mod snapshot;

pub use tile_grid_types as types;

pub use cell::Cell;
pub use error::{Budget, GridError, LevelError};
pub use game_state::Game;
pub use grid::Grid;
pub use group::{neighbors, Group, GroupIndex, GroupSet};
pub use level::{LayoutToken, LevelData};
pub use notify::{Notifier, NullNotifier};
pub use reward::classify;
pub use rng::{ScriptedSource, SeededSource, TileSource};
pub use snapshot::{board_hash, CellSnapshot, GridSnapshot};

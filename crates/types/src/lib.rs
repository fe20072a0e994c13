//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the tile grid.
//! All types are plain data with no behaviour beyond parsing and formatting,
//! making them usable in any context (core logic, a UI layer, the JSON adapter).
//!
//! # Cell Identity
//!
//! Cells are addressed by a 1-based [`CellId`] with a fixed row-major mapping:
//!
//! ```text
//! id = row * width + col + 1
//! ```
//!
//! Ids are exactly `1..=width*height` and never change for the lifetime of a grid.
//! Only the *content* of a cell moves around.
//!
//! # Gameplay Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_CHAIN_SIZE` | 3 | Smallest group that is cleared on the next move |
//! | `MAX_UNDO_CREDITS` | 9 | Cap for the undo credit counter |
//! | `DEFAULT_CLASSIC_WIDTH` | 4 | Grid width used by classic mode |
//! | `DEFAULT_CLASSIC_HEIGHT` | 4 | Grid height used by classic mode |
//!
//! # Examples
//!
//! ```
//! use tile_grid_types::{CellId, Color, Direction};
//!
//! let dir = Direction::from_str("left").unwrap();
//! assert_eq!(dir, Direction::Left);
//!
//! let id = CellId::from_index(4);
//! assert_eq!(id.get(), 5);
//! assert_eq!(id.index(), 4);
//!
//! assert!(Color::Red.is_solid());
//! assert!(Color::Removed.is_vacant());
//! ```

use serde::{Deserialize, Serialize};

/// Smallest connected group size that gets cleared (3)
pub const MIN_CHAIN_SIZE: usize = 3;

/// Maximum number of undo credits a player can hold (9)
pub const MAX_UNDO_CREDITS: u8 = 9;

/// Classic mode grid width
pub const DEFAULT_CLASSIC_WIDTH: u16 = 4;

/// Classic mode grid height
pub const DEFAULT_CLASSIC_HEIGHT: u16 = 4;

/// Color held by a single cell
///
/// `None` is an empty slot. `Removed` is a transient marker left behind by a
/// cell whose content was cleared during the current tick; it is turned back
/// into `None` when the next tick begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    None,
    Red,
    Blue,
    Green,
    Yellow,
    Removed,
}

impl Color {
    /// Colors a tile can actually carry, in spawn order.
    ///
    /// Spawning draws from a prefix of this table; a level may exclude
    /// colors from the tail.
    pub const PALETTE: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    /// True for `None`
    pub fn is_empty(&self) -> bool {
        matches!(self, Color::None)
    }

    /// True for `Removed`
    pub fn is_removed(&self) -> bool {
        matches!(self, Color::Removed)
    }

    /// True if a moving tile may land here (`None` or `Removed`)
    pub fn is_vacant(&self) -> bool {
        matches!(self, Color::None | Color::Removed)
    }

    /// True for one of the four real tile colors
    pub fn is_solid(&self) -> bool {
        !self.is_vacant()
    }

    /// Single-character form used by debug dumps and the level format
    pub fn as_char(&self) -> char {
        match self {
            Color::None => 'x',
            Color::Red => 'r',
            Color::Blue => 'b',
            Color::Green => 'g',
            Color::Yellow => 'y',
            Color::Removed => '*',
        }
    }

    /// Stable byte code (used for board hashing)
    pub fn code(&self) -> u8 {
        match self {
            Color::None => 0,
            Color::Red => 1,
            Color::Blue => 2,
            Color::Green => 3,
            Color::Yellow => 4,
            Color::Removed => 5,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::None => "none",
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Removed => "removed",
        }
    }
}

/// Stable 1-based identifier of a grid slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(u32);

impl CellId {
    /// Wrap a raw 1-based id
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Id of the slot stored at zero-based `index`
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    /// Raw 1-based value
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Zero-based position in the row-major cell array
    ///
    /// Id 0 is never valid; it maps to `usize::MAX` so that every range
    /// check against the cell count rejects it.
    pub const fn index(&self) -> usize {
        if self.0 == 0 {
            usize::MAX
        } else {
            (self.0 - 1) as usize
        }
    }
}

/// Where the value in a cell came from during the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "from", rename_all = "lowercase")]
pub enum Origin {
    /// Not moved this tick (or already acknowledged by the renderer)
    Settled,
    /// Moved here from the given cell
    Moved(CellId),
    /// Freshly spawned
    Spawned,
}

impl Origin {
    /// Source cell when the value was moved
    pub fn source(&self) -> Option<CellId> {
        match self {
            Origin::Moved(id) => Some(*id),
            _ => None,
        }
    }
}

/// Swipe direction; tiles are compacted toward the named edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Parse from string (accepts full names and single letters)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Lifecycle state of a level
///
/// `Timeout` is reserved: no transition rule currently enters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    Playing,
    Paused,
    GameOver,
    Complete,
    Timeout,
}

impl PlayState {
    /// GameOver and Complete end the level until it is restored
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlayState::GameOver | PlayState::Complete)
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayState::Playing => "playing",
            PlayState::Paused => "paused",
            PlayState::GameOver => "gameover",
            PlayState::Complete => "complete",
            PlayState::Timeout => "timeout",
        }
    }
}

/// How the grid is populated over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Endless mode: a random tile spawns after every settled tick
    Classic,
    /// Scripted level with move/swap budgets and win/loss rules
    Challenge,
}

/// Reward classification of the remaining move budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardTier {
    Gold,
    Silver,
    Bronze,
}

impl RewardTier {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardTier::Gold => "gold",
            RewardTier::Silver => "silver",
            RewardTier::Bronze => "bronze",
        }
    }
}

/// How long a user-facing notice should stay visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeDuration {
    Short,
    Long,
}

/// Fire-and-forget message for the notification collaborator (toasts)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Notice {
    pub duration: NoticeDuration,
    pub message: String,
}

impl Notice {
    pub fn short(message: impl Into<String>) -> Self {
        Self {
            duration: NoticeDuration::Short,
            message: message.into(),
        }
    }

    pub fn long(message: impl Into<String>) -> Self {
        Self {
            duration: NoticeDuration::Long,
            message: message.into(),
        }
    }
}

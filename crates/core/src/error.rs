//! Error types for level loading and grid commands.
//!
//! Every error returned by a grid or game command is raised before any state
//! is touched, so a failed command leaves the grid exactly as it was.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{CellId, PlayState};

/// Level file could not be turned into [`LevelData`](crate::level::LevelData).
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level file has no header line")]
    MissingHeader,

    #[error("header must have 7 comma-separated fields, found {found}")]
    HeaderFieldCount { found: usize },

    #[error("header field `{field}` is not a valid number: {value:?}")]
    NonNumericField { field: &'static str, value: String },

    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u16, height: u16 },

    #[error("level file has no layout line")]
    MissingLayout,

    #[error("layout must have {expected} tokens, found {found}")]
    TokenCount { expected: usize, found: usize },

    #[error("unknown layout token {token:?} at position {position}")]
    UnknownToken { token: String, position: usize },

    #[error("unexpected content after the layout line: {line:?}")]
    TrailingContent { line: String },

    #[error("cannot derive a level id from {0:?}")]
    LevelId(PathBuf),

    #[error("failed to read level file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A grid or game command was rejected. No state was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell id {id} is outside 1..={max}")]
    OutOfRangeCellId { id: u32, max: u32 },

    #[error("no {0} left")]
    BudgetExhausted(Budget),

    #[error("cell {0} holds no tile")]
    EmptyCell(u32),

    #[error("cannot swap cell {0} with itself")]
    SameCell(u32),

    #[error("illegal state transition from {from:?} to {to:?}")]
    IllegalStateTransition { from: PlayState, to: PlayState },
}

impl GridError {
    pub(crate) fn out_of_range(id: CellId, cell_count: usize) -> Self {
        GridError::OutOfRangeCellId {
            id: id.get(),
            max: cell_count as u32,
        }
    }
}

/// Counter that ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Swaps,
    Undos,
}

impl std::fmt::Display for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Budget::Swaps => f.write_str("swaps"),
            Budget::Undos => f.write_str("undo credits"),
        }
    }
}

//! Input scripts for headless replay.
//!
//! A script is a comma-separated list of inputs:
//!
//! | Token | Command |
//! |-------|---------|
//! | `l`, `r`, `u`, `d` (or `left`, ...) | move |
//! | `s:A:B` | swap cells A and B |
//! | `undo` | spend an undo credit |
//! | `restore` | restart the level |
//! | `pause`, `resume` | lifecycle |

use thiserror::Error;

use crate::adapter::ClientCommand;
use crate::types::{CellId, Direction};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bad script token {token:?} at position {position}")]
pub struct ScriptError {
    pub token: String,
    pub position: usize,
}

/// Parse a whole script. Empty tokens are skipped.
pub fn parse_script(script: &str) -> Result<Vec<ClientCommand>, ScriptError> {
    script
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .enumerate()
        .map(|(position, token)| {
            parse_token(token).ok_or_else(|| ScriptError {
                token: token.to_string(),
                position,
            })
        })
        .collect()
}

/// Parse one script token
pub fn parse_token(token: &str) -> Option<ClientCommand> {
    match token.to_lowercase().as_str() {
        "undo" => return Some(ClientCommand::Undo),
        "restore" => return Some(ClientCommand::Restore),
        "pause" => return Some(ClientCommand::Pause),
        "resume" => return Some(ClientCommand::Resume),
        _ => {}
    }

    if let Some(rest) = token.strip_prefix("s:") {
        let (a, b) = rest.split_once(':')?;
        return Some(ClientCommand::Swap {
            a: CellId::new(a.trim().parse().ok()?),
            b: CellId::new(b.trim().parse().ok()?),
        });
    }

    Direction::from_str(token).map(ClientCommand::Move)
}

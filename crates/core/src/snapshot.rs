//! Read-only snapshots for renderers, the adapter and replay checks.

use std::hash::Hasher;

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::types::{CellId, Color, Origin, PlayState, RewardTier};

/// Stable 64-bit FNV-1a hasher.
///
/// `DefaultHasher` output is not guaranteed stable across Rust releases,
/// so board hashes use this instead.
#[derive(Debug, Clone)]
pub struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// FNV-1a over the color code of every cell in id order
pub fn board_hash(colors: impl IntoIterator<Item = Color>) -> u64 {
    let mut hasher = Fnv1aHasher::new();
    for color in colors {
        hasher.write_u8(color.code());
    }
    hasher.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub id: CellId,
    pub color: Color,
    pub origin: Origin,
    pub pending_removal: bool,
}

/// Everything a UI needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub level_id: u32,
    pub width: u16,
    pub height: u16,
    pub cells: Vec<CellSnapshot>,
    pub spawned: usize,
    pub moves_left: u32,
    pub swaps_left: u32,
    pub undo_credits: u8,
    pub time_left: f32,
    pub pending_groups: usize,
    pub reward: RewardTier,
    pub state: PlayState,
    pub board_hash: u64,
}

impl Grid {
    /// Snapshot with the given lifecycle state
    pub fn snapshot(&self, state: PlayState) -> GridSnapshot {
        GridSnapshot {
            level_id: self.level_id(),
            width: self.width(),
            height: self.height(),
            cells: self
                .cells()
                .iter()
                .map(|c| CellSnapshot {
                    id: c.id(),
                    color: c.color(),
                    origin: c.origin(),
                    pending_removal: c.is_pending_removal(),
                })
                .collect(),
            spawned: self.spawned_count(),
            moves_left: self.moves_left(),
            swaps_left: self.swaps_left(),
            undo_credits: self.undo_credits(),
            time_left: self.time_left(),
            pending_groups: self.pending_group_count(),
            reward: self.reward_tier(),
            state,
            board_hash: self.board_hash(),
        }
    }

    pub fn board_hash(&self) -> u64 {
        board_hash(self.cells().iter().map(|c| c.color()))
    }
}

//! Random source for spawns and `?` layout tokens.
//!
//! The grid only ever asks for "a number below N", so the seam is a tiny
//! trait. Production uses a seeded ChaCha stream; tests can script the exact
//! sequence of picks.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform picks used by the grid.
pub trait TileSource: Send {
    /// Uniform value in `0..bound`. `bound` is always at least 1.
    fn next_below(&mut self, bound: usize) -> usize;
}

/// Deterministic ChaCha8 stream; same seed, same game.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: ChaCha8Rng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for SeededSource {
    fn default() -> Self {
        Self::new(0)
    }
}

impl TileSource for SeededSource {
    fn next_below(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound.max(1))
    }
}

/// Replays a fixed list of picks, then keeps answering 0.
///
/// Values are reduced modulo the requested bound so a script never
/// produces an out-of-range pick.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    picks: VecDeque<usize>,
}

impl ScriptedSource {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }

    /// Picks not consumed yet
    pub fn remaining(&self) -> usize {
        self.picks.len()
    }
}

impl TileSource for ScriptedSource {
    fn next_below(&mut self, bound: usize) -> usize {
        let bound = bound.max(1);
        self.picks.pop_front().map(|v| v % bound).unwrap_or(0)
    }
}

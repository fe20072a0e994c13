//! Reward tiers.

use crate::types::RewardTier;

/// Classify the remaining move budget against the level thresholds.
///
/// Thresholds are inclusive: `moves_left >= min_gold` is gold, otherwise
/// `moves_left >= min_silver` is silver, anything below is bronze.
pub fn classify(moves_left: u32, min_gold: u32, min_silver: u32) -> RewardTier {
    if moves_left >= min_gold {
        RewardTier::Gold
    } else if moves_left >= min_silver {
        RewardTier::Silver
    } else {
        RewardTier::Bronze
    }
}

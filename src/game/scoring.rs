//! Point rules for matches, hints and round completion.

use super::state::Difficulty;

pub const BASE_MATCH_POINTS: i64 = 10;
pub const MATCH_TIME_BONUS_WINDOW_SECS: i64 = 30;
pub const COMPLETION_TIME_BONUS_WINDOW_SECS: i64 = 300;
pub const HINT_PENALTY: u32 = 5;

/// Points for one matched pair.
///
/// `(10 + max(0, 30 - elapsed) - max(0, moves - pairs)) * multiplier`, rounded half up
/// and floored at zero.
pub fn match_points(difficulty: Difficulty, elapsed_secs: u32, moves: u32) -> u32 {
    let time_bonus = (MATCH_TIME_BONUS_WINDOW_SECS - i64::from(elapsed_secs)).max(0);
    let move_penalty = (i64::from(moves) - difficulty.pair_count() as i64).max(0);
    let raw = (BASE_MATCH_POINTS + time_bonus - move_penalty).max(0);
    (raw as f64 * difficulty.multiplier()).round() as u32
}

pub fn completion_bonus(elapsed_secs: u32) -> u32 {
    (COMPLETION_TIME_BONUS_WINDOW_SECS - i64::from(elapsed_secs)).max(0) as u32
}

pub fn final_score(score: u32, elapsed_secs: u32) -> u32 {
    score.saturating_add(completion_bonus(elapsed_secs))
}

pub fn apply_hint_penalty(score: u32) -> u32 {
    score.saturating_sub(HINT_PENALTY)
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::state::Difficulty;
use super::storage::{self, HIGH_SCORES_KEY, KeyValueStore};

pub const LEADERBOARD_LIMIT: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u32,
    pub moves: u32,
    #[serde(rename = "time")]
    pub elapsed_formatted: String,
    #[serde(rename = "date")]
    pub timestamp_ms: i64,
}

impl ScoreEntry {
    pub fn date_label(&self) -> String {
        match chrono::DateTime::from_timestamp_millis(self.timestamp_ms) {
            Some(utc) => utc
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            None => "Unknown date".to_string(),
        }
    }
}

/// Top scores per difficulty, best first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Leaderboard {
    easy: Vec<ScoreEntry>,
    medium: Vec<ScoreEntry>,
    hard: Vec<ScoreEntry>,
    expert: Vec<ScoreEntry>,
}

impl Leaderboard {
    pub fn entries(&self, difficulty: Difficulty) -> &[ScoreEntry] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
            Difficulty::Expert => &self.expert,
        }
    }

    fn entries_mut(&mut self, difficulty: Difficulty) -> &mut Vec<ScoreEntry> {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
            Difficulty::Expert => &mut self.expert,
        }
    }

    pub fn is_empty(&self) -> bool {
        Difficulty::ALL.iter().all(|&d| self.entries(d).is_empty())
    }

    /// Re-sorts every list and drops anything past the limit. Loaded documents may be in any order.
    fn normalize(&mut self) {
        for difficulty in Difficulty::ALL {
            let entries = self.entries_mut(difficulty);
            entries.sort_by(|a, b| b.score.cmp(&a.score));
            entries.truncate(LEADERBOARD_LIMIT);
        }
    }

    /// Inserts `entry` after every entry scoring at least as much, then truncates.
    ///
    /// Returns whether the entry survived the cut.
    pub fn insert(&mut self, difficulty: Difficulty, entry: ScoreEntry) -> bool {
        let entries = self.entries_mut(difficulty);
        let rank = entries.partition_point(|existing| existing.score >= entry.score);
        entries.insert(rank, entry);
        entries.truncate(LEADERBOARD_LIMIT);
        rank < LEADERBOARD_LIMIT
    }

    pub fn clear(&mut self, difficulty: Option<Difficulty>) {
        match difficulty {
            Some(difficulty) => self.entries_mut(difficulty).clear(),
            None => *self = Leaderboard::default(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ScoreLedger {
    board: Leaderboard,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the persisted leaderboard; missing or unreadable data gives an empty one.
    ///
    /// Each difficulty's list is read on its own, so one bad list only drops that list.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let mut board = Leaderboard::default();
        match storage::load_json::<Value, _>(store, HIGH_SCORES_KEY) {
            Ok(Some(Value::Object(doc))) => {
                for difficulty in Difficulty::ALL {
                    let Some(raw) = doc.get(difficulty.code()) else {
                        continue;
                    };
                    match serde_json::from_value::<Vec<ScoreEntry>>(raw.clone()) {
                        Ok(entries) => *board.entries_mut(difficulty) = entries,
                        Err(err) => {
                            tracing::warn!(%difficulty, error = %err, "dropping unreadable high scores")
                        }
                    }
                }
                board.normalize();
            }
            Ok(Some(_)) => tracing::warn!("stored high scores are not an object, starting empty"),
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "could not load high scores, starting empty"),
        }
        ScoreLedger { board }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) {
        if let Err(err) = storage::save_json(store, HIGH_SCORES_KEY, &self.board) {
            tracing::warn!(error = %err, "could not save high scores");
        }
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.board
    }

    pub fn entries(&self, difficulty: Difficulty) -> &[ScoreEntry] {
        self.board.entries(difficulty)
    }

    pub fn best(&self, difficulty: Difficulty) -> Option<&ScoreEntry> {
        self.board.entries(difficulty).first()
    }

    /// Records a finished round stamped with the current time and persists the board.
    pub fn submit<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        difficulty: Difficulty,
        score: u32,
        moves: u32,
        elapsed_formatted: &str,
    ) -> bool {
        let entry = ScoreEntry {
            score,
            moves,
            elapsed_formatted: elapsed_formatted.to_string(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        };
        let is_high_score = self.record(difficulty, entry);
        self.save(store);
        is_high_score
    }

    /// In-memory half of `submit`.
    pub fn record(&mut self, difficulty: Difficulty, entry: ScoreEntry) -> bool {
        let score = entry.score;
        let is_high_score = self.board.insert(difficulty, entry);
        tracing::debug!(%difficulty, score, is_high_score, "recorded score");
        is_high_score
    }

    pub fn reset<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, difficulty: Option<Difficulty>) {
        self.board.clear(difficulty);
        self.save(store);
    }
}

//! Round engine for a memory-matching card game.
//!
//! The crate owns the rules: dealing, flips and match resolution, scoring,
//! hints, pause/resume, the game clock, the per-difficulty leaderboard and
//! user settings. Rendering is left to the host, which sends [`Intent`]s into
//! a [`Game`], advances its clock, and renders the [`GameEvent`]s and
//! [`RoundSnapshot`]s it gets back.

pub mod game;

pub use game::app::{Game, GameConfig, Intent, Response};
pub use game::board::Board;
pub use game::events::{CardView, GameEvent, RoundResult, RoundSnapshot, SoundCue};
pub use game::records::{LEADERBOARD_LIMIT, Leaderboard, ScoreEntry, ScoreLedger};
pub use game::round::{FlipOutcome, MAX_HINTS, RoundState};
pub use game::scheduler::{Generation, Scheduler};
pub use game::settings::{Settings, SettingsPatch, SettingsStore, Theme};
pub use game::state::{Card, CardId, CardState, Difficulty, Phase, Rejection, format_mm_ss};
pub use game::storage::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use game::timer::Timer;

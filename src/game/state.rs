use std::fmt;

use serde::{Deserialize, Serialize};

pub type CardId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CardState {
    #[default]
    Hidden,
    Revealed,
    Matched,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub face_value: String,
    pub state: CardState,
}

impl Card {
    pub fn new(id: CardId, face_value: impl Into<String>) -> Self {
        Card {
            id,
            face_value: face_value.into(),
            state: CardState::Hidden,
        }
    }

    pub fn is_face_up(&self) -> bool {
        self.state != CardState::Hidden
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn pair_count(self) -> usize {
        match self {
            Difficulty::Easy => 4,
            Difficulty::Medium => 8,
            Difficulty::Hard => 12,
            Difficulty::Expert => 16,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 2.0,
            Difficulty::Expert => 2.5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "normal" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "expert" => Some(Difficulty::Expert),
            _ => None,
        }
    }

    /// Unknown codes select the default difficulty instead of failing.
    pub fn from_code_or_default(code: &str) -> Self {
        Self::from_code(code).unwrap_or_else(|| {
            tracing::debug!(code, "unknown difficulty code, using default");
            Difficulty::default()
        })
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Active,
    Paused,
    Complete,
}

impl Phase {
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Active | Phase::Paused)
    }

    pub fn is_paused(self) -> bool {
        self == Phase::Paused
    }
}

/// Why an intent was dropped. Rejections are never errors for the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    Paused,
    Complete,
    NotActive,
    UnknownCard,
    CardUnavailable,
    PairPending,
    HintsExhausted,
    NoEligiblePair,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::Paused => "round is paused",
            Rejection::Complete => "round is complete",
            Rejection::NotActive => "round is not active",
            Rejection::UnknownCard => "no card with that id",
            Rejection::CardUnavailable => "card is already face up",
            Rejection::PairPending => "a pair is awaiting resolution",
            Rejection::HintsExhausted => "no hints left",
            Rejection::NoEligiblePair => "no hidden pair to hint",
        };
        f.write_str(text)
    }
}

pub fn format_mm_ss(total_secs: u32) -> String {
    let mins = total_secs / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}", mins, secs)
}

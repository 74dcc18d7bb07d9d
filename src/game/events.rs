//! Everything the presentation layer receives: queued events and full snapshots.

use serde::Serialize;

use super::round::RoundState;
use super::settings::Settings;
use super::state::{CardId, CardState, Difficulty, Phase, format_mm_ss};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundCue {
    Flip,
    Match,
    Miss,
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub difficulty: Difficulty,
    pub final_score: u32,
    pub moves: u32,
    pub formatted_time: String,
    pub is_new_high_score: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameEvent {
    RoundStarted { difficulty: Difficulty, pairs: usize },
    CardChanged { id: CardId, state: CardState },
    ScoreChanged { score: u32 },
    MovesChanged { moves: u32 },
    TimeChanged { elapsed_seconds: u32, formatted: String },
    PauseChanged { paused: bool },
    HintShown { cards: [CardId; 2], hints_left: u32 },
    HintHidden { cards: Vec<CardId> },
    RoundComplete(RoundResult),
    SettingsChanged(Settings),
    Sound { cue: SoundCue, volume: u8 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: CardId,
    pub state: CardState,
    /// Only present while the card is face up.
    pub face_value: Option<String>,
    pub hinted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
    pub difficulty: Difficulty,
    pub phase: Phase,
    pub cards: Vec<CardView>,
    pub matched_pairs: usize,
    pub pairs: usize,
    pub score: u32,
    pub moves: u32,
    pub elapsed_seconds: u32,
    pub formatted_time: String,
    pub is_active: bool,
    pub is_paused: bool,
    pub hints_left: u32,
    pub final_score: Option<u32>,
}

impl RoundSnapshot {
    pub fn capture(round: &RoundState) -> Self {
        let cards = round
            .board()
            .cards()
            .iter()
            .map(|card| CardView {
                id: card.id,
                state: card.state,
                face_value: card.is_face_up().then(|| card.face_value.clone()),
                hinted: round.hinted().contains(&card.id),
            })
            .collect();

        RoundSnapshot {
            difficulty: round.difficulty(),
            phase: round.phase(),
            cards,
            matched_pairs: round.matched_pair_count(),
            pairs: round.pair_count(),
            score: round.score(),
            moves: round.move_count(),
            elapsed_seconds: round.elapsed_seconds(),
            formatted_time: format_mm_ss(round.elapsed_seconds()),
            is_active: round.is_active(),
            is_paused: round.is_paused(),
            hints_left: round.hints_left(),
            final_score: round.final_score(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Board;

    #[test]
    fn snapshot_hides_face_down_values() {
        let mut round = RoundState::new(Difficulty::Easy, Board::from_values(["x", "y", "x", "y"]), 1);
        round.flip(2);

        let snapshot = RoundSnapshot::capture(&round);
        assert_eq!(snapshot.cards[0].face_value, None);
        assert_eq!(snapshot.cards[2].face_value.as_deref(), Some("x"));
        assert_eq!(snapshot.phase, Phase::Active);
        assert_eq!(snapshot.pairs, 2);
        assert_eq!(snapshot.formatted_time, "00:00");
    }

    #[test]
    fn events_serialize_with_a_type_tag() {
        let event = GameEvent::PauseChanged { paused: true };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "pauseChanged", "paused": true }));
    }
}

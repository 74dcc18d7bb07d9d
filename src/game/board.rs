use rand::Rng;
use rand::seq::SliceRandom;

use super::state::{Card, CardId, CardState, Difficulty};

pub const SYMBOLS: [&str; 24] = [
    "🎮", "🎯", "🎲", "🎪", "🎨", "🎭", "🎸", "🎺", "🎻", "🎹", "🎬", "🎤",
    "🎧", "🎳", "🏀", "⚽", "🚀", "🌙", "🦊", "🐙", "🍉", "🍒", "🌵", "🍄",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    /// Builds a shuffled board for `difficulty`: `pair_count` distinct symbols, each twice.
    pub fn build<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> Self {
        let pair_count = difficulty.pair_count().min(SYMBOLS.len());
        let mut values: Vec<&str> = Vec::with_capacity(pair_count * 2);
        for &symbol in &SYMBOLS[..pair_count] {
            values.push(symbol);
            values.push(symbol);
        }

        values.shuffle(rng);
        tracing::trace!(%difficulty, cards = values.len(), "built board");

        Board::from_values(values)
    }

    /// Lays out cards in the given order, all hidden. Used for fixed layouts in tests and replays.
    pub fn from_values<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        let cards = values
            .into_iter()
            .enumerate()
            .map(|(id, value)| Card::new(id, value))
            .collect();
        Board { cards }
    }

    /// Puts every card face down and shuffles the layout, keeping ids positional.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut values: Vec<String> = self.cards.drain(..).map(|card| card.face_value).collect();
        values.shuffle(rng);
        *self = Board::from_values(values);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    pub(super) fn set_state(&mut self, id: CardId, state: CardState) {
        if let Some(card) = self.cards.get_mut(id) {
            card.state = state;
        }
    }

    pub fn state_of(&self, id: CardId) -> Option<CardState> {
        self.cards.get(id).map(|card| card.state)
    }

    /// First face value, in board order, that still has two hidden cards, with those two ids.
    pub fn first_hidden_pair(&self) -> Option<(CardId, CardId)> {
        for (idx, card) in self.cards.iter().enumerate() {
            if card.state != CardState::Hidden {
                continue;
            }
            let twin = self.cards[idx + 1..]
                .iter()
                .find(|other| other.state == CardState::Hidden && other.face_value == card.face_value);
            if let Some(twin) = twin {
                return Some((card.id, twin.id));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn value_counts(board: &Board) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for card in board.cards() {
            *counts.entry(card.face_value.clone()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn every_difficulty_gets_pairs_only() {
        let mut rng = StdRng::seed_from_u64(7);
        for difficulty in Difficulty::ALL {
            let board = Board::build(difficulty, &mut rng);
            assert_eq!(board.len(), difficulty.pair_count() * 2);
            let counts = value_counts(&board);
            assert_eq!(counts.len(), difficulty.pair_count());
            assert!(counts.values().all(|&n| n == 2));
            assert!(board.cards().iter().enumerate().all(|(i, c)| c.id == i));
        }
    }

    #[test]
    fn easy_board_uses_the_first_symbols() {
        let mut rng = StdRng::seed_from_u64(1);
        let board = Board::build(Difficulty::Easy, &mut rng);
        let counts = value_counts(&board);
        for symbol in &SYMBOLS[..4] {
            assert_eq!(counts.get(*symbol), Some(&2));
        }
    }

    #[test]
    fn reshuffle_hides_everything_and_keeps_values() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut board = Board::build(Difficulty::Medium, &mut rng);
        let before = value_counts(&board);
        board.set_state(0, CardState::Matched);
        board.set_state(1, CardState::Revealed);

        board.reshuffle(&mut rng);

        assert_eq!(value_counts(&board), before);
        assert!(board.cards().iter().all(|c| c.state == CardState::Hidden));
    }

    #[test]
    fn hidden_pair_skips_matched_and_revealed_cards() {
        let mut board = Board::from_values(["a", "b", "a", "b", "c", "c"]);
        assert_eq!(board.first_hidden_pair(), Some((0, 2)));

        board.set_state(0, CardState::Matched);
        board.set_state(2, CardState::Matched);
        board.set_state(1, CardState::Revealed);
        assert_eq!(board.first_hidden_pair(), Some((4, 5)));

        board.set_state(4, CardState::Revealed);
        assert_eq!(board.first_hidden_pair(), None);
    }
}

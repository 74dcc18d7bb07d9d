use super::board::Board;
use super::scheduler::Generation;
use super::scoring;
use super::state::{CardId, CardState, Difficulty, Phase, Rejection};

pub const MAX_HINTS: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipOutcome {
    Rejected(Rejection),
    Revealed {
        started: bool,
    },
    PairPending {
        first: CardId,
        second: CardId,
        started: bool,
    },
}

impl FlipOutcome {
    pub fn is_accepted(self) -> bool {
        !matches!(self, FlipOutcome::Rejected(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    pub final_score: u32,
    pub moves: u32,
    pub elapsed_seconds: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Matched {
        first: CardId,
        second: CardId,
        points: u32,
        completion: Option<Completion>,
    },
    Mismatched {
        first: CardId,
        second: CardId,
    },
}

/// One round on one board. Pure state: no clock, no scheduling.
#[derive(Clone, Debug)]
pub struct RoundState {
    generation: Generation,
    difficulty: Difficulty,
    board: Board,
    revealed_unconfirmed: Vec<CardId>,
    matched_pair_count: usize,
    move_count: u32,
    score: u32,
    elapsed_seconds: u32,
    phase: Phase,
    hints_used: u32,
    hinted: Vec<CardId>,
    final_score: Option<u32>,
}

impl RoundState {
    pub fn new(difficulty: Difficulty, board: Board, generation: Generation) -> Self {
        RoundState {
            generation,
            difficulty,
            board,
            revealed_unconfirmed: Vec::with_capacity(2),
            matched_pair_count: 0,
            move_count: 0,
            score: 0,
            elapsed_seconds: 0,
            phase: Phase::Idle,
            hints_used: 0,
            hinted: Vec::new(),
            final_score: None,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn revealed_unconfirmed(&self) -> &[CardId] {
        &self.revealed_unconfirmed
    }

    pub fn pair_count(&self) -> usize {
        self.board.pair_count()
    }

    pub fn matched_pair_count(&self) -> usize {
        self.matched_pair_count
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn is_paused(&self) -> bool {
        self.phase.is_paused()
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn hints_left(&self) -> u32 {
        MAX_HINTS.saturating_sub(self.hints_used)
    }

    pub fn hinted(&self) -> &[CardId] {
        &self.hinted
    }

    pub fn final_score(&self) -> Option<u32> {
        self.final_score
    }

    pub fn has_pending_pair(&self) -> bool {
        self.revealed_unconfirmed.len() == 2
    }

    /// Timer readings only move forward within a round.
    pub fn set_elapsed_seconds(&mut self, secs: u32) {
        self.elapsed_seconds = self.elapsed_seconds.max(secs);
    }

    pub fn flip(&mut self, id: CardId) -> FlipOutcome {
        match self.phase {
            Phase::Paused => return FlipOutcome::Rejected(Rejection::Paused),
            Phase::Complete => return FlipOutcome::Rejected(Rejection::Complete),
            Phase::Idle | Phase::Active => {}
        }
        let Some(state) = self.board.state_of(id) else {
            return FlipOutcome::Rejected(Rejection::UnknownCard);
        };
        if state != CardState::Hidden {
            return FlipOutcome::Rejected(Rejection::CardUnavailable);
        }
        if self.has_pending_pair() {
            return FlipOutcome::Rejected(Rejection::PairPending);
        }

        let started = self.phase == Phase::Idle;
        if started {
            self.phase = Phase::Active;
        }

        self.board.set_state(id, CardState::Revealed);
        self.revealed_unconfirmed.push(id);

        if let &[first, second] = self.revealed_unconfirmed.as_slice() {
            self.move_count = self.move_count.saturating_add(1);
            FlipOutcome::PairPending {
                first,
                second,
                started,
            }
        } else {
            FlipOutcome::Revealed { started }
        }
    }

    /// Compares the pending pair exactly once. Returns `None` when nothing is pending.
    pub fn resolve_pair(&mut self, elapsed_secs: u32) -> Option<Resolution> {
        if !self.has_pending_pair() {
            return None;
        }
        self.set_elapsed_seconds(elapsed_secs);
        let first = self.revealed_unconfirmed[0];
        let second = self.revealed_unconfirmed[1];
        self.revealed_unconfirmed.clear();

        let is_match = match (self.board.get(first), self.board.get(second)) {
            (Some(a), Some(b)) => a.face_value == b.face_value,
            _ => false,
        };

        if !is_match {
            self.board.set_state(first, CardState::Hidden);
            self.board.set_state(second, CardState::Hidden);
            return Some(Resolution::Mismatched { first, second });
        }

        self.board.set_state(first, CardState::Matched);
        self.board.set_state(second, CardState::Matched);
        self.hinted.retain(|&id| id != first && id != second);
        self.matched_pair_count = (self.matched_pair_count + 1).min(self.pair_count());

        let points = scoring::match_points(self.difficulty, self.elapsed_seconds, self.move_count);
        self.score = self.score.saturating_add(points);

        let completion = if self.matched_pair_count == self.pair_count() {
            Some(self.complete())
        } else {
            None
        };

        Some(Resolution::Matched {
            first,
            second,
            points,
            completion,
        })
    }

    fn complete(&mut self) -> Completion {
        self.phase = Phase::Complete;
        let final_score = scoring::final_score(self.score, self.elapsed_seconds);
        self.final_score = Some(final_score);
        Completion {
            final_score,
            moves: self.move_count,
            elapsed_seconds: self.elapsed_seconds,
        }
    }

    pub fn pause(&mut self) -> Result<(), Rejection> {
        match self.phase {
            Phase::Active => {
                self.phase = Phase::Paused;
                Ok(())
            }
            Phase::Paused => Err(Rejection::Paused),
            Phase::Idle => Err(Rejection::NotActive),
            Phase::Complete => Err(Rejection::Complete),
        }
    }

    pub fn resume(&mut self) -> Result<(), Rejection> {
        match self.phase {
            Phase::Paused => {
                self.phase = Phase::Active;
                Ok(())
            }
            Phase::Active | Phase::Idle => Err(Rejection::NotActive),
            Phase::Complete => Err(Rejection::Complete),
        }
    }

    /// Shows one hidden pair and charges the hint penalty.
    pub fn begin_hint(&mut self) -> Result<(CardId, CardId), Rejection> {
        match self.phase {
            Phase::Active => {}
            Phase::Paused => return Err(Rejection::Paused),
            Phase::Idle => return Err(Rejection::NotActive),
            Phase::Complete => return Err(Rejection::Complete),
        }
        if self.hints_used >= MAX_HINTS {
            return Err(Rejection::HintsExhausted);
        }
        let (first, second) = self
            .board
            .first_hidden_pair()
            .ok_or(Rejection::NoEligiblePair)?;

        self.board.set_state(first, CardState::Revealed);
        self.board.set_state(second, CardState::Revealed);
        self.hinted.extend([first, second]);
        self.hints_used += 1;
        self.score = scoring::apply_hint_penalty(self.score);
        Ok((first, second))
    }

    /// Turns hinted cards back down. Cards matched or picked by the player since stay as they are.
    pub fn end_hint(&mut self, ids: &[CardId]) -> Vec<CardId> {
        let mut hidden = Vec::with_capacity(ids.len());
        for &id in ids {
            let Some(pos) = self.hinted.iter().position(|&h| h == id) else {
                continue;
            };
            self.hinted.swap_remove(pos);
            if self.board.state_of(id) == Some(CardState::Revealed)
                && !self.revealed_unconfirmed.contains(&id)
            {
                self.board.set_state(id, CardState::Hidden);
                hidden.push(id);
            }
        }
        hidden
    }
}

//! End-to-end round tests driven through the `Game` controller on the logical clock.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use memory_match::{
    CardId, CardState, Difficulty, FlipOutcome, Game, GameConfig, GameEvent, Intent, MAX_HINTS,
    MemoryStore, Phase, Rejection, Response, SettingsPatch, SoundCue,
};
use proptest::prelude::*;

fn easy_game(seed: u64) -> Game<MemoryStore> {
    let config = GameConfig {
        difficulty: Difficulty::Easy,
        seed: Some(seed),
        ..GameConfig::default()
    };
    Game::open(MemoryStore::new(), config)
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Matching pairs of the dealt board, in order of first appearance.
fn pairs(game: &Game<MemoryStore>) -> Vec<(CardId, CardId)> {
    let mut first_seen: HashMap<&str, CardId> = HashMap::new();
    let mut pairs = Vec::new();
    for card in game.round().board().cards() {
        match first_seen.remove(card.face_value.as_str()) {
            Some(first) => pairs.push((first, card.id)),
            None => {
                first_seen.insert(card.face_value.as_str(), card.id);
            }
        }
    }
    pairs
}

fn mismatched(game: &Game<MemoryStore>) -> (CardId, CardId) {
    let cards = game.round().board().cards();
    let other = cards
        .iter()
        .find(|card| card.face_value != cards[0].face_value)
        .unwrap();
    (cards[0].id, other.id)
}

#[test]
fn test_perfect_easy_round() {
    let mut game = easy_game(7);
    game.drain_events().for_each(drop);

    for (a, b) in pairs(&game) {
        assert!(game.flip(a).is_accepted());
        assert!(game.flip(b).is_accepted());
        game.advance(secs(1));
    }

    let round = game.round();
    assert_eq!(round.phase(), Phase::Complete);
    assert_eq!(round.move_count(), 4);
    assert_eq!(round.matched_pair_count(), 4);
    // resolutions at 1..=4 seconds: 39 + 38 + 37 + 36
    assert_eq!(round.score(), 150);
    assert_eq!(round.final_score(), Some(150 + 296));

    let result = game.last_result().unwrap();
    assert_eq!(result.final_score, 446);
    assert_eq!(result.formatted_time, "00:04");
    assert!(result.is_new_high_score);
    assert_eq!(game.leaderboard(Difficulty::Easy).len(), 1);
    assert_eq!(game.leaderboard(Difficulty::Easy)[0].score, 446);

    let events: Vec<GameEvent> = game.drain_events().collect();
    let completions = events
        .iter()
        .filter(|event| matches!(event, GameEvent::RoundComplete(_)))
        .count();
    assert_eq!(completions, 1);
    assert!(events.contains(&GameEvent::Sound {
        cue: SoundCue::Complete,
        volume: 50
    }));

    // nothing moves after completion
    assert_eq!(
        game.flip(0),
        FlipOutcome::Rejected(Rejection::Complete)
    );
    game.advance(secs(30));
    assert_eq!(game.elapsed_seconds(), 4);
}

#[test]
fn test_mismatch_turns_cards_back_after_delay() {
    let mut game = easy_game(11);
    let (a, b) = mismatched(&game);

    game.flip(a);
    game.flip(b);
    assert_eq!(game.flip(a), FlipOutcome::Rejected(Rejection::CardUnavailable));
    let third = (0..8).find(|&id| id != a && id != b).unwrap();
    assert_eq!(game.flip(third), FlipOutcome::Rejected(Rejection::PairPending));

    game.advance(Duration::from_millis(999));
    assert_eq!(game.round().board().state_of(a), Some(CardState::Revealed));

    game.advance(Duration::from_millis(1));
    assert_eq!(game.round().board().state_of(a), Some(CardState::Hidden));
    assert_eq!(game.round().board().state_of(b), Some(CardState::Hidden));
    assert_eq!(game.round().score(), 0);
    assert_eq!(game.round().move_count(), 1);
    assert!(!game.round().has_pending_pair());
}

#[test]
fn test_pause_freezes_the_clock() {
    let mut game = easy_game(3);
    game.flip(0);
    game.advance(secs(3));
    assert_eq!(game.elapsed_seconds(), 3);

    assert_eq!(game.dispatch(Intent::TogglePause), Response::Accepted);
    assert!(game.round().is_paused());
    assert_eq!(game.flip(1), FlipOutcome::Rejected(Rejection::Paused));
    assert_eq!(game.dispatch(Intent::Hint), Response::Ignored(Rejection::Paused));
    assert_eq!(game.dispatch(Intent::Pause), Response::Ignored(Rejection::Paused));

    game.advance(secs(10));
    assert_eq!(game.snapshot().elapsed_seconds, 3);
    assert_eq!(game.snapshot().formatted_time, "00:03");

    assert_eq!(game.dispatch(Intent::Resume), Response::Accepted);
    game.advance(secs(2));
    assert_eq!(game.snapshot().elapsed_seconds, 5);
    assert_eq!(game.round().phase(), Phase::Active);
}

#[test]
fn test_pause_needs_a_started_round() {
    let mut game = easy_game(3);
    assert_eq!(game.dispatch(Intent::Pause), Response::Ignored(Rejection::NotActive));
    assert_eq!(game.dispatch(Intent::Hint), Response::Ignored(Rejection::NotActive));
    game.advance(secs(5));
    assert_eq!(game.elapsed_seconds(), 0);
}

#[test]
fn test_hints_run_out_after_three() {
    let mut game = easy_game(5);
    game.flip(0);
    game.drain_events().for_each(drop);

    let mut shown = Vec::new();
    for _ in 0..3 {
        let [a, b] = game.hint().unwrap();
        assert_eq!(game.round().board().state_of(a), Some(CardState::Revealed));
        assert_eq!(game.round().board().state_of(b), Some(CardState::Revealed));
        shown.extend([a, b]);
    }
    assert_eq!(game.hint(), Err(Rejection::HintsExhausted));
    assert_eq!(game.round().hints_left(), 0);
    assert_eq!(game.round().score(), 0);
    assert!(!shown.contains(&0));

    game.advance(secs(2));
    for id in shown {
        assert_eq!(game.round().board().state_of(id), Some(CardState::Hidden));
    }
    assert_eq!(game.round().board().state_of(0), Some(CardState::Revealed));

    let hidden = game
        .drain_events()
        .filter(|event| matches!(event, GameEvent::HintHidden { .. }))
        .count();
    assert_eq!(hidden, 3);
}

#[test]
fn test_hint_penalty_comes_off_the_score() {
    let mut game = easy_game(9);
    let (a, b) = pairs(&game)[0];
    game.flip(a);
    game.flip(b);
    game.advance(secs(1));
    assert_eq!(game.round().score(), 39);

    game.hint().unwrap();
    assert_eq!(game.round().score(), 34);
}

#[test]
fn test_fourth_hint_costs_nothing() {
    let mut game = easy_game(9);
    let (a, b) = pairs(&game)[0];
    game.flip(a);
    game.flip(b);
    game.advance(secs(1));
    let before = game.round().score();
    assert_eq!(before, 39);

    for _ in 0..3 {
        assert!(game.hint().is_ok());
        game.advance(secs(2));
    }
    assert_eq!(game.hint(), Err(Rejection::HintsExhausted));
    game.advance(secs(2));

    assert_eq!(game.round().hints_used(), MAX_HINTS);
    assert_eq!(game.round().score(), before - 15);
}

#[test]
fn test_selecting_difficulty_by_code() {
    let mut game = easy_game(6);
    assert_eq!(
        game.dispatch(Intent::SelectDifficulty("Expert".to_string())),
        Response::Accepted
    );
    assert_eq!(game.round().difficulty(), Difficulty::Expert);

    game.dispatch(Intent::SelectDifficulty("nightmare".to_string()));
    assert_eq!(game.round().difficulty(), Difficulty::Medium);
    assert_eq!(game.round().board().len(), 16);
    assert_eq!(game.round().phase(), Phase::Idle);
}

#[test]
fn test_restart_drops_pending_work() {
    let mut game = easy_game(13);
    let (a, b) = mismatched(&game);
    game.flip(a);
    game.flip(b);
    game.hint().unwrap();

    game.restart(None);
    assert_eq!(game.round().generation(), 2);
    assert_eq!(game.round().phase(), Phase::Idle);
    game.drain_events().for_each(drop);

    game.advance(secs(5));
    assert_eq!(game.drain_events().count(), 0);
    assert_eq!(game.elapsed_seconds(), 0);
    assert!(game
        .round()
        .board()
        .cards()
        .iter()
        .all(|card| card.state == CardState::Hidden));
    assert_eq!(game.round().hints_left(), 3);
}

#[test]
fn test_restart_with_new_difficulty_deals_new_board() {
    let mut game = easy_game(1);
    assert_eq!(
        game.dispatch(Intent::Restart(Some(Difficulty::Expert))),
        Response::Accepted
    );
    assert_eq!(game.round().difficulty(), Difficulty::Expert);
    assert_eq!(game.round().board().len(), 32);
    assert_eq!(game.snapshot().pairs, 16);
}

#[test]
fn test_muted_game_emits_no_sound() {
    let mut game = easy_game(21);
    game.dispatch(Intent::ChangeSettings(SettingsPatch {
        sound_enabled: Some(false),
        ..SettingsPatch::default()
    }));
    game.drain_events().for_each(drop);

    game.flip(0);
    assert!(!game
        .drain_events()
        .any(|event| matches!(event, GameEvent::Sound { .. })));
}

#[test]
fn test_second_weaker_round_is_not_a_high_score() {
    let mut game = easy_game(2);
    for (a, b) in pairs(&game) {
        game.flip(a);
        game.flip(b);
        game.advance(secs(1));
    }
    assert!(game.last_result().unwrap().is_new_high_score);

    game.restart(None);
    let (x, y) = mismatched(&game);
    game.flip(x);
    game.flip(y);
    game.advance(secs(20));
    for (a, b) in pairs(&game) {
        game.flip(a);
        game.flip(b);
        game.advance(secs(1));
    }

    let result = game.last_result().unwrap();
    assert!(result.final_score < 446);
    // second place on the board still counts as a high score
    assert!(result.is_new_high_score);
    let board = game.leaderboard(Difficulty::Easy);
    assert_eq!(board.len(), 2);
    assert!(board[0].score >= board[1].score);
}

#[derive(Clone, Debug)]
enum Step {
    Intent(Intent),
    Advance(u64),
}

fn any_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        5 => (0usize..8).prop_map(|id| Step::Intent(Intent::Flip(id))),
        1 => Just(Step::Intent(Intent::Hint)),
        1 => Just(Step::Intent(Intent::TogglePause)),
        1 => Just(Step::Intent(Intent::Restart(None))),
        4 => (0u64..2_500).prop_map(Step::Advance),
    ]
}

proptest! {
    #[test]
    fn prop_round_invariants_hold_after_every_step(
        seed in any::<u64>(),
        steps in prop::collection::vec(any_step(), 1..200),
    ) {
        let mut game = easy_game(seed);
        let mut generation = game.round().generation();
        let mut matched_pairs = 0;
        let mut matched_cards: HashSet<CardId> = HashSet::new();

        for step in steps {
            match step {
                Step::Intent(intent) => {
                    game.dispatch(intent);
                }
                Step::Advance(ms) => game.advance(Duration::from_millis(ms)),
            }

            let round = game.round();
            if round.generation() != generation {
                generation = round.generation();
                matched_pairs = 0;
                matched_cards.clear();
            }

            let pairs = round.pair_count();
            prop_assert!(round.matched_pair_count() >= matched_pairs);
            prop_assert!(round.matched_pair_count() <= pairs);
            prop_assert_eq!(round.is_complete(), round.matched_pair_count() == pairs);
            prop_assert!(round.revealed_unconfirmed().len() <= 2);

            for id in &matched_cards {
                prop_assert_eq!(round.board().state_of(*id), Some(CardState::Matched));
            }
            let now_matched: Vec<CardId> = round
                .board()
                .cards()
                .iter()
                .filter(|card| card.state == CardState::Matched)
                .map(|card| card.id)
                .collect();
            prop_assert_eq!(now_matched.len(), round.matched_pair_count() * 2);

            matched_pairs = round.matched_pair_count();
            matched_cards.extend(now_matched);
        }
    }
}

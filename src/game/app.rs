use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::board::Board;
use super::events::{GameEvent, RoundResult, RoundSnapshot, SoundCue};
use super::records::{ScoreEntry, ScoreLedger};
use super::round::{Completion, FlipOutcome, Resolution, RoundState};
use super::scheduler::Scheduler;
use super::settings::{Settings, SettingsPatch, SettingsStore};
use super::state::{CardId, CardState, Difficulty, Rejection, format_mm_ss};
use super::storage::KeyValueStore;
use super::timer::Timer;

pub const RESOLVE_DELAY_MS: u64 = 1000;
pub const HINT_REVEAL_MS: u64 = 2000;
pub const TICK_MS: u64 = 1000;

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub difficulty: Difficulty,
    pub resolve_delay: Duration,
    pub hint_reveal: Duration,
    pub tick_interval: Duration,
    /// Fixed seed for reproducible shuffles; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            difficulty: Difficulty::default(),
            resolve_delay: Duration::from_millis(RESOLVE_DELAY_MS),
            hint_reveal: Duration::from_millis(HINT_REVEAL_MS),
            tick_interval: Duration::from_millis(TICK_MS),
            seed: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Deferred {
    ResolvePair,
    HideHint([CardId; 2]),
    Tick,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Flip(CardId),
    Restart(Option<Difficulty>),
    /// Difficulty picked by its code, as a selector sends it. Unknown codes start a default round.
    SelectDifficulty(String),
    Pause,
    Resume,
    TogglePause,
    Hint,
    ChangeSettings(SettingsPatch),
    ResetSettings,
    ViewLeaderboard(Difficulty),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Accepted,
    Ignored(Rejection),
    Leaderboard(Vec<ScoreEntry>),
}

impl From<Result<(), Rejection>> for Response {
    fn from(result: Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Response::Accepted,
            Err(reason) => Response::Ignored(reason),
        }
    }
}

/// Process-wide game context: the live round plus the stores that outlive it.
///
/// Single writer. Hosts feed it intents and wall-clock progress through
/// [`Game::advance`], then drain the queued [`GameEvent`]s to render.
pub struct Game<S: KeyValueStore> {
    config: GameConfig,
    rng: StdRng,
    round: RoundState,
    timer: Timer,
    scheduler: Scheduler<Deferred>,
    ledger: ScoreLedger,
    settings: SettingsStore,
    store: S,
    events: Vec<GameEvent>,
    last_result: Option<RoundResult>,
}

impl<S: KeyValueStore> Game<S> {
    /// Loads scores and settings from `store` and deals the first board.
    pub fn open(store: S, config: GameConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let ledger = ScoreLedger::load(&store);
        let settings = SettingsStore::load(&store);
        let board = Board::build(config.difficulty, &mut rng);
        let round = RoundState::new(config.difficulty, board, 1);

        let mut game = Game {
            config,
            rng,
            round,
            timer: Timer::new(),
            scheduler: Scheduler::new(),
            ledger,
            settings,
            store,
            events: Vec::new(),
            last_result: None,
        };
        game.announce_round();
        game
    }

    /// Drops pending work and hands the store back.
    pub fn close(mut self) -> S {
        let dropped = self.scheduler.cancel_generation(self.round.generation());
        tracing::debug!(dropped, "closing game");
        self.store
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn settings(&self) -> &Settings {
        self.settings.get()
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.timer.elapsed_seconds(self.scheduler.now())
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let mut snapshot = RoundSnapshot::capture(&self.round);
        snapshot.elapsed_seconds = snapshot.elapsed_seconds.max(self.elapsed_seconds());
        snapshot.formatted_time = format_mm_ss(snapshot.elapsed_seconds);
        snapshot
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub fn dispatch(&mut self, intent: Intent) -> Response {
        match intent {
            Intent::Flip(id) => match self.flip(id) {
                FlipOutcome::Rejected(reason) => Response::Ignored(reason),
                _ => Response::Accepted,
            },
            Intent::Restart(difficulty) => {
                self.restart(difficulty);
                Response::Accepted
            }
            Intent::SelectDifficulty(code) => {
                self.restart(Some(Difficulty::from_code_or_default(&code)));
                Response::Accepted
            }
            Intent::Pause => self.pause().into(),
            Intent::Resume => self.resume().into(),
            Intent::TogglePause => self.toggle_pause().into(),
            Intent::Hint => self.hint().map(|_| ()).into(),
            Intent::ChangeSettings(patch) => {
                self.change_settings(&patch);
                Response::Accepted
            }
            Intent::ResetSettings => {
                self.reset_settings();
                Response::Accepted
            }
            Intent::ViewLeaderboard(difficulty) => {
                Response::Leaderboard(self.ledger.entries(difficulty).to_vec())
            }
        }
    }

    pub fn flip(&mut self, id: CardId) -> FlipOutcome {
        let outcome = self.round.flip(id);
        let started = match outcome {
            FlipOutcome::Rejected(reason) => {
                tracing::debug!(card = id, %reason, "flip ignored");
                return outcome;
            }
            FlipOutcome::Revealed { started } => started,
            FlipOutcome::PairPending { started, .. } => started,
        };

        if started {
            self.start_clock();
        }
        self.emit(GameEvent::CardChanged {
            id,
            state: CardState::Revealed,
        });
        self.cue(SoundCue::Flip);

        if let FlipOutcome::PairPending { .. } = outcome {
            self.emit(GameEvent::MovesChanged {
                moves: self.round.move_count(),
            });
            self.schedule(self.config.resolve_delay, Deferred::ResolvePair);
        }
        outcome
    }

    pub fn pause(&mut self) -> Result<(), Rejection> {
        self.round.pause()?;
        let now = self.scheduler.now();
        self.timer.pause(now);
        self.round.set_elapsed_seconds(self.timer.elapsed_seconds(now));
        self.emit(GameEvent::PauseChanged { paused: true });
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), Rejection> {
        self.round.resume()?;
        self.timer.resume(self.scheduler.now());
        self.emit(GameEvent::PauseChanged { paused: false });
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> Result<(), Rejection> {
        if self.round.is_paused() {
            self.resume()
        } else {
            self.pause()
        }
    }

    pub fn hint(&mut self) -> Result<[CardId; 2], Rejection> {
        let (first, second) = self.round.begin_hint().inspect_err(|reason| {
            tracing::debug!(%reason, "hint ignored");
        })?;

        for id in [first, second] {
            self.emit(GameEvent::CardChanged {
                id,
                state: CardState::Revealed,
            });
        }
        self.emit(GameEvent::HintShown {
            cards: [first, second],
            hints_left: self.round.hints_left(),
        });
        self.emit(GameEvent::ScoreChanged {
            score: self.round.score(),
        });
        self.schedule(self.config.hint_reveal, Deferred::HideHint([first, second]));
        Ok([first, second])
    }

    /// Starts over in Idle. A new difficulty deals a fresh board; otherwise the current one is reshuffled.
    pub fn restart(&mut self, difficulty: Option<Difficulty>) {
        let old_generation = self.round.generation();
        let cancelled = self.scheduler.cancel_generation(old_generation);

        let (difficulty, board) = match difficulty {
            Some(difficulty) => (difficulty, Board::build(difficulty, &mut self.rng)),
            None => {
                let mut board = self.round.board().clone();
                board.reshuffle(&mut self.rng);
                (self.round.difficulty(), board)
            }
        };

        self.timer.reset();
        self.round = RoundState::new(difficulty, board, old_generation.wrapping_add(1));
        self.last_result = None;
        tracing::debug!(%difficulty, cancelled, generation = self.round.generation(), "round restarted");
        self.announce_round();
    }

    pub fn change_settings(&mut self, patch: &SettingsPatch) {
        self.settings.update(&mut self.store, patch);
        self.emit(GameEvent::SettingsChanged(self.settings.get().clone()));
    }

    pub fn reset_settings(&mut self) {
        self.settings.reset(&mut self.store);
        self.emit(GameEvent::SettingsChanged(self.settings.get().clone()));
    }

    pub fn leaderboard(&self, difficulty: Difficulty) -> &[ScoreEntry] {
        self.ledger.entries(difficulty)
    }

    pub fn reset_scores(&mut self, difficulty: Option<Difficulty>) {
        self.ledger.reset(&mut self.store, difficulty);
    }

    /// Moves the game clock forward by `by`, running every deferred task that comes due on the way.
    pub fn advance(&mut self, by: Duration) {
        let deadline = self.scheduler.now() + by;
        while let Some(due) = self.scheduler.pop_due(deadline) {
            if due.generation != self.round.generation() {
                tracing::trace!(generation = due.generation, "dropping stale task");
                continue;
            }
            self.run(due.task);
        }
        self.scheduler.advance_to(deadline);
    }

    fn run(&mut self, task: Deferred) {
        match task {
            Deferred::ResolvePair => self.resolve_pair(),
            Deferred::HideHint(cards) => self.hide_hint(&cards),
            Deferred::Tick => self.tick(),
        }
    }

    fn resolve_pair(&mut self) {
        let elapsed = self.elapsed_seconds();
        let Some(resolution) = self.round.resolve_pair(elapsed) else {
            return;
        };

        match resolution {
            Resolution::Mismatched { first, second } => {
                for id in [first, second] {
                    self.emit(GameEvent::CardChanged {
                        id,
                        state: CardState::Hidden,
                    });
                }
                self.cue(SoundCue::Miss);
            }
            Resolution::Matched {
                first,
                second,
                points,
                completion,
            } => {
                for id in [first, second] {
                    self.emit(GameEvent::CardChanged {
                        id,
                        state: CardState::Matched,
                    });
                }
                tracing::debug!(points, score = self.round.score(), "pair matched");
                self.emit(GameEvent::ScoreChanged {
                    score: self.round.score(),
                });
                self.cue(SoundCue::Match);
                if let Some(completion) = completion {
                    self.finish(completion);
                }
            }
        }
    }

    fn finish(&mut self, completion: Completion) {
        self.timer.stop(self.scheduler.now());
        let difficulty = self.round.difficulty();
        let formatted_time = format_mm_ss(completion.elapsed_seconds);
        let is_new_high_score = self.ledger.submit(
            &mut self.store,
            difficulty,
            completion.final_score,
            completion.moves,
            &formatted_time,
        );

        let result = RoundResult {
            difficulty,
            final_score: completion.final_score,
            moves: completion.moves,
            formatted_time,
            is_new_high_score,
        };
        tracing::info!(
            %difficulty,
            score = result.final_score,
            moves = result.moves,
            time = %result.formatted_time,
            is_new_high_score,
            "round complete"
        );
        self.emit(GameEvent::RoundComplete(result.clone()));
        self.cue(SoundCue::Complete);
        self.last_result = Some(result);
    }

    fn hide_hint(&mut self, cards: &[CardId; 2]) {
        for id in self.round.end_hint(cards) {
            self.emit(GameEvent::CardChanged {
                id,
                state: CardState::Hidden,
            });
        }
        self.emit(GameEvent::HintHidden {
            cards: cards.to_vec(),
        });
    }

    fn tick(&mut self) {
        if self.round.is_complete() {
            return;
        }
        self.schedule(self.config.tick_interval, Deferred::Tick);
        if self.round.is_paused() {
            return;
        }
        let secs = self.elapsed_seconds();
        if secs != self.round.elapsed_seconds() {
            self.round.set_elapsed_seconds(secs);
            self.emit(GameEvent::TimeChanged {
                elapsed_seconds: secs,
                formatted: format_mm_ss(secs),
            });
        }
    }

    fn start_clock(&mut self) {
        self.timer.start(self.scheduler.now());
        self.schedule(self.config.tick_interval, Deferred::Tick);
    }

    fn schedule(&mut self, delay: Duration, task: Deferred) {
        self.scheduler.schedule(delay, self.round.generation(), task);
    }

    fn announce_round(&mut self) {
        self.emit(GameEvent::RoundStarted {
            difficulty: self.round.difficulty(),
            pairs: self.round.pair_count(),
        });
        self.emit(GameEvent::ScoreChanged { score: 0 });
        self.emit(GameEvent::MovesChanged { moves: 0 });
        self.emit(GameEvent::TimeChanged {
            elapsed_seconds: 0,
            formatted: format_mm_ss(0),
        });
    }

    fn cue(&mut self, cue: SoundCue) {
        let settings = self.settings.get();
        if settings.sound_enabled {
            let volume = settings.volume_percent;
            self.emit(GameEvent::Sound { cue, volume });
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

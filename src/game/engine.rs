//! The sequence engine.
//!
//! Owns the game session, the target pattern and the player's input buffer.
//! Time is cooperative: the host calls [`SequenceEngine::advance`] with the
//! elapsed time since launch and every timer that has come due fires in
//! deadline order. Nothing blocks, so the host stays responsive while a
//! pattern is being replayed.
//!
//! Every timer carries the generation of the session that armed it. Starting
//! a new game bumps the generation, and timers left over from an earlier
//! session are dropped when they come due.

use super::playback::{Cue, PlaybackScript};
use super::{Rng, Signal, ROUND_PAUSE};
use crate::prefs::PreferencesStore;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

/// Where the engine is in the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No game running.
    #[default]
    Idle,
    /// Replaying the pattern, or pausing before the next replay.
    Playback,
    /// Waiting for the player to reproduce the pattern.
    InputWait,
}

/// Level and score of the current (or last) game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameSession {
    /// Current level; 0 when idle.
    pub level: u32,
    /// Completed levels. After a game over this holds the final score.
    pub score: u32,
    phase: Phase,
}

impl GameSession {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a game is in progress.
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Whether the pattern is being replayed (input is rejected).
    pub fn is_playing_back(&self) -> bool {
        self.phase == Phase::Playback
    }

    /// Whether player input is accepted right now.
    pub fn accepts_input(&self) -> bool {
        self.is_active() && !self.is_playing_back()
    }
}

/// Notifications for the display and audio collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    SignalActivated(Signal),
    SignalDeactivated(Signal),
    LevelChanged(u32),
    ScoreChanged(u32),
    /// Playback finished; the player may start entering the pattern.
    AwaitingInput,
    GameOver {
        final_score: u32,
        high_score: u32,
        new_high_score: bool,
    },
}

/// Result of forwarding a selected signal to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Input is not being accepted right now; nothing changed.
    Ignored,
    /// Correct so far, more signals expected.
    Accepted,
    /// The whole pattern was reproduced. The next round starts after a pause.
    RoundComplete,
    /// Wrong signal; the game is over.
    Mismatch { expected: Signal, got: Signal },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerAction {
    /// Extend the pattern and replay it.
    NextRound,
    /// Apply one playback cue.
    Playback(Cue),
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    due: Duration,
    /// Insertion order, breaks ties between timers due at the same instant.
    seq: u64,
    generation: u64,
    action: TimerAction,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// The Simon game loop.
pub struct SequenceEngine {
    session: GameSession,
    pattern: Vec<Signal>,
    input: Vec<Signal>,
    rng: Rng,
    prefs: Box<dyn PreferencesStore>,
    /// Playback steps not yet armed for the current round.
    script: Option<PlaybackScript>,
    timers: BinaryHeap<Reverse<Timer>>,
    next_seq: u64,
    generation: u64,
    /// Engine clock, as last passed to `advance`.
    now: Duration,
    events: Vec<GameEvent>,
}

impl SequenceEngine {
    /// Creates an idle engine.
    ///
    /// # Arguments
    ///
    /// * `rng` - Source of new signals
    /// * `prefs` - Store consulted for the high score at game over
    pub fn new(rng: Rng, prefs: Box<dyn PreferencesStore>) -> Self {
        Self {
            session: GameSession::default(),
            pattern: Vec::new(),
            input: Vec::new(),
            rng,
            prefs,
            script: None,
            timers: BinaryHeap::new(),
            next_seq: 0,
            generation: 0,
            now: Duration::ZERO,
            events: Vec::new(),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// The target sequence for the current level.
    pub fn pattern(&self) -> &[Signal] {
        &self.pattern
    }

    /// What the player has entered so far this level.
    pub fn input(&self) -> &[Signal] {
        &self.input
    }

    /// Identifies the current session; bumped by every start and game over.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current engine time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn preferences(&self) -> &dyn PreferencesStore {
        self.prefs.as_ref()
    }

    pub fn preferences_mut(&mut self) -> &mut dyn PreferencesStore {
        self.prefs.as_mut()
    }

    /// Removes and returns all events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Deadline of the earliest pending timer, stale ones included.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.peek().map(|Reverse(t)| t.due)
    }

    /// Starts a new game, abandoning any game in progress.
    pub fn start_game(&mut self) {
        self.generation += 1;
        self.pattern.clear();
        self.input.clear();
        self.script = None;
        self.session.level = 0;
        self.session.score = 0;
        self.session.phase = Phase::Playback;
        self.emit(GameEvent::LevelChanged(0));
        self.emit(GameEvent::ScoreChanged(0));

        tracing::info!(generation = self.generation, "Game started");
        self.next_round();
    }

    /// Handles a signal chosen by the player.
    ///
    /// The entry is compared with the pattern at the same position as soon
    /// as it arrives.
    pub fn signal_selected(&mut self, signal: Signal) -> InputOutcome {
        if !self.session.accepts_input() {
            return InputOutcome::Ignored;
        }

        let index = self.input.len();
        self.input.push(signal);

        let expected = self.pattern[index];
        if expected != signal {
            self.game_over();
            return InputOutcome::Mismatch {
                expected,
                got: signal,
            };
        }

        if self.input.len() == self.pattern.len() {
            tracing::debug!(level = self.session.level, "Round complete");
            self.session.phase = Phase::Playback;
            self.schedule(self.now + ROUND_PAUSE, TimerAction::NextRound);
            InputOutcome::RoundComplete
        } else {
            InputOutcome::Accepted
        }
    }

    /// Moves the engine clock to `now`, firing every timer due by then.
    ///
    /// Timers fire at their own deadline, so follow-up timers are armed
    /// relative to when they were due rather than when `advance` happened to
    /// be called. A clock that goes backwards is ignored.
    pub fn advance(&mut self, now: Duration) {
        while let Some(Reverse(timer)) = self.timers.peek().copied() {
            if timer.due > now {
                break;
            }
            self.timers.pop();
            if timer.generation != self.generation {
                tracing::trace!(generation = timer.generation, "Dropping stale timer");
                continue;
            }
            self.now = self.now.max(timer.due);
            self.fire(timer.action);
        }
        self.now = self.now.max(now);
    }

    fn fire(&mut self, action: TimerAction) {
        match action {
            TimerAction::NextRound => self.next_round(),
            TimerAction::Playback(Cue::Activate(signal)) => {
                self.emit(GameEvent::SignalActivated(signal));
                self.arm_next_step();
            }
            TimerAction::Playback(Cue::Deactivate(signal)) => {
                self.emit(GameEvent::SignalDeactivated(signal));
                self.arm_next_step();
            }
        }
    }

    /// Extends the pattern by one signal and starts replaying it.
    fn next_round(&mut self) {
        self.input.clear();
        self.session.level += 1;
        self.session.score = self.session.level - 1;
        self.session.phase = Phase::Playback;
        self.emit(GameEvent::LevelChanged(self.session.level));
        self.emit(GameEvent::ScoreChanged(self.session.score));

        let signal = self.rng.next_signal();
        self.pattern.push(signal);
        tracing::debug!(level = self.session.level, %signal, "Extended pattern");

        self.script = Some(PlaybackScript::new(&self.pattern));
        self.arm_next_step();
    }

    /// Arms a timer for the next playback step, or opens input when the
    /// script is exhausted.
    fn arm_next_step(&mut self) {
        match self.script.as_mut().and_then(|script| script.next()) {
            Some(step) => {
                self.schedule(self.now + step.delay, TimerAction::Playback(step.cue));
            }
            None => {
                self.script = None;
                self.session.phase = Phase::InputWait;
                self.emit(GameEvent::AwaitingInput);
            }
        }
    }

    fn game_over(&mut self) {
        let final_score = self.session.score;
        let previous_high = self.prefs.high_score();
        let new_high_score = final_score > previous_high;
        if new_high_score {
            if let Err(e) = self.prefs.set_high_score(final_score) {
                tracing::warn!("Failed to save high score: {}", e);
            }
        }
        let high_score = previous_high.max(final_score);

        tracing::info!(final_score, high_score, "Game over");
        self.emit(GameEvent::GameOver {
            final_score,
            high_score,
            new_high_score,
        });

        self.generation += 1;
        self.pattern.clear();
        self.input.clear();
        self.script = None;
        self.session.level = 0;
        self.session.phase = Phase::Idle;
    }

    fn schedule(&mut self, due: Duration, action: TimerAction) {
        let timer = Timer {
            due,
            seq: self.next_seq,
            generation: self.generation,
            action,
        };
        self.next_seq += 1;
        self.timers.push(Reverse(timer));
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{playback_duration, INITIAL_DELAY};
    use crate::prefs::{MemoryPreferences, Preferences};

    const SEED: u128 = 0x5eed;

    fn engine_with_high_score(high_score: u32) -> SequenceEngine {
        let prefs = MemoryPreferences::new(Preferences {
            high_score,
            ..Preferences::default()
        });
        SequenceEngine::new(Rng::new_with_seed(SEED), Box::new(prefs))
    }

    fn engine() -> SequenceEngine {
        engine_with_high_score(0)
    }

    /// Advances past the current playback so input is accepted.
    fn finish_playback(engine: &mut SequenceEngine) {
        let end = engine.now() + playback_duration(engine.pattern().len());
        engine.advance(end);
        assert_eq!(engine.session().phase(), Phase::InputWait);
    }

    /// Replays the pattern and waits for the next round's playback to end.
    fn clear_round(engine: &mut SequenceEngine) {
        let pattern = engine.pattern().to_vec();
        let mut last = InputOutcome::Ignored;
        for signal in pattern {
            last = engine.signal_selected(signal);
        }
        assert_eq!(last, InputOutcome::RoundComplete);
        engine.advance(engine.now() + ROUND_PAUSE);
        finish_playback(engine);
    }

    fn wrong(signal: Signal) -> Signal {
        Signal::from_index((signal.index() + 1) % 4).unwrap()
    }

    #[test]
    fn test_new_engine_is_idle() {
        let engine = engine();
        assert_eq!(engine.session().phase(), Phase::Idle);
        assert!(!engine.session().is_active());
        assert!(engine.pattern().is_empty());
    }

    #[test]
    fn test_input_ignored_when_idle() {
        let mut engine = engine();
        assert_eq!(engine.signal_selected(Signal::Red), InputOutcome::Ignored);
        assert!(engine.input().is_empty());
    }

    #[test]
    fn test_start_generates_first_signal() {
        let mut engine = engine();
        engine.start_game();

        assert_eq!(engine.pattern().len(), 1);
        assert_eq!(engine.session().level, 1);
        assert_eq!(engine.session().score, 0);
        assert!(engine.session().is_playing_back());
        assert_eq!(
            engine.take_events(),
            vec![
                GameEvent::LevelChanged(0),
                GameEvent::ScoreChanged(0),
                GameEvent::LevelChanged(1),
                GameEvent::ScoreChanged(0),
            ]
        );
    }

    #[test]
    fn test_playback_timing() {
        let mut engine = engine();
        engine.start_game();
        let first = engine.pattern()[0];
        engine.take_events();

        engine.advance(INITIAL_DELAY - Duration::from_millis(1));
        assert!(engine.take_events().is_empty());

        engine.advance(INITIAL_DELAY);
        assert_eq!(engine.take_events(), vec![GameEvent::SignalActivated(first)]);
        assert!(engine.session().is_playing_back());

        engine.advance(Duration::from_millis(799));
        assert!(engine.take_events().is_empty());

        engine.advance(Duration::from_millis(800));
        assert_eq!(
            engine.take_events(),
            vec![GameEvent::SignalDeactivated(first), GameEvent::AwaitingInput]
        );
        assert!(engine.session().accepts_input());
    }

    #[test]
    fn test_input_rejected_during_playback() {
        let mut engine = engine();
        engine.start_game();
        engine.advance(INITIAL_DELAY);

        let first = engine.pattern()[0];
        assert_eq!(engine.signal_selected(first), InputOutcome::Ignored);
        assert!(engine.input().is_empty());
    }

    #[test]
    fn test_one_big_advance_replays_everything_in_order() {
        let mut engine = engine();
        engine.start_game();
        finish_playback(&mut engine);
        clear_round(&mut engine);
        engine.take_events();

        let pattern = engine.pattern().to_vec();
        for signal in &pattern {
            engine.signal_selected(*signal);
        }
        engine.advance(engine.now() + Duration::from_secs(60));

        let cues: Vec<GameEvent> = engine
            .take_events()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    GameEvent::SignalActivated(_) | GameEvent::SignalDeactivated(_)
                )
            })
            .collect();
        let pattern = engine.pattern().to_vec();
        assert_eq!(pattern.len(), 3);
        let expected: Vec<GameEvent> = pattern
            .iter()
            .flat_map(|s| [GameEvent::SignalActivated(*s), GameEvent::SignalDeactivated(*s)])
            .collect();
        assert_eq!(cues, expected);
    }

    #[test]
    fn test_replaying_pattern_completes_round() {
        let mut engine = engine();
        engine.start_game();
        finish_playback(&mut engine);

        let first = engine.pattern()[0];
        assert_eq!(engine.signal_selected(first), InputOutcome::RoundComplete);
        assert!(engine.session().is_playing_back());

        // Nothing changes until the pause has elapsed.
        engine.advance(engine.now() + ROUND_PAUSE - Duration::from_millis(1));
        assert_eq!(engine.pattern().len(), 1);

        engine.advance(engine.now() + Duration::from_millis(1));
        assert_eq!(engine.pattern().len(), 2);
        assert_eq!(engine.pattern()[0], first);
        assert_eq!(engine.session().level, 2);
        assert_eq!(engine.session().score, 1);
        assert!(engine.input().is_empty());
    }

    #[test]
    fn test_input_rejected_during_round_pause() {
        let mut engine = engine();
        engine.start_game();
        finish_playback(&mut engine);

        let first = engine.pattern()[0];
        engine.signal_selected(first);
        assert_eq!(engine.signal_selected(first), InputOutcome::Ignored);
        assert_eq!(engine.input().len(), 1);
    }

    #[test]
    fn test_pattern_grows_by_one_per_round() {
        let mut engine = engine();
        engine.start_game();
        finish_playback(&mut engine);

        for level in 1..10 {
            assert_eq!(engine.pattern().len(), level);
            assert_eq!(engine.session().score, level as u32 - 1);
            let before = engine.pattern().to_vec();
            clear_round(&mut engine);
            assert_eq!(&engine.pattern()[..level], &before[..]);
        }
    }

    #[test]
    fn test_input_never_exceeds_pattern() {
        let mut engine = engine();
        engine.start_game();
        let mut t = Duration::ZERO;
        // Hammer the engine with input at every tick across several rounds.
        for i in 0..2000u32 {
            t += Duration::from_millis(50);
            engine.advance(t);
            let signal = if engine.session().accepts_input() {
                engine.pattern()[engine.input().len()]
            } else {
                Signal::from_index((i % 4) as usize).unwrap()
            };
            engine.signal_selected(signal);
            assert!(engine.input().len() <= engine.pattern().len());
        }
        assert!(engine.session().level > 5);
    }

    #[test]
    fn test_mismatch_ends_game_with_pre_round_score() {
        let mut engine = engine();
        engine.start_game();
        finish_playback(&mut engine);
        clear_round(&mut engine);
        clear_round(&mut engine);
        assert_eq!(engine.session().score, 2);

        let pattern = engine.pattern().to_vec();
        engine.signal_selected(pattern[0]);
        engine.take_events();

        let outcome = engine.signal_selected(wrong(pattern[1]));
        assert_eq!(
            outcome,
            InputOutcome::Mismatch {
                expected: pattern[1],
                got: wrong(pattern[1])
            }
        );
        assert_eq!(engine.session().score, 2);
        assert_eq!(engine.session().phase(), Phase::Idle);
        assert_eq!(engine.session().level, 0);
        assert!(engine.pattern().is_empty());
        assert_eq!(
            engine.take_events(),
            vec![GameEvent::GameOver {
                final_score: 2,
                high_score: 2,
                new_high_score: true
            }]
        );
        assert_eq!(engine.preferences().high_score(), 2);
    }

    #[test]
    fn test_mismatch_on_first_entry() {
        let mut engine = engine();
        engine.start_game();
        finish_playback(&mut engine);

        let first = engine.pattern()[0];
        assert!(matches!(
            engine.signal_selected(wrong(first)),
            InputOutcome::Mismatch { .. }
        ));
        assert_eq!(engine.session().score, 0);
    }

    #[test]
    fn test_high_score_kept_when_not_beaten() {
        let mut engine = engine_with_high_score(5);
        engine.start_game();
        finish_playback(&mut engine);
        clear_round(&mut engine);

        let first = engine.pattern()[0];
        engine.take_events();
        engine.signal_selected(wrong(first));

        assert_eq!(
            engine.take_events(),
            vec![GameEvent::GameOver {
                final_score: 1,
                high_score: 5,
                new_high_score: false
            }]
        );
        assert_eq!(engine.preferences().high_score(), 5);
    }

    #[test]
    fn test_two_round_scenario() {
        let mut engine = engine_with_high_score(0);
        engine.start_game();
        finish_playback(&mut engine);

        let a = engine.pattern()[0];
        assert_eq!(engine.signal_selected(a), InputOutcome::RoundComplete);
        engine.advance(engine.now() + ROUND_PAUSE);
        assert_eq!(engine.session().level, 2);
        assert_eq!(engine.session().score, 1);
        finish_playback(&mut engine);

        let b = engine.pattern()[1];
        assert_eq!(engine.signal_selected(a), InputOutcome::Accepted);
        engine.take_events();
        engine.signal_selected(wrong(b));
        assert_eq!(
            engine.take_events(),
            vec![GameEvent::GameOver {
                final_score: 1,
                high_score: 1,
                new_high_score: true
            }]
        );
    }

    #[test]
    fn test_same_seed_same_patterns() {
        let mut a = engine();
        let mut b = engine();
        a.start_game();
        b.start_game();
        finish_playback(&mut a);
        finish_playback(&mut b);
        for _ in 0..6 {
            clear_round(&mut a);
            clear_round(&mut b);
        }
        assert_eq!(a.pattern(), b.pattern());
    }

    #[test]
    fn test_restart_drops_stale_timers() {
        let mut engine = engine();
        engine.start_game();
        finish_playback(&mut engine);
        let first = engine.pattern()[0];
        engine.signal_selected(first);
        let old_generation = engine.generation();

        // Restart while the round pause timer is still pending.
        engine.advance(engine.now() + Duration::from_millis(200));
        engine.start_game();
        assert!(engine.generation() > old_generation);
        assert_eq!(engine.pattern().len(), 1);

        // Past the old pause deadline: the stale NextRound must not fire.
        engine.advance(engine.now() + ROUND_PAUSE);
        assert_eq!(engine.pattern().len(), 1);
        assert_eq!(engine.session().level, 1);
        assert_eq!(engine.session().phase(), Phase::InputWait);
    }

    #[test]
    fn test_restart_during_playback() {
        let mut engine = engine();
        engine.start_game();
        finish_playback(&mut engine);
        clear_round(&mut engine);
        let pattern = engine.pattern().to_vec();
        for s in &pattern {
            engine.signal_selected(*s);
        }
        engine.advance(engine.now() + ROUND_PAUSE + INITIAL_DELAY);
        assert!(engine.session().is_playing_back());

        engine.start_game();
        engine.take_events();
        engine.advance(engine.now() + Duration::from_secs(10));

        let activations = engine
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::SignalActivated(_)))
            .count();
        assert_eq!(activations, 1);
        assert_eq!(engine.pattern().len(), 1);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut engine = engine();
        engine.advance(Duration::from_secs(5));
        engine.advance(Duration::from_secs(1));
        assert_eq!(engine.now(), Duration::from_secs(5));
    }
}

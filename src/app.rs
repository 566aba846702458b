//! Application state and event handling.
//!
//! This module defines the main application state that coordinates between
//! the sequence engine, the audio engine and the TUI. It plays the part of
//! the display and input collaborators: key presses and clicks become engine
//! calls, and engine events become lit pads and sounds.

use crate::audio::{AudioEngine, ToneId};
use crate::game::{GameEvent, InputOutcome, SequenceEngine, Signal};
use crate::prefs::{PreferencesStore, Theme};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::Rect;
use std::time::{Duration, Instant};

/// How long a pad stays lit after the player presses it.
pub const PRESS_FLASH: Duration = Duration::from_millis(150);

/// How long the board border flashes after a game over.
pub const GAME_OVER_FLASH: Duration = Duration::from_millis(500);

/// How long status messages stay on screen.
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Volume change per key press.
pub const VOLUME_STEP: f32 = 0.1;

/// Longest wait for input between frames.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// State for the game-over dialog.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameOverDialogState {
    /// Whether the dialog is open.
    pub open: bool,
    /// Score of the game that just ended.
    pub final_score: u32,
    /// Best score after that game.
    pub high_score: u32,
    /// Whether the game set a new high score.
    pub new_high_score: bool,
}

/// Layout regions for mouse hit testing.
/// Stores the screen coordinates of each pad and the open dialog.
#[derive(Debug, Clone, Default)]
pub struct LayoutRegions {
    /// Pad areas, paired with the signal each one shows.
    pub pads: Vec<(Signal, Rect)>,
    /// Area of the game-over dialog, when open.
    pub dialog: Option<Rect>,
}

impl LayoutRegions {
    /// Returns the signal whose pad contains the given screen coordinates.
    pub fn pad_at(&self, x: u16, y: u16) -> Option<Signal> {
        self.pads
            .iter()
            .find(|(_, rect)| contains(*rect, x, y))
            .map(|(signal, _)| *signal)
    }

    /// Checks if a point is within the dialog.
    pub fn is_in_dialog(&self, x: u16, y: u16) -> bool {
        self.dialog.is_some_and(|rect| contains(rect, x, y))
    }
}

/// Checks if a point is within a rectangle.
fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// Main application state.
pub struct App {
    /// The game loop.
    pub engine: SequenceEngine,
    /// Sound output.
    pub audio: AudioEngine,
    /// Reference point for the engine clock.
    started_at: Instant,
    /// Level as last reported by the engine.
    pub level: u32,
    /// Score as last reported by the engine.
    pub score: u32,
    /// Pad currently lit by playback.
    pub lit_signal: Option<Signal>,
    /// Pad pressed by the player, and when.
    pressed: Option<(Signal, Instant)>,
    /// When the last game ended, for the border flash.
    game_over_at: Option<Instant>,
    /// Status message to display.
    pub status_message: Option<(String, Instant)>,
    /// Game-over dialog state.
    pub game_over_dialog: GameOverDialogState,
    /// Whether the help overlay is visible.
    pub show_help: bool,
    /// Color theme.
    pub theme: Theme,
    /// Layout regions for mouse hit testing (updated each frame).
    pub layout: LayoutRegions,
}

impl App {
    /// Creates the application around an idle engine.
    ///
    /// Mute, volume and theme are taken from the engine's preferences.
    pub fn new(engine: SequenceEngine, mut audio: AudioEngine) -> Self {
        let prefs = engine.preferences();
        audio.set_muted(prefs.muted());
        audio.set_volume(prefs.volume());
        let theme = prefs.theme();

        Self {
            engine,
            audio,
            started_at: Instant::now(),
            level: 0,
            score: 0,
            lit_signal: None,
            pressed: None,
            game_over_at: None,
            status_message: None,
            game_over_dialog: GameOverDialogState::default(),
            show_help: false,
            theme,
            layout: LayoutRegions::default(),
        }
    }

    /// The instant the engine clock counts from.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Sets a status message to display temporarily.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Runs due timers and applies their events. Call once per frame.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// Same as [`App::update`] with an explicit current time.
    pub fn update_at(&mut self, now: Instant) {
        self.sync_clock(now);
        self.process_events(now);

        if let Some((_, at)) = self.pressed {
            if now.saturating_duration_since(at) >= PRESS_FLASH {
                self.pressed = None;
            }
        }
        if let Some(at) = self.game_over_at {
            if now.saturating_duration_since(at) >= GAME_OVER_FLASH {
                self.game_over_at = None;
            }
        }
        if let Some((_, at)) = &self.status_message {
            if now.saturating_duration_since(*at) > STATUS_TIMEOUT {
                self.status_message = None;
            }
        }
    }

    /// How long the event loop may block before the next frame.
    ///
    /// Shorter than [`FRAME_INTERVAL`] when a playback timer is due sooner.
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.started_at);
        match self.engine.next_deadline() {
            Some(due) => due.saturating_sub(elapsed).min(FRAME_INTERVAL),
            None => FRAME_INTERVAL,
        }
    }

    fn sync_clock(&mut self, now: Instant) {
        self.engine
            .advance(now.saturating_duration_since(self.started_at));
    }

    fn process_events(&mut self, now: Instant) {
        for event in self.engine.take_events() {
            match event {
                GameEvent::SignalActivated(signal) => {
                    self.lit_signal = Some(signal);
                    self.audio.play(signal.into());
                }
                GameEvent::SignalDeactivated(_) => {
                    self.lit_signal = None;
                }
                GameEvent::LevelChanged(level) => self.level = level,
                GameEvent::ScoreChanged(score) => self.score = score,
                GameEvent::AwaitingInput => {
                    self.set_status("Your turn");
                }
                GameEvent::GameOver {
                    final_score,
                    high_score,
                    new_high_score,
                } => {
                    self.audio.play(ToneId::Failure);
                    self.lit_signal = None;
                    self.game_over_at = Some(now);
                    self.game_over_dialog = GameOverDialogState {
                        open: true,
                        final_score,
                        high_score,
                        new_high_score,
                    };
                    if new_high_score {
                        self.set_status(format!("New high score: {}", final_score));
                    } else {
                        self.set_status(format!("Game over! Score: {}", final_score));
                    }
                }
            }
        }
    }

    /// Starts a new game, abandoning any game in progress.
    pub fn start_game(&mut self) {
        self.start_game_at(Instant::now());
    }

    pub fn start_game_at(&mut self, now: Instant) {
        self.sync_clock(now);
        self.game_over_dialog.open = false;
        self.lit_signal = None;
        self.pressed = None;
        self.engine.start_game();
        self.process_events(now);
        self.set_status("Watch the sequence");
    }

    /// Starts a game if none is running. Returns whether one was started.
    pub fn start_if_idle(&mut self) -> bool {
        if self.engine.session().is_active() || self.game_over_dialog.open {
            return false;
        }
        self.start_game();
        true
    }

    /// Forwards a pad press to the engine.
    pub fn select_signal(&mut self, signal: Signal) -> InputOutcome {
        self.select_signal_at(signal, Instant::now())
    }

    pub fn select_signal_at(&mut self, signal: Signal, now: Instant) -> InputOutcome {
        self.sync_clock(now);
        let outcome = self.engine.signal_selected(signal);
        if outcome != InputOutcome::Ignored {
            self.audio.play(signal.into());
            self.pressed = Some((signal, now));
        }
        self.process_events(now);
        outcome
    }

    /// Whether a pad should be drawn lit.
    pub fn is_lit(&self, signal: Signal) -> bool {
        self.lit_signal == Some(signal) || matches!(self.pressed, Some((s, _)) if s == signal)
    }

    /// Whether the game-over flash is showing.
    pub fn is_flashing_game_over(&self) -> bool {
        self.game_over_at.is_some()
    }

    /// Title shown above the board.
    pub fn level_title(&self) -> String {
        if self.engine.session().is_active() {
            format!("Level {}", self.level)
        } else {
            "Press Any Key to Start".to_string()
        }
    }

    pub fn high_score(&self) -> u32 {
        self.engine.preferences().high_score()
    }

    /// Closes the game-over dialog.
    pub fn close_game_over_dialog(&mut self) {
        self.game_over_dialog.open = false;
    }

    /// Toggles sound on and off and remembers the choice.
    pub fn toggle_mute(&mut self) {
        let muted = !self.audio.is_muted();
        self.audio.set_muted(muted);
        if let Err(e) = self.engine.preferences_mut().set_muted(muted) {
            tracing::warn!("Failed to save mute setting: {}", e);
        }
        self.set_status(if muted { "Sound off" } else { "Sound on" });
    }

    /// Changes the volume by `delta` and remembers it.
    pub fn adjust_volume(&mut self, delta: f32) {
        self.audio.set_volume(self.audio.volume() + delta);
        let volume = self.audio.volume();
        if let Err(e) = self.engine.preferences_mut().set_volume(volume) {
            tracing::warn!("Failed to save volume: {}", e);
        }
        self.set_status(format!("Volume: {}%", (volume * 100.0).round() as u32));
    }

    /// Switches between the light and dark theme and remembers it.
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(e) = self.engine.preferences_mut().set_theme(self.theme) {
            tracing::warn!("Failed to save theme: {}", e);
        }
    }

    /// Handles a key press. Returns true when the app should quit.
    ///
    /// The help overlay and the game-over dialog take keys first; otherwise
    /// pad keys select signals and any unbound key starts a game when idle.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match code {
            KeyCode::Char('c') if ctrl => return true,
            KeyCode::Char('q') => return true,
            _ => {}
        }

        if self.show_help {
            if matches!(code, KeyCode::Char('?') | KeyCode::Esc) {
                self.show_help = false;
            }
            return false;
        }

        if self.game_over_dialog.open {
            match code {
                KeyCode::Esc => self.close_game_over_dialog(),
                KeyCode::Char(' ') => self.start_game(),
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Char('r') | KeyCode::Char('R') if ctrl => {
                self.start_game();
                self.set_status("Restarted");
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('m') => self.toggle_mute(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_volume(VOLUME_STEP),
            KeyCode::Char('-') => self.adjust_volume(-VOLUME_STEP),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char(c) => {
                if !self.start_if_idle() {
                    if let Some(signal) = Signal::from_key(c) {
                        self.select_signal(signal);
                    }
                }
            }
            _ => {
                self.start_if_idle();
            }
        }
        false
    }

    /// Handles a left click at screen coordinates.
    ///
    /// Ignored while the help overlay is open. While the game-over dialog is
    /// open, a click outside it closes it. Otherwise a click on a pad selects
    /// that signal.
    pub fn handle_mouse_click(&mut self, x: u16, y: u16) {
        // The help overlay covers the board.
        if self.show_help {
            return;
        }
        if self.game_over_dialog.open {
            if !self.layout.is_in_dialog(x, y) {
                self.close_game_over_dialog();
            }
            return;
        }
        if let Some(signal) = self.layout.pad_at(x, y) {
            self.select_signal(signal);
        }
    }
}

use crate::telemetry::{TelemetrySink, TerminalRecord, WordRecord};
use crate::TICK_RATE_MS;
use chrono::Utc;
use std::time::{Duration, SystemTime};

const SUBTICKS_PER_SECOND: u32 = (1000 / TICK_RATE_MS) as u32;

/// Lifecycle of one puzzle session. The three terminal phases are mutually
/// exclusive; a session enters exactly one, exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Completed,
    TimedOut,
    Skipped,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::TimedOut | Phase::Skipped)
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Externally supplied session identity, opaque here.
    pub user: String,
    pub puzzle: String,
    /// Countdown length in seconds.
    pub seconds: u64,
}

/// Finite-state machine over the puzzle lifecycle: countdown, per-word
/// clock, aggregate counters, and telemetry emission.
///
/// The event loop delivers one sub-tick per `TICK_RATE_MS`; every
/// `SUBTICKS_PER_SECOND` of them advances the one-second countdown. Word
/// events arrive synchronously from the matcher via the owning game.
pub struct SessionController {
    config: SessionConfig,
    phase: Phase,
    remaining_seconds: u64,
    subticks: u32,
    words_in_puzzle: usize,
    total_words_remaining: usize,
    words_found: usize,
    words_skipped: usize,
    words_missing: usize,
    puzzles_skipped: usize,
    current_word_index: usize,
    started_at: Option<SystemTime>,
    word_started_at: Option<SystemTime>,
    word_elapsed_ms: u64,
    timers_active: bool,
    terminal_reached: bool,
    sinks: Vec<Box<dyn TelemetrySink>>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("phase", &self.phase)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("total_words_remaining", &self.total_words_remaining)
            .field("words_found", &self.words_found)
            .field("words_skipped", &self.words_skipped)
            .field("words_missing", &self.words_missing)
            .field("puzzles_skipped", &self.puzzles_skipped)
            .finish()
    }
}

impl SessionController {
    pub fn new(config: SessionConfig, total_words: usize) -> Self {
        let remaining_seconds = config.seconds;
        Self {
            config,
            phase: Phase::Idle,
            remaining_seconds,
            subticks: 0,
            words_in_puzzle: total_words,
            total_words_remaining: total_words,
            words_found: 0,
            words_skipped: 0,
            words_missing: 0,
            puzzles_skipped: 0,
            current_word_index: 0,
            started_at: None,
            word_started_at: None,
            word_elapsed_ms: 0,
            timers_active: false,
            terminal_reached: false,
            sinks: Vec::new(),
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn TelemetrySink>) {
        self.sinks.push(sink);
    }

    /// Idle -> Running. Arms both clocks. A session with no words at all is
    /// complete before it begins.
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }

        self.phase = Phase::Running;
        self.timers_active = true;
        let now = SystemTime::now();
        self.started_at = Some(now);
        self.word_started_at = Some(now);

        if self.total_words_remaining == 0 {
            self.enter_terminal(Phase::Completed);
        }
    }

    /// One 100ms sub-tick. Updates the per-word display clock; every tenth
    /// call advances the one-second countdown and runs the terminal checks
    /// in skip / complete / timeout order.
    pub fn on_tick(&mut self) {
        if self.phase != Phase::Running || !self.timers_active {
            return;
        }

        self.word_elapsed_ms = self.current_word_elapsed_ms();

        self.subticks += 1;
        if self.subticks < SUBTICKS_PER_SECOND {
            return;
        }
        self.subticks = 0;

        if self.puzzles_skipped > 0 {
            self.enter_terminal(Phase::Skipped);
        } else if self.total_words_remaining == 0 {
            self.enter_terminal(Phase::Completed);
        } else {
            self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
            if self.remaining_seconds == 0 {
                self.enter_terminal(Phase::TimedOut);
            }
        }
    }

    /// A committed path matched `word`. Emits the per-word record and, when
    /// the last word falls, completes the session.
    pub fn word_found(&mut self, word: &str) {
        if self.phase != Phase::Running {
            return;
        }

        self.words_found += 1;
        self.total_words_remaining = self.total_words_remaining.saturating_sub(1);
        self.emit_word(word, 0, 0);
        self.restart_word_clock();

        if self.total_words_remaining == 0 {
            self.enter_terminal(Phase::Completed);
        }
    }

    /// The user gave up on `word`. Counts toward skipped, not found; an
    /// all-skipped session still completes.
    pub fn skip_word(&mut self, word: &str) {
        if self.phase != Phase::Running {
            return;
        }

        self.words_skipped += 1;
        self.total_words_remaining = self.total_words_remaining.saturating_sub(1);
        self.emit_word(word, 1, 0);
        self.restart_word_clock();

        if self.total_words_remaining == 0 {
            self.enter_terminal(Phase::Completed);
        }
    }

    /// The user reported `word` as absent from the grid.
    pub fn flag_missing(&mut self, word: &str) {
        if self.phase != Phase::Running {
            return;
        }

        self.words_missing += 1;
        self.total_words_remaining = self.total_words_remaining.saturating_sub(1);
        self.emit_word(word, 0, 1);
        self.restart_word_clock();

        if self.total_words_remaining == 0 {
            self.enter_terminal(Phase::Completed);
        }
    }

    /// Abandons the whole puzzle.
    pub fn skip_puzzle(&mut self) {
        if self.phase != Phase::Running {
            return;
        }

        self.puzzles_skipped += 1;
        self.enter_terminal(Phase::Skipped);
    }

    /// The displayed target word changed; the per-word clock restarts.
    pub fn advance_word(&mut self, new_index: usize) {
        self.current_word_index = new_index;
        self.restart_word_clock();
    }

    /// Safe to call any number of times.
    pub fn cancel_timers(&mut self) {
        self.timers_active = false;
    }

    fn restart_word_clock(&mut self) {
        self.word_started_at = Some(SystemTime::now());
        self.word_elapsed_ms = 0;
    }

    fn current_word_elapsed_ms(&self) -> u64 {
        self.word_started_at
            .and_then(|t| t.elapsed().ok())
            .unwrap_or_default()
            .as_millis() as u64
    }

    /// The single funnel into a terminal phase. Guarded so duplicate tick
    /// firings or racing word events can never emit a second record.
    fn enter_terminal(&mut self, phase: Phase) {
        if self.terminal_reached {
            return;
        }

        self.terminal_reached = true;
        self.phase = phase;
        self.cancel_timers();

        let record = TerminalRecord {
            user: self.config.user.clone(),
            puzzle: self.config.puzzle.clone(),
            time: self.remaining_seconds,
            present_words_left: self.total_words_remaining,
            total_words_left: self.total_words_remaining,
            words_in_puzzle: self.words_in_puzzle,
            puzzle_skipped: self.puzzles_skipped,
            words_skipped: self.words_skipped,
            words_found: self.words_found,
            does_not_exist: self.words_missing,
            timestamp: Utc::now().timestamp_millis(),
        };

        for sink in &mut self.sinks {
            let _ = sink.post_terminal(&record);
        }
    }

    fn emit_word(&mut self, word: &str, skipped: u8, missing: u8) {
        let record = WordRecord {
            user: self.config.user.clone(),
            puzzle: self.config.puzzle.clone(),
            time: self.current_word_elapsed_ms(),
            word: word.to_string(),
            skipped,
            missing,
            timestamp: Utc::now().timestamp_millis(),
        };

        for sink in &mut self.sinks {
            let _ = sink.post_word(&record);
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn words_found(&self) -> usize {
        self.words_found
    }

    pub fn words_skipped(&self) -> usize {
        self.words_skipped
    }

    pub fn words_missing(&self) -> usize {
        self.words_missing
    }

    pub fn puzzles_skipped(&self) -> usize {
        self.puzzles_skipped
    }

    pub fn total_words_remaining(&self) -> usize {
        self.total_words_remaining
    }

    pub fn words_in_puzzle(&self) -> usize {
        self.words_in_puzzle
    }

    pub fn current_word_index(&self) -> usize {
        self.current_word_index
    }

    /// Per-word elapsed time as of the last sub-tick.
    pub fn word_elapsed_ms(&self) -> u64 {
        self.word_elapsed_ms
    }

    pub fn session_elapsed(&self) -> Duration {
        self.started_at
            .and_then(|t| t.elapsed().ok())
            .unwrap_or_default()
    }

    pub fn user(&self) -> &str {
        &self.config.user
    }

    pub fn puzzle_id(&self) -> &str {
        &self.config.puzzle
    }
}

use std::time::Duration;

use crate::session::SessionConfig;

const ONE_SECOND: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Words are on screen, nothing typed yet
    Idle,
    Running,
    /// Timed run hit zero
    Expired,
    /// Last word submitted
    Completed,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Expired | SessionStatus::Completed)
    }
}

/// How one character of a target word renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharState {
    Pending,
    Correct,
    Incorrect,
    /// Typed past the end of the word
    Extra,
}

/// Keystrokes the engine understands; everything else is filtered out upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Space,
    Backspace,
}

/// One-second countdown for timed runs, elapsed counter for word runs
#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    limit: Option<u64>,
    remaining: u64,
    elapsed: Duration,
    carry: Duration,
}

impl Timer {
    pub fn new(limit: Option<u64>) -> Self {
        Self {
            limit,
            remaining: limit.unwrap_or(0),
            elapsed: Duration::ZERO,
            carry: Duration::ZERO,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_countdown(&self) -> bool {
        self.limit.is_some()
    }

    /// Advance by `dt`; returns true once a countdown has reached zero
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.limit.is_some() && self.remaining == 0 {
            return true;
        }
        self.carry += dt;
        while self.carry >= ONE_SECOND {
            self.carry -= ONE_SECOND;
            self.elapsed += ONE_SECOND;
            if self.limit.is_some() {
                self.remaining = self.remaining.saturating_sub(1);
                if self.remaining == 0 {
                    self.carry = Duration::ZERO;
                    return true;
                }
            }
        }
        false
    }

    /// Elapsed time including the part of the current second already ticked
    pub fn precise_elapsed(&self) -> Duration {
        self.elapsed + self.carry
    }
}

/// Results of a run, computed from submitted words
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub wpm: u32,
    pub accuracy: u32,
    pub words: u32,
    pub correct_words: u32,
    pub errors: u32,
    pub elapsed_secs: f64,
}

/// The typing test state machine: idle -> running -> expired | completed
#[derive(Debug, Clone)]
pub struct TypingSession {
    config: SessionConfig,
    words: Vec<String>,
    /// What was typed for each word before `word_index`
    submitted: Vec<String>,
    word_index: usize,
    typed: String,
    errors: u32,
    status: SessionStatus,
    timer: Timer,
}

impl TypingSession {
    pub fn new(config: SessionConfig, words: Vec<String>) -> Self {
        Self {
            config,
            words,
            submitted: Vec::new(),
            word_index: 0,
            typed: String::new(),
            errors: 0,
            status: SessionStatus::Idle,
            timer: Timer::new(config.time_limit()),
        }
    }

    /// Back to the first word with a fresh timer; the word list stays
    pub fn reset(&mut self) {
        *self = Self::new(self.config, std::mem::take(&mut self.words));
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word_index(&self) -> usize {
        self.word_index
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn has_started(&self) -> bool {
        self.status != SessionStatus::Idle
    }

    pub fn has_finished(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.timer.remaining_secs()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.timer.elapsed().as_secs()
    }

    pub fn current_word(&self) -> &str {
        self.words.get(self.word_index).map_or("", String::as_str)
    }

    /// Apply one keystroke. Returns false when the key was ignored.
    pub fn handle(&mut self, input: KeyInput) -> bool {
        if self.status.is_terminal() || self.words.is_empty() {
            return false;
        }

        match input {
            KeyInput::Backspace => {
                if self.typed.pop().is_some() {
                    true
                } else if self.word_index > 0 {
                    self.word_index -= 1;
                    self.typed = self.submitted.pop().unwrap_or_default();
                    true
                } else {
                    false
                }
            }
            KeyInput::Space => {
                self.start();
                if self.typed != self.current_word() {
                    self.errors += 1;
                }
                self.submitted.push(std::mem::take(&mut self.typed));
                if self.word_index + 1 < self.words.len() {
                    self.word_index += 1;
                } else {
                    self.finish(SessionStatus::Completed);
                }
                true
            }
            KeyInput::Char(c) => {
                self.start();
                self.typed.push(c);
                true
            }
        }
    }

    fn start(&mut self) {
        if self.status == SessionStatus::Idle {
            self.status = SessionStatus::Running;
        }
    }

    fn finish(&mut self, status: SessionStatus) {
        self.status = status;
        log::info!(
            "session {:?} after {}s with {} errors",
            status,
            self.timer.elapsed().as_secs(),
            self.errors
        );
    }

    /// Drive the clock. Only a running session moves it.
    pub fn on_tick(&mut self, dt: Duration) {
        if self.status != SessionStatus::Running {
            return;
        }
        if self.timer.advance(dt) && self.timer.is_countdown() {
            self.finish(SessionStatus::Expired);
        }
    }

    /// Text entered for word `idx`: submitted, in progress, or nothing yet
    pub fn typed_for(&self, idx: usize) -> &str {
        if let Some(done) = self.submitted.get(idx) {
            done
        } else if idx == self.word_index {
            &self.typed
        } else {
            ""
        }
    }

    /// Per-character diff of word `idx` against what was typed for it
    pub fn char_states(&self, idx: usize) -> Vec<CharState> {
        match self.words.get(idx) {
            Some(target) => diff_word(target, self.typed_for(idx)),
            None => Vec::new(),
        }
    }

    /// Caret position inside the active word, if the session is still accepting input
    pub fn caret(&self) -> Option<(usize, usize)> {
        if self.status.is_terminal() || self.words.is_empty() {
            return None;
        }
        Some((self.word_index, self.typed.chars().count()))
    }

    /// Summary over everything submitted so far
    pub fn summary(&self) -> SessionSummary {
        let pairs = self.submitted.iter().zip(self.words.iter());
        let correct: Vec<&String> = pairs.filter(|(t, w)| t == w).map(|(_, w)| w).collect();
        let correct_words = correct.len() as u32;
        let words = self.submitted.len() as u32;

        // each correct word plus the space that submitted it
        let correct_chars: usize = correct.iter().map(|w| w.chars().count() + 1).sum();
        let elapsed = self.timer.precise_elapsed().as_secs_f64();
        let wpm = if elapsed > 0.0 {
            ((correct_chars as f64 / 5.0) / (elapsed / 60.0)).round() as u32
        } else {
            0
        };
        let accuracy = if words > 0 {
            ((correct_words as f64 / words as f64) * 100.0).round() as u32
        } else {
            0
        };

        SessionSummary {
            wpm,
            accuracy,
            words,
            correct_words,
            errors: self.errors,
            elapsed_secs: elapsed,
        }
    }
}

/// Compare `typed` against `target` position by position
pub fn diff_word(target: &str, typed: &str) -> Vec<CharState> {
    let mut typed_chars = typed.chars();
    let mut states: Vec<CharState> = target
        .chars()
        .map(|expected| match typed_chars.next() {
            None => CharState::Pending,
            Some(c) if c == expected => CharState::Correct,
            Some(_) => CharState::Incorrect,
        })
        .collect();
    states.extend(typed_chars.map(|_| CharState::Extra));
    states
}

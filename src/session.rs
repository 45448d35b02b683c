use serde::{Deserialize, Serialize};

pub const TIME_OPTIONS: [usize; 4] = [15, 30, 60, 120];
pub const WORDS_OPTIONS: [usize; 4] = [10, 25, 50, 100];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TestMode {
    Time,
    Words,
}

impl TestMode {
    pub fn icon(&self) -> &'static str {
        match self {
            TestMode::Time => "⏱",
            TestMode::Words => "A",
        }
    }

    pub fn options(&self) -> &'static [usize] {
        match self {
            TestMode::Time => &TIME_OPTIONS,
            TestMode::Words => &WORDS_OPTIONS,
        }
    }

    pub fn default_target(&self) -> usize {
        match self {
            TestMode::Time => 30,
            TestMode::Words => 25,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            TestMode::Time => TestMode::Words,
            TestMode::Words => TestMode::Time,
        }
    }
}

/// What the user picked in the mode bar: seconds for `time`, word count for `words`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub mode: TestMode,
    pub target: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: TestMode::Time,
            target: TestMode::Time.default_target(),
        }
    }
}

impl SessionConfig {
    /// Switching mode always lands on that mode's default target
    pub fn with_mode(mode: TestMode) -> Self {
        Self {
            mode,
            target: mode.default_target(),
        }
    }

    /// How many words to request. Timed runs size the list from settings.
    pub fn word_count(&self, words_per_test: usize) -> usize {
        match self.mode {
            TestMode::Time => words_per_test,
            TestMode::Words if self.target == 0 => TestMode::Words.default_target(),
            TestMode::Words => self.target,
        }
    }

    /// Seconds on the countdown, if this is a timed run
    pub fn time_limit(&self) -> Option<u64> {
        match self.mode {
            TestMode::Time => Some(self.target as u64),
            TestMode::Words => None,
        }
    }

    /// Step through the option row, wrapping at both ends
    pub fn cycle_target(&mut self, forward: bool) {
        let options = self.mode.options();
        let idx = options.iter().position(|o| *o == self.target);
        let next = match (idx, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % options.len(),
            (Some(i), false) => (i + options.len() - 1) % options.len(),
        };
        self.target = options[next];
    }

    /// Label stored with results, e.g. "Time (30s)" or "Words (25)"
    pub fn label(&self) -> String {
        match self.mode {
            TestMode::Time => format!("Time ({}s)", self.target),
            TestMode::Words => format!("Words ({})", self.target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_thirty_second_run() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.mode, TestMode::Time);
        assert_eq!(cfg.target, 30);
        assert_eq!(cfg.time_limit(), Some(30));
    }

    #[test]
    fn switching_mode_resets_target() {
        assert_eq!(SessionConfig::with_mode(TestMode::Words).target, 25);
        assert_eq!(SessionConfig::with_mode(TestMode::Time).target, 30);
        assert_eq!(TestMode::Words.toggled(), TestMode::Time);
    }

    #[test]
    fn word_count_per_mode() {
        let timed = SessionConfig::default();
        assert_eq!(timed.word_count(36), 36);

        let words = SessionConfig {
            mode: TestMode::Words,
            target: 50,
        };
        assert_eq!(words.word_count(36), 50);
        assert_eq!(words.time_limit(), None);

        let zero = SessionConfig {
            mode: TestMode::Words,
            target: 0,
        };
        assert_eq!(zero.word_count(36), 25);
    }

    #[test]
    fn cycle_target_wraps() {
        let mut cfg = SessionConfig::default();
        cfg.cycle_target(true);
        assert_eq!(cfg.target, 60);
        cfg.cycle_target(true);
        cfg.cycle_target(true);
        assert_eq!(cfg.target, 15);
        cfg.cycle_target(false);
        assert_eq!(cfg.target, 120);
    }

    #[test]
    fn labels() {
        assert_eq!(SessionConfig::default().label(), "Time (30s)");
        assert_eq!(SessionConfig::with_mode(TestMode::Words).label(), "Words (25)");
        assert_eq!(TestMode::Time.to_string(), "time");
    }
}

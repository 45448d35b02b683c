use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::export::{self, ExportError};
use crate::storage::{self, KeyValueStore, TYPING_SETTINGS};

pub const DEFAULT_WORDS_PER_TEST: usize = 36;
pub const MIN_WORDS_PER_TEST: usize = 1;
pub const MAX_WORDS_PER_TEST: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub key_sounds: bool,
    pub show_metrics: bool,
    pub words_per_test: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            key_sounds: true,
            show_metrics: true,
            words_per_test: DEFAULT_WORDS_PER_TEST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SettingsField {
    #[strum(to_string = "Key sounds")]
    KeySounds,
    #[strum(to_string = "Show metrics (WPM / Accuracy)")]
    ShowMetrics,
    #[strum(to_string = "Words per test")]
    WordsPerTest,
}

impl SettingsField {
    pub const ALL: [SettingsField; 3] = [
        SettingsField::KeySounds,
        SettingsField::ShowMetrics,
        SettingsField::WordsPerTest,
    ];
}

impl Settings {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut settings: Settings = storage::load_or(store, TYPING_SETTINGS, Settings::default());
        settings.words_per_test = clamp_words(settings.words_per_test);
        settings
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        storage::save(store, TYPING_SETTINGS, self);
        log::debug!("settings persisted: {self:?}");
    }

    pub fn set_words_per_test(&mut self, n: usize) {
        self.words_per_test = clamp_words(n);
    }

    pub fn adjust_words_per_test(&mut self, delta: isize) {
        let next = self.words_per_test.saturating_add_signed(delta);
        self.set_words_per_test(next);
    }

    pub fn toggle(&mut self, field: SettingsField) {
        match field {
            SettingsField::KeySounds => self.key_sounds = !self.key_sounds,
            SettingsField::ShowMetrics => self.show_metrics = !self.show_metrics,
            SettingsField::WordsPerTest => {}
        }
    }

    pub fn export_json(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        export::write_json(dir, "typing-settings.json", self)
    }

    /// `key,value` rows, every cell quoted; non-string values are written as JSON
    pub fn to_csv(&self) -> Result<String, ExportError> {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(vec![]);
        writer.write_record(["key", "value"])?;
        if let Value::Object(map) = serde_json::to_value(self)? {
            for (k, v) in map {
                let cell = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                writer.write_record([k.as_str(), cell.as_str()])?;
            }
        }
        let bytes = writer.into_inner().map_err(|e| {
            ExportError::Io(std::io::Error::new(e.error().kind(), e.error().to_string()))
        })?;
        Ok(String::from_utf8_lossy(&bytes).trim_end().to_string())
    }

    pub fn export_csv(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(dir)?;
        let path = dir.join("typing-settings.csv");
        fs::write(&path, self.to_csv()?)?;
        Ok(path)
    }
}

fn clamp_words(n: usize) -> usize {
    n.clamp(MIN_WORDS_PER_TEST, MAX_WORDS_PER_TEST)
}

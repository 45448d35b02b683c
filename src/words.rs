use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::runtime::AppEvent;

/// Shown when the word endpoint cannot be reached or returns garbage
pub const FALLBACK_WORDS: [&str; 3] = ["error", "loading", "words"];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum WordSourceError {
    #[error("word request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("word endpoint returned no words")]
    Empty,
}

/// Where candidate words come from
pub trait WordSource: Send + Sync {
    fn fetch(&self, count: usize) -> Result<Vec<String>, WordSourceError>;
}

/// GETs a JSON array of `{ "word": ... }` entries
pub struct HttpWordSource {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpWordSource {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, WordSourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

impl WordSource for HttpWordSource {
    fn fetch(&self, count: usize) -> Result<Vec<String>, WordSourceError> {
        let entries: Vec<Value> = self
            .client
            .get(&self.endpoint)
            .send()?
            .error_for_status()?
            .json()?;
        let words = pick_words(
            entries.iter().map(entry_to_word).collect(),
            count,
            &mut rand::thread_rng(),
        );
        if words.is_empty() {
            return Err(WordSourceError::Empty);
        }
        Ok(words)
    }
}

/// Fixed pool, still shuffled and trimmed like a remote list
pub struct StaticWordSource {
    words: Vec<String>,
}

impl StaticWordSource {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }
}

impl WordSource for StaticWordSource {
    fn fetch(&self, count: usize) -> Result<Vec<String>, WordSourceError> {
        let words = pick_words(self.words.clone(), count, &mut rand::thread_rng());
        if words.is_empty() {
            return Err(WordSourceError::Empty);
        }
        Ok(words)
    }
}

/// `{word: "x"}` -> "x"; bare strings pass through; anything else is stringified
fn entry_to_word(entry: &Value) -> String {
    match entry.get("word") {
        Some(Value::String(s)) => s.clone(),
        Some(v) if !v.is_null() => v.to_string(),
        _ => match entry {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

/// Uniform shuffle, then keep the first `count`
pub fn pick_words<R: Rng + ?Sized>(mut words: Vec<String>, count: usize, rng: &mut R) -> Vec<String> {
    words.shuffle(rng);
    words.truncate(count);
    words
}

pub fn fallback_words() -> Vec<String> {
    FALLBACK_WORDS.iter().map(|w| w.to_string()).collect()
}

/// Never fails: errors are logged and replaced with the placeholder list
pub fn load_words(source: &dyn WordSource, count: usize) -> Vec<String> {
    match source.fetch(count) {
        Ok(words) => {
            log::info!("loaded {} words", words.len());
            words
        }
        Err(e) => {
            log::error!("{e}");
            fallback_words()
        }
    }
}

/// Fire-and-forget fetch; the result comes back as `AppEvent::WordsLoaded`
pub fn spawn_fetch(
    source: Arc<dyn WordSource>,
    request_id: u64,
    count: usize,
    tx: Sender<AppEvent>,
) {
    thread::spawn(move || {
        let words = load_words(source.as_ref(), count);
        // receiver gone means the app is shutting down
        let _ = tx.send(AppEvent::WordsLoaded { request_id, words });
    });
}

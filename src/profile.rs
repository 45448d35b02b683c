use chrono::{DateTime, Duration, Local, NaiveDate};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::export::{self, ExportError};
use crate::storage::{self, KeyValueStore, PROFILE, TYPING_RESULTS};
use crate::util::mean;

pub const MAX_AVATAR_BYTES: u64 = 5 * 1024 * 1024;
pub const ITEMS_PER_PAGE: usize = 2;
pub const MAX_RECENT_ITEMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub name: String,
    pub username: String,
    pub bio: String,
    pub joined: DateTime<Local>,
    pub avatar_path: Option<PathBuf>,
    pub public: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Pizza".to_string(),
            username: "pizza_scores".to_string(),
            bio: "Type fast. Eat pizza.".to_string(),
            joined: Local::now(),
            avatar_path: None,
            public: true,
        }
    }
}

impl Profile {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        storage::load(store, PROFILE).unwrap_or_else(|| {
            // first visit: the default profile sticks, including its join date
            let profile = Profile::default();
            profile.save(store);
            profile
        })
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        storage::save(store, PROFILE, self);
    }

    pub fn initials(&self) -> String {
        let initials: String = self.name.chars().take(2).collect();
        if initials.is_empty() {
            "?".to_string()
        } else {
            initials.to_uppercase()
        }
    }

    pub fn joined_label(&self, now: DateTime<Local>) -> String {
        let days = (now.date_naive() - self.joined.date_naive()).num_days();
        let ago = match days {
            d if d <= 0 => "today".to_string(),
            1 => "yesterday".to_string(),
            d => format!("{d} days ago"),
        };
        format!("Joined {} ({ago})", self.joined.format("%Y-%m-%d"))
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("avatar file not found: {0}")]
    AvatarMissing(PathBuf),
    #[error("avatar too large ({0} bytes) - choose an image under 5MB")]
    AvatarTooLarge(u64),
}

/// One finished typing test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub date: DateTime<Local>,
    pub mode: String,
    #[serde(default)]
    pub wpm: u32,
    #[serde(default)]
    pub accuracy: u32,
    #[serde(default)]
    pub words: u32,
}

/// Shown until the first real result is recorded
pub fn sample_results(now: DateTime<Local>) -> Vec<TestResult> {
    vec![
        TestResult {
            date: now,
            mode: "Time (60s)".to_string(),
            wpm: 88,
            accuracy: 96,
            words: 300,
        },
        TestResult {
            date: now - Duration::days(1),
            mode: "Words (50)".to_string(),
            wpm: 75,
            accuracy: 92,
            words: 250,
        },
    ]
}

pub fn load_results(store: &dyn KeyValueStore) -> Option<Vec<TestResult>> {
    storage::load(store, TYPING_RESULTS)
}

/// Newest first
pub fn record_result(store: &dyn KeyValueStore, result: TestResult) {
    let mut results = load_results(store).unwrap_or_default();
    results.insert(0, result);
    storage::save(store, TYPING_RESULTS, &results);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub total_tests: usize,
    #[serde(rename = "bestWPM")]
    pub best_wpm: u32,
    pub avg_accuracy: u32,
    pub total_words: u64,
    pub longest_streak: usize,
}

impl ProfileStats {
    pub fn from_results(results: &[TestResult]) -> Self {
        let accuracies: Vec<f64> = results.iter().map(|r| r.accuracy as f64).collect();
        Self {
            total_tests: results.len(),
            best_wpm: results.iter().map(|r| r.wpm).max().unwrap_or(0),
            avg_accuracy: mean(&accuracies).map_or(0, |m| m.round() as u32),
            total_words: results.iter().map(|r| r.words as u64).sum(),
            longest_streak: longest_streak(results.iter().map(|r| r.date.date_naive())),
        }
    }
}

/// Longest run of consecutive calendar days that have at least one result
pub fn longest_streak<I: IntoIterator<Item = NaiveDate>>(dates: I) -> usize {
    let days: Vec<NaiveDate> = dates.into_iter().sorted().dedup().collect();
    if days.is_empty() {
        return 0;
    }

    let mut longest = 1;
    let mut current = 1;
    for (prev, next) in days.iter().tuple_windows() {
        if (*next - *prev).num_days() == 1 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    longest
}

/// Paging over the newest few results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentTests {
    pub page: usize,
}

impl RecentTests {
    pub fn visible(results: &[TestResult]) -> &[TestResult] {
        &results[..results.len().min(MAX_RECENT_ITEMS)]
    }

    pub fn total_pages(results: &[TestResult]) -> usize {
        Self::visible(results).len().div_ceil(ITEMS_PER_PAGE).max(1)
    }

    pub fn rows<'a>(&self, results: &'a [TestResult]) -> &'a [TestResult] {
        let visible = Self::visible(results);
        let start = (self.page * ITEMS_PER_PAGE).min(visible.len());
        let end = ((self.page + 1) * ITEMS_PER_PAGE).min(visible.len());
        &visible[start..end]
    }

    pub fn prev(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn next(&mut self, results: &[TestResult]) {
        self.page = (self.page + 1).min(Self::total_pages(results) - 1);
    }

    pub fn showing_label(&self, results: &[TestResult]) -> String {
        let visible = Self::visible(results).len();
        format!(
            "Showing {} of {}",
            visible.min((self.page + 1) * ITEMS_PER_PAGE),
            visible
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum EditField {
    #[strum(to_string = "Display name")]
    Name,
    Username,
    Bio,
    #[strum(to_string = "Avatar path")]
    Avatar,
}

impl EditField {
    pub const ALL: [EditField; 4] = [
        EditField::Name,
        EditField::Username,
        EditField::Bio,
        EditField::Avatar,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Working copy edited in the profile modal; committed only on save
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileEditor {
    pub draft: Profile,
    pub field: EditField,
    pub avatar_input: String,
    pub error: Option<String>,
}

impl ProfileEditor {
    pub fn new(profile: &Profile) -> Self {
        Self {
            draft: profile.clone(),
            field: EditField::Name,
            avatar_input: profile
                .avatar_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            error: None,
        }
    }

    fn field_mut(&mut self) -> &mut String {
        match self.field {
            EditField::Name => &mut self.draft.name,
            EditField::Username => &mut self.draft.username,
            EditField::Bio => &mut self.draft.bio,
            EditField::Avatar => &mut self.avatar_input,
        }
    }

    pub fn field_value(&self, field: EditField) -> &str {
        match field {
            EditField::Name => &self.draft.name,
            EditField::Username => &self.draft.username,
            EditField::Bio => &self.draft.bio,
            EditField::Avatar => &self.avatar_input,
        }
    }

    pub fn push(&mut self, c: char) {
        self.field_mut().push(c);
    }

    pub fn pop(&mut self) {
        self.field_mut().pop();
    }

    pub fn clear_avatar(&mut self) {
        self.avatar_input.clear();
        self.draft.avatar_path = None;
    }

    /// Validate the avatar input and produce the profile to persist
    pub fn commit(&mut self) -> Result<Profile, ProfileError> {
        let input = self.avatar_input.trim();
        self.draft.avatar_path = if input.is_empty() {
            None
        } else {
            Some(validate_avatar(Path::new(input))?)
        };
        Ok(self.draft.clone())
    }
}

pub fn validate_avatar(path: &Path) -> Result<PathBuf, ProfileError> {
    let meta =
        fs::metadata(path).map_err(|_| ProfileError::AvatarMissing(path.to_path_buf()))?;
    if !meta.is_file() {
        return Err(ProfileError::AvatarMissing(path.to_path_buf()));
    }
    if meta.len() > MAX_AVATAR_BYTES {
        return Err(ProfileError::AvatarTooLarge(meta.len()));
    }
    Ok(path.to_path_buf())
}

#[derive(Serialize)]
struct ProfileExport<'a> {
    profile: &'a Profile,
    stats: &'a ProfileStats,
}

pub fn export_profile(
    dir: &Path,
    profile: &Profile,
    stats: &ProfileStats,
) -> Result<PathBuf, ExportError> {
    export::write_json(dir, "profile-export.json", &ProfileExport { profile, stats })
}

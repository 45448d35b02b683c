use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

pub const DEFAULT_WORD_ENDPOINT: &str = "https://689c0e9858a27b18087cc9b2.mockapi.io/Words";
pub const DEFAULT_AUTH_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TICK_RATE_MS: u64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub word_endpoint: String,
    pub auth_base_url: String,
    pub tick_rate_ms: u64,
    pub data_dir: Option<PathBuf>,
    pub skip_landing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            word_endpoint: DEFAULT_WORD_ENDPOINT.to_string(),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            data_dir: None,
            skip_landing: false,
        }
    }
}

impl Config {
    /// Where the OAuth flow starts; the identity provider owns everything after it
    pub fn oauth_start_url(&self) -> String {
        format!("{}/api/auth/google", self.auth_base_url.trim_end_matches('/'))
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(AppDirs::data_dir)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("ignoring malformed config {}: {}", self.path.display(), e);
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

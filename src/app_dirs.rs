use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Directory holding the local storage documents (one JSON file per key)
    pub fn data_dir() -> PathBuf {
        ProjectDirs::from("", "", "typeslide")
            .map(|proj_dirs| proj_dirs.data_local_dir().join("storage"))
            .unwrap_or_else(|| PathBuf::from("typeslide_storage"))
    }

    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("typeslide"),
            )
        } else {
            ProjectDirs::from("", "", "typeslide")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("typeslide.log"))
            .unwrap_or_else(|| PathBuf::from("typeslide.log"))
    }

    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "typeslide")
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("typeslide_config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_is_named_after_app() {
        let path = AppDirs::log_path();
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("typeslide.log")
        );
    }

    #[test]
    fn config_path_is_json() {
        let path = AppDirs::config_path();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));
    }
}

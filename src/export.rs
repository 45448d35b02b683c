use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export io error: {0}")]
    Io(#[from] io::Error),
    #[error("export json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("export csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Pretty-print `value` to `dir/file_name`, creating `dir` if needed
pub fn write_json<T: Serialize>(
    dir: &Path,
    file_name: &str,
    value: &T,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, serde_json::to_vec_pretty(value)?)?;
    Ok(path)
}

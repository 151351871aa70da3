//! On-disk JSON snapshot of the store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{PdfDocument, Quiz, TestHistory, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub quizzes: Vec<Quiz>,
    #[serde(default)]
    pub history: Vec<TestHistory>,
    #[serde(default)]
    pub pdfs: Vec<PdfDocument>,
}

/// Load a snapshot, returning `None` when the file does not exist yet.
pub fn load(path: &Path) -> Result<Option<Snapshot>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Write a snapshot next to `path` and rename it into place.
pub fn save(path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(snapshot)?;
    let tmp = path.with_extension("tmp");

    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    fs::write(&tmp, json).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(write_err)
}

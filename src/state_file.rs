//! JSON state files backing the local provider and mapping store.
//!
//! A missing file reads as the default (empty) state. Writes go to a
//! sibling temporary file first and are renamed into place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateFileError {
    #[error("failed to access state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("state file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type StateFileResult<T> = Result<T, StateFileError>;

/// Read `path`, or `T::default()` if it does not exist yet.
pub fn load<T: DeserializeOwned + Default>(path: &Path) -> StateFileResult<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StateFileError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content).map_err(|source| StateFileError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `value` to `path`, creating parent directories as needed.
pub fn save<T: Serialize>(path: &Path, value: &T) -> StateFileResult<()> {
    let io_err = |source: io::Error| StateFileError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(value).map_err(|source| StateFileError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

//! Snapshot file persistence.
//!
//! The whole library lives in one JSON snapshot file. Loading a missing
//! file yields a fresh store; saving rewrites the file in full.

use circulate_engine::{library_store, Store, StoreError, StoreSnapshot};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors from reading or writing the snapshot file.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Snapshot { path: String, source: StoreError },
}

/// Load a store from the snapshot file, or start fresh when it is absent.
pub fn load_or_new(path: &Path) -> Result<Store, PersistError> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no snapshot file yet, starting empty");
        return Ok(library_store());
    }

    let raw = fs::read_to_string(path).map_err(|source| PersistError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let snapshot = StoreSnapshot::from_json(&raw).map_err(|source| PersistError::Snapshot {
        path: path.display().to_string(),
        source,
    })?;

    let mut store = library_store();
    store
        .import_state(snapshot)
        .map_err(|source| PersistError::Snapshot {
            path: path.display().to_string(),
            source,
        })?;

    tracing::info!(path = %path.display(), "snapshot loaded");
    Ok(store)
}

/// Write the store to the snapshot file.
pub fn save(store: &Store, path: &Path) -> Result<(), PersistError> {
    let json = store
        .export_state()
        .and_then(|snapshot| snapshot.to_json_pretty())
        .map_err(|source| PersistError::Snapshot {
            path: path.display().to_string(),
            source,
        })?;

    fs::write(path, json).map_err(|source| PersistError::Write {
        path: path.display().to_string(),
        source,
    })?;

    tracing::debug!(path = %path.display(), "snapshot written");
    Ok(())
}

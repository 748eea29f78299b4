//! Snapshot types for persisting and restoring store state.
//!
//! Snapshots are the bridge between the in-memory Store and a file on disk.
//! They are designed for deterministic serialization so the same state
//! always writes the same bytes.

use crate::error::{StoreError, StoreResult};
use crate::{RowKey, TableName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Persisted form of a single table: its id counter and rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    /// Id counter at snapshot time
    pub next_id: u64,
    /// Rows by key
    pub rows: BTreeMap<RowKey, serde_json::Value>,
}

/// A point-in-time snapshot of the store state.
///
/// This is the primary type for persisting store state to disk.
/// Uses BTreeMap instead of HashMap for deterministic serialization order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Snapshot format version
    pub format_version: u32,
    /// All tables by name
    pub tables: BTreeMap<TableName, TableSnapshot>,
}

impl StoreSnapshot {
    /// Create a new empty snapshot at the current format version.
    pub fn new() -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            tables: BTreeMap::new(),
        }
    }

    /// Add a table to the snapshot.
    pub fn add_table(
        &mut self,
        name: TableName,
        next_id: u64,
        rows: BTreeMap<RowKey, serde_json::Value>,
    ) {
        self.tables.insert(name, TableSnapshot { next_id, rows });
    }

    /// Get a raw row from the snapshot.
    pub fn get_row(&self, table: &str, key: &str) -> Option<&serde_json::Value> {
        self.tables.get(table)?.rows.get(key)
    }

    /// Count of tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Count total rows across all tables.
    pub fn row_count(&self) -> usize {
        self.tables.values().map(|t| t.rows.len()).sum()
    }

    /// Serialize to JSON with deterministic ordering.
    pub fn to_json(&self) -> StoreResult<String> {
        serde_json::to_string(self).map_err(|e| StoreError::InvalidSnapshot(e.to_string()))
    }

    /// Serialize to pretty JSON with deterministic ordering.
    pub fn to_json_pretty(&self) -> StoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| StoreError::InvalidSnapshot(e.to_string()))?;

        // Validate format version
        if snapshot.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(StoreError::InvalidSnapshot(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                snapshot.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        Ok(snapshot)
    }
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Metadata about a snapshot (without the full data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    /// Snapshot format version
    pub format_version: u32,
    /// Table count
    pub table_count: usize,
    /// Total row count
    pub row_count: usize,
}

impl From<&StoreSnapshot> for SnapshotMetadata {
    fn from(snapshot: &StoreSnapshot) -> Self {
        Self {
            format_version: snapshot.format_version,
            table_count: snapshot.table_count(),
            row_count: snapshot.row_count(),
        }
    }
}

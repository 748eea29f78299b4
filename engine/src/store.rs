//! Store - the in-memory table container.
//!
//! The Store holds every table as an ordered map of JSON rows. Reads decode
//! rows into typed values at the boundary; writes are plain upserts. Wrapping
//! writes in a transaction records an undo journal so a failed multi-row
//! update rolls back as a unit.

use crate::error::{StoreError, StoreResult};
use crate::snapshot::{SnapshotMetadata, StoreSnapshot, SNAPSHOT_FORMAT_VERSION};
use crate::{RowKey, TableName};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single table of JSON rows keyed by string.
///
/// Uses BTreeMap so iteration and serialization order are deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    next_id: u64,
    rows: BTreeMap<RowKey, serde_json::Value>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a raw row by key.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.rows.get(key)
    }

    /// Count of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One reversible step recorded inside an open transaction.
#[derive(Debug, Clone)]
enum UndoEntry {
    /// A row write or delete; `prior` is the row state before the step.
    Row {
        table: TableName,
        key: RowKey,
        prior: Option<serde_json::Value>,
    },
    /// An id-counter bump; `prior` is the counter before the step.
    Counter { table: TableName, prior: u64 },
}

/// The main store holding all tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// Tables by name
    tables: BTreeMap<TableName, Table>,
    /// Undo journal for the open transaction, if any
    #[serde(skip)]
    journal: Option<Vec<UndoEntry>>,
}

impl Store {
    /// Create a store with the given empty tables.
    pub fn new<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TableName>,
    {
        let tables = tables
            .into_iter()
            .map(|name| (name.into(), Table::new()))
            .collect();

        Self {
            tables,
            journal: None,
        }
    }

    /// Check if a table exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Get a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Check if a row exists.
    pub fn contains(&self, table: &str, key: &str) -> StoreResult<bool> {
        match self.tables.get(table) {
            Some(t) => Ok(t.rows.contains_key(key)),
            None => Err(StoreError::TableNotFound(table.to_string())),
        }
    }

    /// Get a row decoded into a typed value.
    ///
    /// Returns `Ok(None)` when the key is absent. A row that exists but does
    /// not decode as `T` is a corrupt row, not a missing one.
    pub fn get_as<T: DeserializeOwned>(&self, table: &str, key: &str) -> StoreResult<Option<T>> {
        let t = self
            .tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;

        match t.rows.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                StoreError::CorruptRow {
                    table: table.to_string(),
                    key: key.to_string(),
                    detail: e.to_string(),
                }
            }),
        }
    }

    /// Upsert a row, serializing the value into the table.
    pub fn put<T: Serialize>(&mut self, table: &str, key: &str, row: &T) -> StoreResult<()> {
        let value = serde_json::to_value(row).map_err(|e| StoreError::InvalidRow(e.to_string()))?;

        let t = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let prior = t.rows.insert(key.to_string(), value);

        if let Some(journal) = &mut self.journal {
            journal.push(UndoEntry::Row {
                table: table.to_string(),
                key: key.to_string(),
                prior,
            });
        }

        Ok(())
    }

    /// Delete a row. Returns whether a row was removed.
    pub fn remove(&mut self, table: &str, key: &str) -> StoreResult<bool> {
        let t = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let prior = t.rows.remove(key);
        let removed = prior.is_some();

        if removed {
            if let Some(journal) = &mut self.journal {
                journal.push(UndoEntry::Row {
                    table: table.to_string(),
                    key: key.to_string(),
                    prior,
                });
            }
        }

        Ok(removed)
    }

    /// Bump and return the table's id counter. The first id issued is 1.
    pub fn next_id(&mut self, table: &str) -> StoreResult<u64> {
        let t = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let prior = t.next_id;
        t.next_id += 1;

        if let Some(journal) = &mut self.journal {
            journal.push(UndoEntry::Counter {
                table: table.to_string(),
                prior,
            });
        }

        Ok(t.next_id)
    }

    /// Query rows in a table.
    pub fn query(&self, table: &str) -> StoreResult<Query<'_>> {
        match self.tables.get_key_value(table) {
            Some((name, t)) => Ok(Query { name, table: t }),
            None => Err(StoreError::TableNotFound(table.to_string())),
        }
    }

    /// Open a transaction. All writes until commit/rollback are journaled.
    pub fn begin(&mut self) -> StoreResult<()> {
        if self.journal.is_some() {
            return Err(StoreError::NestedTransaction);
        }
        self.journal = Some(Vec::new());
        Ok(())
    }

    /// Commit the open transaction, discarding its journal.
    pub fn commit(&mut self) -> StoreResult<()> {
        match self.journal.take() {
            Some(_) => Ok(()),
            None => Err(StoreError::NoOpenTransaction),
        }
    }

    /// Roll back the open transaction, restoring all journaled prior state.
    pub fn rollback(&mut self) -> StoreResult<()> {
        match self.journal.take() {
            Some(journal) => {
                self.apply_undo(journal);
                Ok(())
            }
            None => Err(StoreError::NoOpenTransaction),
        }
    }

    /// Run a closure inside a transaction.
    ///
    /// Commits when the closure returns `Ok`, rolls back every journaled
    /// write when it returns `Err`. The closure cannot leak an open
    /// transaction on either path.
    pub fn in_transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.begin().map_err(E::from)?;
        match f(self) {
            Ok(value) => {
                self.commit().map_err(E::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Some(journal) = self.journal.take() {
                    self.apply_undo(journal);
                }
                Err(err)
            }
        }
    }

    fn apply_undo(&mut self, journal: Vec<UndoEntry>) {
        // Replay in reverse so earlier entries restore the oldest state last
        for entry in journal.into_iter().rev() {
            match entry {
                UndoEntry::Row { table, key, prior } => {
                    if let Some(t) = self.tables.get_mut(&table) {
                        match prior {
                            Some(row) => {
                                t.rows.insert(key, row);
                            }
                            None => {
                                t.rows.remove(&key);
                            }
                        }
                    }
                }
                UndoEntry::Counter { table, prior } => {
                    if let Some(t) = self.tables.get_mut(&table) {
                        t.next_id = prior;
                    }
                }
            }
        }
    }

    /// Export the current store state as a snapshot.
    ///
    /// Rejected while a transaction is open: a snapshot must never capture
    /// half of a multi-row update.
    pub fn export_state(&self) -> StoreResult<StoreSnapshot> {
        if self.journal.is_some() {
            return Err(StoreError::UncommittedTransaction);
        }

        let mut snapshot = StoreSnapshot::new();
        for (name, table) in &self.tables {
            snapshot.add_table(name.clone(), table.next_id, table.rows.clone());
        }
        Ok(snapshot)
    }

    /// Import state from a snapshot, replacing all current rows and counters.
    ///
    /// Every table in the snapshot must already exist in this store; the
    /// store's table set defines what the snapshot may contain.
    pub fn import_state(&mut self, snapshot: StoreSnapshot) -> StoreResult<()> {
        if self.journal.is_some() {
            return Err(StoreError::UncommittedTransaction);
        }

        for name in snapshot.tables.keys() {
            if !self.tables.contains_key(name) {
                return Err(StoreError::TableNotFound(name.clone()));
            }
        }

        for table in self.tables.values_mut() {
            table.rows.clear();
            table.next_id = 0;
        }

        for (name, imported) in snapshot.tables {
            if let Some(table) = self.tables.get_mut(&name) {
                table.next_id = imported.next_id;
                table.rows = imported.rows;
            }
        }

        Ok(())
    }

    /// Get snapshot metadata without a full export.
    pub fn snapshot_metadata(&self) -> SnapshotMetadata {
        SnapshotMetadata {
            format_version: SNAPSHOT_FORMAT_VERSION,
            table_count: self.tables.len(),
            row_count: self.tables.values().map(|t| t.rows.len()).sum(),
        }
    }
}

/// Read-only view over one table's rows, in key order.
#[derive(Debug)]
pub struct Query<'a> {
    name: &'a str,
    table: &'a Table,
}

impl<'a> Query<'a> {
    /// Count matching rows.
    pub fn count(self) -> usize {
        self.table.rows.len()
    }

    /// Iterate raw rows in key order.
    pub fn rows(self) -> impl Iterator<Item = (&'a str, &'a serde_json::Value)> {
        self.table.rows.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Decode every row into a typed value, in key order.
    pub fn decode<T: DeserializeOwned>(self) -> StoreResult<Vec<T>> {
        self.table
            .rows
            .iter()
            .map(|(key, value)| {
                serde_json::from_value(value.clone()).map_err(|e| StoreError::CorruptRow {
                    table: self.name.to_string(),
                    key: key.clone(),
                    detail: e.to_string(),
                })
            })
            .collect()
    }
}

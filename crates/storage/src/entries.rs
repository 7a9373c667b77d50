//! Entry table access.
//!
//! Entries stand in for the host system's content items. The edge store
//! joins against this table so reads never surface edges whose
//! counterpart entry was deleted or retyped.

use std::str::FromStr;
use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};

use weft_core::{EntryId, EntryStatus, WeftResult};

use crate::db::{sql_err, Database};
use crate::schema::ENTRIES_TABLE;

/// One row of the entry table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    pub id: EntryId,
    pub entry_type: String,
    pub status: EntryStatus,
}

/// CRUD over the entry table.
#[derive(Clone)]
pub struct EntryStore {
    db: Arc<Database>,
}

impl EntryStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert an entry and return its id.
    pub fn create(&self, entry_type: &str, status: EntryStatus) -> WeftResult<EntryId> {
        self.db.with(|conn| {
            conn.execute(
                &format!("INSERT INTO {ENTRIES_TABLE} (entry_type, status) VALUES (?1, ?2)"),
                params![entry_type, status.as_str()],
            )
            .map_err(sql_err)?;
            Ok(conn.last_insert_rowid() as EntryId)
        })
    }

    /// Fetch an entry row, or None.
    pub fn get(&self, id: EntryId) -> WeftResult<Option<EntryRow>> {
        self.db.with(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT id, entry_type, status FROM {ENTRIES_TABLE} WHERE id = ?1"),
                    params![id as i64],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                        ))
                    },
                )
                .optional()
                .map_err(sql_err)?;
            match row {
                Some((id, entry_type, status)) => Ok(Some(EntryRow {
                    id: id as EntryId,
                    entry_type,
                    status: EntryStatus::from_str(&status)?,
                })),
                None => Ok(None),
            }
        })
    }

    /// Entry type of an entry, or None if the entry does not exist.
    pub fn entry_type_of(&self, id: EntryId) -> WeftResult<Option<String>> {
        self.db.with(|conn| {
            conn.query_row(
                &format!("SELECT entry_type FROM {ENTRIES_TABLE} WHERE id = ?1"),
                params![id as i64],
                |row| row.get(0),
            )
            .optional()
            .map_err(sql_err)
        })
    }

    /// Update an entry's status. Returns false if the entry is missing.
    pub fn set_status(&self, id: EntryId, status: EntryStatus) -> WeftResult<bool> {
        self.db.with(|conn| {
            let changed = conn
                .execute(
                    &format!("UPDATE {ENTRIES_TABLE} SET status = ?1 WHERE id = ?2"),
                    params![status.as_str(), id as i64],
                )
                .map_err(sql_err)?;
            Ok(changed > 0)
        })
    }

    /// Remove an entry row. Edge cleanup is the engine's responsibility.
    pub fn delete(&self, id: EntryId) -> WeftResult<bool> {
        self.db
            .with(|conn| Self::delete_with(conn, id))
    }

    /// Connection-scoped delete, for use inside a larger transaction.
    pub fn delete_with(conn: &Connection, id: EntryId) -> WeftResult<bool> {
        let changed = conn
            .execute(
                &format!("DELETE FROM {ENTRIES_TABLE} WHERE id = ?1"),
                params![id as i64],
            )
            .map_err(sql_err)?;
        Ok(changed > 0)
    }
}

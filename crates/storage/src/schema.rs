//! Table definitions and versioned installation.
//!
//! Each table records a version string in `weft_schema_meta`. On open,
//! a stored version that differs from the compiled-in one re-runs that
//! table's DDL; every statement is `IF NOT EXISTS` so the upgrade path
//! is idempotent.

use rusqlite::{Connection, OptionalExtension};

use weft_core::WeftResult;

use crate::db::sql_err;

/// Prefix shared by every weftdb table.
pub const TABLE_PREFIX: &str = "weft_";

/// The edge (join) table.
pub const EDGES_TABLE: &str = "weft_post_to_post";

/// The entry table.
pub const ENTRIES_TABLE: &str = "weft_entries";

const META_TABLE: &str = "weft_schema_meta";

/// Compiled-in edge table version.
pub const EDGES_VERSION: &str = "1.0";

/// Compiled-in entry table version.
pub const ENTRIES_VERSION: &str = "1.0";

/// Install or upgrade all tables.
pub fn ensure(conn: &Connection) -> WeftResult<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {META_TABLE} (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );"
    ))
    .map_err(sql_err)?;

    if stored_version(conn, EDGES_TABLE)?.as_deref() != Some(EDGES_VERSION) {
        install_edges(conn)?;
        set_version(conn, EDGES_TABLE, EDGES_VERSION)?;
        tracing::debug!(
            target: "weft::schema",
            table = EDGES_TABLE,
            version = EDGES_VERSION,
            "installed table"
        );
    }
    if stored_version(conn, ENTRIES_TABLE)?.as_deref() != Some(ENTRIES_VERSION) {
        install_entries(conn)?;
        set_version(conn, ENTRIES_TABLE, ENTRIES_VERSION)?;
        tracing::debug!(
            target: "weft::schema",
            table = ENTRIES_TABLE,
            version = ENTRIES_VERSION,
            "installed table"
        );
    }
    Ok(())
}

/// Read the recorded version for a table, if any.
pub fn stored_version(conn: &Connection, table: &str) -> WeftResult<Option<String>> {
    conn.query_row(
        &format!("SELECT value FROM {META_TABLE} WHERE key = ?1"),
        [table],
        |row| row.get(0),
    )
    .optional()
    .map_err(sql_err)
}

fn set_version(conn: &Connection, table: &str, version: &str) -> WeftResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO {META_TABLE} (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value"
        ),
        [table, version],
    )
    .map_err(sql_err)?;
    Ok(())
}

fn install_edges(conn: &Connection) -> WeftResult<()> {
    // One row per (subject, object, name). sort_order 0 means unset.
    // The (id2, name) indexes serve object-side reads and ordered reads.
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {EDGES_TABLE} (
            id1        INTEGER NOT NULL,
            id2        INTEGER NOT NULL,
            name       TEXT NOT NULL CHECK (length(name) <= 64),
            sort_order INTEGER NOT NULL DEFAULT 0
        );
        CREATE UNIQUE INDEX IF NOT EXISTS weft_p2p_key
            ON {EDGES_TABLE} (id1, id2, name);
        CREATE INDEX IF NOT EXISTS weft_p2p_object
            ON {EDGES_TABLE} (id2, name);
        CREATE INDEX IF NOT EXISTS weft_p2p_object_order
            ON {EDGES_TABLE} (id2, name, sort_order);"
    ))
    .map_err(sql_err)
}

fn install_entries(conn: &Connection) -> WeftResult<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {ENTRIES_TABLE} (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            entry_type TEXT NOT NULL,
            status     TEXT NOT NULL DEFAULT 'published'
        );
        CREATE INDEX IF NOT EXISTS weft_entries_type
            ON {ENTRIES_TABLE} (entry_type);"
    ))
    .map_err(sql_err)
}

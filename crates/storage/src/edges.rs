//! Edge store: the denormalized relationship join table.
//!
//! Rows are keyed by `(id1, id2, name)` where `id1` is the subject
//! (canonical from-side) and `id2` the object. Bidirectional
//! relationships store a mirror row per edge; the fan-out lives in the
//! engine so every lookup stays a single directional probe.

use std::sync::Arc;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use weft_core::{Edge, EdgeFilter, EntryId, WeftError, WeftResult};

use crate::db::{sql_err, Database};
use crate::schema::{EDGES_TABLE, ENTRIES_TABLE};

/// Rows per bulk-upsert statement. Four binds per row keeps a chunk well
/// under SQLite's default host-parameter limit.
const BULK_CHUNK: usize = 200;

const UPSERT_SUFFIX: &str =
    "ON CONFLICT(id1, id2, name) DO UPDATE SET sort_order = excluded.sort_order";

/// Durable, uniquely-keyed edge storage.
#[derive(Clone)]
pub struct EdgeStore {
    db: Arc<Database>,
}

impl EdgeStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert-or-replace one edge; last write wins for sort_order.
    pub fn upsert(&self, edge: &Edge) -> WeftResult<()> {
        self.db.with(|conn| Self::upsert_with(conn, edge))
    }

    /// Connection-scoped upsert, for composition inside a transaction.
    pub fn upsert_with(conn: &Connection, edge: &Edge) -> WeftResult<()> {
        conn.execute(
            &format!(
                "INSERT INTO {EDGES_TABLE} (id1, id2, name, sort_order)
                 VALUES (?1, ?2, ?3, ?4) {UPSERT_SUFFIX}"
            ),
            params![
                edge.subject as i64,
                edge.object as i64,
                edge.name,
                edge.sort_order
            ],
        )
        .map_err(sql_err)?;
        Ok(())
    }

    /// Upsert a batch of edges, multiple rows per statement.
    ///
    /// Chunks run inside one transaction, so a large reorder is atomic
    /// and costs a handful of statements instead of one per row.
    pub fn bulk_upsert(&self, edges: &[Edge]) -> WeftResult<()> {
        if edges.is_empty() {
            return Ok(());
        }
        self.db.transaction(|txn| {
            for chunk in edges.chunks(BULK_CHUNK) {
                let rows = vec!["(?, ?, ?, ?)"; chunk.len()].join(", ");
                let sql = format!(
                    "INSERT INTO {EDGES_TABLE} (id1, id2, name, sort_order)
                     VALUES {rows} {UPSERT_SUFFIX}"
                );
                let mut binds: Vec<Value> = Vec::with_capacity(chunk.len() * 4);
                for edge in chunk {
                    binds.push(Value::Integer(edge.subject as i64));
                    binds.push(Value::Integer(edge.object as i64));
                    binds.push(Value::Text(edge.name.clone()));
                    binds.push(Value::Integer(edge.sort_order));
                }
                txn.execute(&sql, params_from_iter(binds)).map_err(sql_err)?;
            }
            Ok(())
        })
    }

    /// Delete all rows matching a partial-key filter.
    ///
    /// Returns the number of rows removed. An empty filter is rejected.
    pub fn delete(&self, filter: &EdgeFilter) -> WeftResult<usize> {
        self.db.with(|conn| Self::delete_with(conn, filter))
    }

    /// Connection-scoped delete, for composition inside a transaction.
    pub fn delete_with(conn: &Connection, filter: &EdgeFilter) -> WeftResult<usize> {
        let (clause, binds) = filter_clause(filter)?;
        conn.execute(
            &format!("DELETE FROM {EDGES_TABLE} WHERE {clause}"),
            params_from_iter(binds),
        )
        .map_err(sql_err)
    }

    /// Remove every edge referencing the entry in either column,
    /// regardless of relationship name.
    pub fn purge_entry(&self, id: EntryId) -> WeftResult<usize> {
        self.db.with(|conn| Self::purge_with(conn, id))
    }

    /// Connection-scoped purge, for composition inside a transaction.
    pub fn purge_with(conn: &Connection, id: EntryId) -> WeftResult<usize> {
        conn.execute(
            &format!("DELETE FROM {EDGES_TABLE} WHERE id1 = ?1 OR id2 = ?1"),
            params![id as i64],
        )
        .map_err(sql_err)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Object ids of edges with the given subject, joined against the
    /// entry table and restricted to the expected counterpart types so
    /// orphaned edges drop out. Ordered reads sort unset (0) orders last.
    pub fn objects_of(
        &self,
        subject: EntryId,
        name: &str,
        counterpart_types: &[String],
        ordered: bool,
    ) -> WeftResult<Vec<EntryId>> {
        self.related_ids(subject, name, counterpart_types, ordered, true)
    }

    /// Subject ids of edges with the given object, same filtering rules.
    pub fn subjects_of(
        &self,
        object: EntryId,
        name: &str,
        counterpart_types: &[String],
        ordered: bool,
    ) -> WeftResult<Vec<EntryId>> {
        self.related_ids(object, name, counterpart_types, ordered, false)
    }

    fn related_ids(
        &self,
        entry: EntryId,
        name: &str,
        counterpart_types: &[String],
        ordered: bool,
        from_subject: bool,
    ) -> WeftResult<Vec<EntryId>> {
        if counterpart_types.is_empty() {
            return Ok(Vec::new());
        }
        let (own_col, other_col) = if from_subject {
            ("id1", "id2")
        } else {
            ("id2", "id1")
        };
        let placeholders = vec!["?"; counterpart_types.len()].join(", ");
        let mut sql = format!(
            "SELECT p.{other_col} FROM {EDGES_TABLE} AS p
             JOIN {ENTRIES_TABLE} AS e ON e.id = p.{other_col}
             WHERE p.{own_col} = ? AND p.name = ? AND e.entry_type IN ({placeholders})"
        );
        if ordered {
            sql.push_str(" ORDER BY p.sort_order = 0, p.sort_order ASC");
        }
        let mut binds: Vec<Value> = Vec::with_capacity(counterpart_types.len() + 2);
        binds.push(Value::Integer(entry as i64));
        binds.push(Value::Text(name.to_string()));
        for t in counterpart_types {
            binds.push(Value::Text(t.clone()));
        }

        self.db.with(|conn| {
            let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
            let rows = stmt
                .query_map(params_from_iter(binds), |row| row.get::<_, i64>(0))
                .map_err(sql_err)?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(row.map_err(sql_err)? as EntryId);
            }
            Ok(ids)
        })
    }

    /// Subject ids of edges with the given object and name, without the
    /// entry-table join. Used to scope reorders to existing edges.
    pub fn raw_subjects_of(&self, object: EntryId, name: &str) -> WeftResult<Vec<EntryId>> {
        self.db.with(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT id1 FROM {EDGES_TABLE} WHERE id2 = ?1 AND name = ?2"
                ))
                .map_err(sql_err)?;
            let rows = stmt
                .query_map(params![object as i64, name], |row| row.get::<_, i64>(0))
                .map_err(sql_err)?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(row.map_err(sql_err)? as EntryId);
            }
            Ok(ids)
        })
    }

    /// Count rows matching a partial-key filter.
    pub fn count(&self, filter: &EdgeFilter) -> WeftResult<u64> {
        let (clause, binds) = filter_clause(filter)?;
        self.db.with(|conn| {
            conn.query_row(
                &format!("SELECT COUNT(*) FROM {EDGES_TABLE} WHERE {clause}"),
                params_from_iter(binds),
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n as u64)
            .map_err(sql_err)
        })
    }

    /// Whether one exact edge exists.
    pub fn exists_with(
        conn: &Connection,
        subject: EntryId,
        object: EntryId,
        name: &str,
    ) -> WeftResult<bool> {
        probe(
            conn,
            "id1 = ?1 AND id2 = ?2 AND name = ?3",
            params![subject as i64, object as i64, name],
        )
    }

    /// Whether any edge has this subject under the given name.
    pub fn subject_has_edge_with(
        conn: &Connection,
        subject: EntryId,
        name: &str,
    ) -> WeftResult<bool> {
        probe(
            conn,
            "id1 = ?1 AND name = ?2",
            params![subject as i64, name],
        )
    }

    /// Whether any edge has this object under the given name.
    pub fn object_has_edge_with(
        conn: &Connection,
        object: EntryId,
        name: &str,
    ) -> WeftResult<bool> {
        probe(conn, "id2 = ?1 AND name = ?2", params![object as i64, name])
    }
}

fn probe(conn: &Connection, clause: &str, binds: &[&dyn rusqlite::ToSql]) -> WeftResult<bool> {
    conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {EDGES_TABLE} WHERE {clause})"),
        binds,
        |row| row.get::<_, bool>(0),
    )
    .map_err(sql_err)
}

/// Build a WHERE clause and binds from a partial-key filter.
fn filter_clause(filter: &EdgeFilter) -> WeftResult<(String, Vec<Value>)> {
    if filter.is_empty() {
        return Err(WeftError::invalid_input(
            "edge filter requires at least one of subject, object, name",
        ));
    }
    let mut parts = Vec::new();
    let mut binds = Vec::new();
    if let Some(subject) = filter.subject {
        parts.push("id1 = ?");
        binds.push(Value::Integer(subject as i64));
    }
    if let Some(object) = filter.object {
        parts.push("id2 = ?");
        binds.push(Value::Integer(object as i64));
    }
    if let Some(name) = &filter.name {
        parts.push("name = ?");
        binds.push(Value::Text(name.clone()));
    }
    Ok((parts.join(" AND "), binds))
}

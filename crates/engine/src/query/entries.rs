//! Entry-listing query builder.
//!
//! `SELECT e.id FROM weft_entries AS e ...` with optional relationship
//! joins spliced in by [`RelationshipQuery`]. The builder itself only
//! knows about entry type, trash visibility, ordering, and limit.

use std::sync::Arc;

use rusqlite::params_from_iter;
use rusqlite::types::Value;

use weft_core::{EntryId, EntryStatus, WeftResult};
use weft_storage::schema::ENTRIES_TABLE;
use weft_storage::{Database, EntryStore};

use crate::registry::Registry;

use super::{RelationshipFilter, RelationshipQuery};

/// Result ordering for an entry-listing query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderBy {
    /// Ascending entry id.
    #[default]
    Id,
    /// Sort order stored on the relationship edges. Falls back to id
    /// ordering unless the query carries exactly one resolved segment.
    Relationship,
}

/// Declarative entry-listing query.
#[derive(Debug, Clone, Default)]
pub struct EntryQuery {
    entry_type: String,
    include_trashed: bool,
    relationship: Option<RelationshipFilter>,
    order_by: OrderBy,
    limit: Option<u64>,
}

impl EntryQuery {
    pub fn new(entry_type: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            ..Default::default()
        }
    }

    /// Include trashed entries in the results.
    pub fn include_trashed(mut self) -> Self {
        self.include_trashed = true;
        self
    }

    /// Restrict results to entries matching a relationship filter.
    pub fn related(mut self, filter: RelationshipFilter) -> Self {
        self.relationship = Some(filter);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = order;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Assemble and run the query, returning matching entry ids.
    pub fn execute(&self, db: &Arc<Database>, registry: &Registry) -> WeftResult<Vec<EntryId>> {
        let entries = EntryStore::new(db.clone());
        let rq = match &self.relationship {
            Some(filter) if !filter.is_empty() => {
                RelationshipQuery::build(filter, &self.entry_type, registry, &entries)?
            }
            _ => RelationshipQuery::default(),
        };

        let mut sql = format!("SELECT e.id FROM {ENTRIES_TABLE} AS e");
        if !rq.join_sql().is_empty() {
            sql.push(' ');
            sql.push_str(rq.join_sql());
        }
        sql.push_str(" WHERE e.entry_type = ?");
        let mut binds: Vec<Value> = vec![Value::Text(self.entry_type.clone())];
        if !self.include_trashed {
            sql.push_str(" AND e.status != ?");
            binds.push(Value::Text(EntryStatus::Trashed.as_str().to_string()));
        }

        let filtered = !rq.is_empty();
        if filtered {
            sql.push_str(" AND (");
            sql.push_str(rq.where_sql());
            sql.push(')');
            binds.extend(rq.binds().iter().cloned());
            // Joined rows multiply base rows; collapse back to one row
            // per entry.
            sql.push_str(" GROUP BY e.id");
        }

        match (self.order_by, rq.order_alias()) {
            (OrderBy::Relationship, Some(alias)) => {
                sql.push_str(&format!(
                    " ORDER BY {alias}.sort_order = 0, {alias}.sort_order ASC, e.id ASC"
                ));
            }
            (OrderBy::Relationship, None) => {
                tracing::warn!(
                    target: "weft::query",
                    entry_type = %self.entry_type,
                    "relationship ordering requires exactly one resolved segment; \
                     falling back to id order"
                );
                sql.push_str(" ORDER BY e.id ASC");
            }
            (OrderBy::Id, _) => sql.push_str(" ORDER BY e.id ASC"),
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        db.with(|conn| {
            let mut stmt = conn.prepare(&sql).map_err(weft_storage::sql_err)?;
            let rows = stmt
                .query_map(params_from_iter(binds), |row| row.get::<_, i64>(0))
                .map_err(weft_storage::sql_err)?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(row.map_err(weft_storage::sql_err)? as EntryId);
            }
            Ok(ids)
        })
    }
}

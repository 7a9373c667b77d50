//! Query integration: compose relationship filtering into a generic
//! entry-listing query.
//!
//! The listing query builder stays relationship-unaware; it accepts a
//! typed [`RelationshipFilter`] and hands it to [`RelationshipQuery`],
//! which resolves segments through the registry and derives the SQL
//! fragments (WHERE, JOIN, GROUP BY, ORDER BY) spliced into the final
//! statement. Resolution happens once per execution; fragment emission
//! only reads the precomputed state.

mod entries;
mod filter;

pub use entries::{EntryQuery, OrderBy};
pub use filter::{Relation, RelationshipFilter, Segment};

use rusqlite::types::Value;

use weft_core::WeftResult;
use weft_storage::schema::EDGES_TABLE;
use weft_storage::EntryStore;

use crate::registry::Registry;

/// A segment that survived registry resolution, with its join alias.
#[derive(Debug, Clone)]
struct ResolvedSegment {
    segment: Segment,
    alias: String,
}

/// Per-execution working state for a relationship-filtered query.
#[derive(Debug, Default)]
pub struct RelationshipQuery {
    resolved: Vec<ResolvedSegment>,
    relation: Relation,
    where_sql: String,
    join_sql: String,
    binds: Vec<Value>,
}

impl RelationshipQuery {
    /// Resolve a filter against the registry and derive SQL fragments.
    ///
    /// Segments that cannot be resolved (unknown entry, orphaned or
    /// unregistered relationship name, counterpart type that does not
    /// participate) are skipped with a warning and contribute no SQL.
    pub fn build(
        filter: &RelationshipFilter,
        base_type: &str,
        registry: &Registry,
        entries: &EntryStore,
    ) -> WeftResult<Self> {
        let mut surviving = Vec::new();
        for segment in &filter.segments {
            let Some(counterpart) = entries.entry_type_of(segment.related_to)? else {
                tracing::warn!(
                    target: "weft::query",
                    related_to = segment.related_to,
                    name = %segment.name,
                    "segment skipped: related_to entry does not exist"
                );
                continue;
            };
            if registry.resolve(base_type, &counterpart, &segment.name).is_none() {
                tracing::warn!(
                    target: "weft::query",
                    base_type,
                    counterpart = %counterpart,
                    name = %segment.name,
                    "segment skipped: no such relationship is registered"
                );
                continue;
            }
            surviving.push(segment.clone());
        }

        let mut query = RelationshipQuery {
            relation: filter.relation,
            ..Default::default()
        };

        // Under AND each segment needs its own join (an entry must carry
        // one matching edge per segment); under OR all segments test the
        // same joined row set, so one join is shared.
        let mut where_parts = Vec::with_capacity(surviving.len());
        for (i, segment) in surviving.into_iter().enumerate() {
            let alias = match filter.relation {
                Relation::And => format!("p{}", i + 1),
                Relation::Or => "p1".to_string(),
            };
            where_parts.push(format!("({alias}.id2 = ? AND {alias}.name = ?)"));
            query.binds.push(Value::Integer(segment.related_to as i64));
            query.binds.push(Value::Text(segment.name.clone()));
            query.resolved.push(ResolvedSegment { segment, alias });
        }
        query.where_sql = where_parts.join(query.relation.as_sql());

        let mut joins = Vec::new();
        for rs in &query.resolved {
            let join = format!(
                "LEFT JOIN {EDGES_TABLE} AS {alias} ON e.id = {alias}.id1",
                alias = rs.alias
            );
            if !joins.contains(&join) {
                joins.push(join);
            }
        }
        query.join_sql = joins.join(" ");

        Ok(query)
    }

    /// True when no segment survived resolution.
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// WHERE fragment (segment predicates joined by the relation), to be
    /// wrapped in one outer `AND (...)` group by the consumer.
    pub fn where_sql(&self) -> &str {
        &self.where_sql
    }

    /// JOIN fragment: one LEFT JOIN per distinct alias.
    pub fn join_sql(&self) -> &str {
        &self.join_sql
    }

    /// Bind values for the WHERE fragment, in emission order.
    pub fn binds(&self) -> &[Value] {
        &self.binds
    }

    /// Alias to order by, available only when exactly one segment
    /// survived. Ordering semantics are undefined across multiple
    /// segments, so callers fall back to default ordering.
    pub fn order_alias(&self) -> Option<&str> {
        match self.resolved.as_slice() {
            [only] => Some(&only.alias),
            _ => None,
        }
    }
}

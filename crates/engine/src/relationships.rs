//! Post-to-post relationship operations.
//!
//! [`Relationship`] is the only component that understands cardinality
//! and bidirectionality. Callers never write to the edge store directly,
//! so the mirror-row fan-out for bidirectional relationships cannot be
//! bypassed or forgotten.

use std::collections::HashSet;
use std::sync::Arc;

use weft_core::{
    Cardinality, Edge, EdgeFilter, EntryId, RelationshipArgs, RelationshipKey, SideUi, WeftResult,
};
use weft_storage::{Database, EdgeStore, EntryStore};

/// Immutable descriptor of one named relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipDef {
    pub from_type: String,
    pub to_types: Vec<String>,
    pub name: String,
    pub cardinality: Cardinality,
    /// Derived: true iff the relationship relates a type to itself.
    /// Either participant can then be queried as the owner, backed by
    /// symmetric mirror rows.
    pub bidirectional: bool,
    pub from_ui: SideUi,
    pub to_ui: SideUi,
}

impl RelationshipDef {
    pub(crate) fn new(
        from_type: &str,
        to_types: &[&str],
        name: &str,
        args: RelationshipArgs,
    ) -> Self {
        let mut to: Vec<String> = Vec::with_capacity(to_types.len());
        for t in to_types {
            if !to.iter().any(|existing| existing == t) {
                to.push(t.to_string());
            }
        }
        let bidirectional = to.len() == 1 && to[0] == from_type;
        Self {
            from_type: from_type.to_string(),
            to_types: to,
            name: name.to_string(),
            cardinality: args.cardinality,
            bidirectional,
            from_ui: args.from_ui,
            to_ui: args.to_ui,
        }
    }

    /// Canonical registry key for this definition.
    pub fn key(&self) -> RelationshipKey {
        RelationshipKey::new(&self.from_type, &self.to_types, &self.name)
    }

    /// Whether an entry type is on either side of this relationship.
    pub fn participates(&self, entry_type: &str) -> bool {
        self.is_from(entry_type) || self.is_to(entry_type)
    }

    pub fn is_from(&self, entry_type: &str) -> bool {
        self.from_type == entry_type
    }

    pub fn is_to(&self, entry_type: &str) -> bool {
        self.to_types.iter().any(|t| t == entry_type)
    }
}

/// Outcome of [`Relationship::replace_relationships`].
///
/// Replacement is not transactional across the whole diff; a cardinality
/// rejection partway through leaves the deletions and earlier additions
/// applied. The outcome reports exactly what happened so callers can
/// compensate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// Every removal and addition was applied.
    Complete {
        removed: Vec<EntryId>,
        added: Vec<EntryId>,
    },
    /// An addition was rejected by a cardinality check; the listed
    /// removals and additions had already been applied.
    Partial {
        removed: Vec<EntryId>,
        added: Vec<EntryId>,
        rejected: EntryId,
    },
}

impl ReplaceOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, ReplaceOutcome::Complete { .. })
    }
}

/// A relationship definition bound to the stores it operates on.
#[derive(Clone)]
pub struct Relationship {
    def: RelationshipDef,
    edges: EdgeStore,
    entries: EntryStore,
    db: Arc<Database>,
}

impl Relationship {
    pub fn new(def: RelationshipDef, db: Arc<Database>) -> Self {
        Self {
            def,
            edges: EdgeStore::new(db.clone()),
            entries: EntryStore::new(db.clone()),
            db,
        }
    }

    pub fn def(&self) -> &RelationshipDef {
        &self.def
    }

    /// Relate two entries. Returns `Ok(false)` on a cardinality conflict,
    /// with no mutation.
    ///
    /// Arguments may arrive in either order; for one-way relationships the
    /// stored subject is always the from-type entry. Ids of entries that
    /// do not exist or whose types do not participate are a tolerated
    /// no-op returning `true` (legacy permissive contract, logged at warn).
    /// The cardinality check and the write(s) share one transaction.
    pub fn add_relationship(&self, a: EntryId, b: EntryId) -> WeftResult<bool> {
        let Some((subject, object)) = self.normalize(a, b)? else {
            return Ok(true);
        };
        let def = &self.def;

        self.db.transaction(|txn| {
            // Re-adding an existing edge is an idempotent success.
            if EdgeStore::exists_with(txn, subject, object, &def.name)? {
                return Ok(true);
            }

            let allowed = match def.cardinality {
                Cardinality::ManyToMany => true,
                Cardinality::OneToOne => {
                    !EdgeStore::subject_has_edge_with(txn, subject, &def.name)?
                        && !EdgeStore::object_has_edge_with(txn, object, &def.name)?
                }
                Cardinality::ManyToOne => {
                    !EdgeStore::subject_has_edge_with(txn, subject, &def.name)?
                }
                Cardinality::OneToMany => {
                    !EdgeStore::object_has_edge_with(txn, object, &def.name)?
                }
            };
            if !allowed {
                tracing::debug!(
                    target: "weft::edges",
                    relationship = %def.name,
                    subject,
                    object,
                    cardinality = %def.cardinality,
                    "add refused by cardinality check"
                );
                return Ok(false);
            }

            EdgeStore::upsert_with(txn, &Edge::new(subject, object, &def.name))?;
            if def.bidirectional {
                EdgeStore::upsert_with(txn, &Edge::new(object, subject, &def.name))?;
            }
            tracing::debug!(
                target: "weft::edges",
                relationship = %def.name,
                subject,
                object,
                "edge added"
            );
            Ok(true)
        })
    }

    /// Remove the edge between two entries, in both physical directions.
    /// Deleting a non-existent edge is not an error.
    pub fn delete_relationship(&self, a: EntryId, b: EntryId) -> WeftResult<()> {
        let name = self.def.name.clone();
        self.db.transaction(|txn| {
            // Arguments may be in either order; clearing both directions
            // covers the canonical row and any mirror.
            EdgeStore::delete_with(txn, &EdgeFilter::exact(a, b, &name))?;
            EdgeStore::delete_with(txn, &EdgeFilter::exact(b, a, &name))?;
            Ok(())
        })
    }

    /// Replace an entry's related set with `new_ids`, diffing against the
    /// current set: removed ids are deleted, new ids added (cardinality
    /// still applies per addition). Untouched ids are not re-written.
    pub fn replace_relationships(
        &self,
        entry: EntryId,
        new_ids: &[EntryId],
    ) -> WeftResult<ReplaceOutcome> {
        let current = self.related_entry_ids(entry, false)?;
        let current_set: HashSet<EntryId> = current.iter().copied().collect();
        let new_set: HashSet<EntryId> = new_ids.iter().copied().collect();

        let mut removed = Vec::new();
        for id in current {
            if !new_set.contains(&id) {
                self.delete_relationship(entry, id)?;
                removed.push(id);
            }
        }

        let mut added = Vec::new();
        let mut seen = HashSet::new();
        for &id in new_ids {
            if current_set.contains(&id) || !seen.insert(id) {
                continue;
            }
            if self.add_relationship(entry, id)? {
                added.push(id);
            } else {
                return Ok(ReplaceOutcome::Partial {
                    removed,
                    added,
                    rejected: id,
                });
            }
        }
        Ok(ReplaceOutcome::Complete { removed, added })
    }

    /// Ids related to an entry, direction chosen by the entry's type.
    ///
    /// Reads join against the entry table restricted to the counterpart
    /// type(s), so edges pointing at deleted or retyped entries drop out
    /// silently. Ordered reads sort unset (0) orders last. Entries that
    /// do not exist or do not participate yield an empty list.
    pub fn related_entry_ids(&self, entry: EntryId, ordered: bool) -> WeftResult<Vec<EntryId>> {
        let Some(entry_type) = self.entries.entry_type_of(entry)? else {
            return Ok(Vec::new());
        };
        let def = &self.def;
        if def.bidirectional {
            if !def.is_from(&entry_type) {
                return Ok(Vec::new());
            }
            // Mirror rows make membership symmetric; reading the object
            // side keeps ordering aligned with save_sort_data.
            return self.edges.subjects_of(
                entry,
                &def.name,
                std::slice::from_ref(&def.from_type),
                ordered,
            );
        }
        if def.is_from(&entry_type) {
            self.edges.objects_of(entry, &def.name, &def.to_types, ordered)
        } else if def.is_to(&entry_type) {
            self.edges.subjects_of(
                entry,
                &def.name,
                std::slice::from_ref(&def.from_type),
                ordered,
            )
        } else {
            Ok(Vec::new())
        }
    }

    /// Persist a manual ordering of an entry's related list.
    ///
    /// Assigns sort_order 1..=N following the given sequence, scoped to
    /// existing edges where this entry is the object side; ids not
    /// currently related are ignored rather than minted into edges. The
    /// inverse direction keeps its own independent ordering.
    pub fn save_sort_data(&self, entry: EntryId, ordered_ids: &[EntryId]) -> WeftResult<()> {
        let existing: HashSet<EntryId> = self
            .edges
            .raw_subjects_of(entry, &self.def.name)?
            .into_iter()
            .collect();

        let mut edges = Vec::new();
        let mut order = 1i64;
        for &id in ordered_ids {
            if existing.contains(&id) {
                edges.push(Edge::with_order(id, entry, &self.def.name, order));
                order += 1;
            }
        }
        self.edges.bulk_upsert(&edges)
    }

    /// Resolve the stored (subject, object) orientation for a pair of
    /// ids, or None when the pair cannot participate (tolerated no-op).
    fn normalize(&self, a: EntryId, b: EntryId) -> WeftResult<Option<(EntryId, EntryId)>> {
        let def = &self.def;
        let (Some(type_a), Some(type_b)) =
            (self.entries.entry_type_of(a)?, self.entries.entry_type_of(b)?)
        else {
            tracing::warn!(
                target: "weft::edges",
                relationship = %def.name,
                a,
                b,
                "add/delete ignored: entry does not exist"
            );
            return Ok(None);
        };

        if def.bidirectional {
            if def.is_from(&type_a) && def.is_from(&type_b) {
                return Ok(Some((a, b)));
            }
        } else if def.is_from(&type_a) && def.is_to(&type_b) {
            return Ok(Some((a, b)));
        } else if def.is_from(&type_b) && def.is_to(&type_a) {
            return Ok(Some((b, a)));
        }

        tracing::warn!(
            target: "weft::edges",
            relationship = %def.name,
            %type_a,
            %type_b,
            "add/delete ignored: entry types do not participate"
        );
        Ok(None)
    }
}

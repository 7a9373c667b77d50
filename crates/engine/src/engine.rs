//! Top-level engine facade.
//!
//! [`Engine`] owns the database handle, the process-scoped registry, and
//! the stores, and wires entry lifecycle into edge hygiene: permanent
//! deletion purges every edge touching the entry, while trashing leaves
//! edges intact so a restore brings relationships back untouched.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use weft_core::{EntryId, EntryStatus, RelationshipArgs, WeftError, WeftResult};
use weft_storage::{Database, EdgeStore, EntryRow, EntryStore};

use crate::query::EntryQuery;
use crate::registry::Registry;
use crate::relationships::Relationship;

/// Handle to one weftdb instance.
pub struct Engine {
    db: Arc<Database>,
    registry: RwLock<Registry>,
    entries: EntryStore,
}

impl Engine {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> WeftResult<Self> {
        Ok(Self::from_db(Database::open(path)?))
    }

    /// Open a fresh in-memory instance.
    pub fn in_memory() -> WeftResult<Self> {
        Ok(Self::from_db(Database::in_memory()?))
    }

    fn from_db(db: Arc<Database>) -> Self {
        Self {
            entries: EntryStore::new(db.clone()),
            registry: RwLock::new(Registry::new()),
            db,
        }
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// Register an entry type. Idempotent.
    pub fn register_entry_type(&self, name: &str) -> WeftResult<()> {
        self.registry.write().register_entry_type(name)
    }

    /// Define a post-to-post relationship and return a bound handle.
    pub fn define_post_to_post(
        &self,
        from_type: &str,
        to_types: &[&str],
        name: &str,
        args: RelationshipArgs,
    ) -> WeftResult<Relationship> {
        let def = self
            .registry
            .write()
            .define_post_to_post(from_type, to_types, name, args)?;
        Ok(Relationship::new(def, self.db.clone()))
    }

    /// Bound handle for an already-defined relationship, or None.
    pub fn relationship(&self, type_a: &str, type_b: &str, name: &str) -> Option<Relationship> {
        let registry = self.registry.read();
        let def = registry.get_post_to_post(type_a, type_b, name)?.clone();
        Some(Relationship::new(def, self.db.clone()))
    }

    /// Whether a relationship is defined for the unordered type pair.
    pub fn post_to_post_exists(&self, type_a: &str, type_b: &str, name: &str) -> bool {
        self.registry.read().post_to_post_exists(type_a, type_b, name)
    }

    // =========================================================================
    // Entry lifecycle
    // =========================================================================

    /// Create a published entry of a registered type.
    pub fn create_entry(&self, entry_type: &str) -> WeftResult<EntryId> {
        if !self.registry.read().entry_type_exists(entry_type) {
            return Err(WeftError::invalid_entry_type(entry_type));
        }
        self.entries.create(entry_type, EntryStatus::Published)
    }

    /// Fetch an entry row.
    pub fn entry(&self, id: EntryId) -> WeftResult<Option<EntryRow>> {
        self.entries.get(id)
    }

    /// Move an entry to the trash. Its edges are kept, so restoring the
    /// entry restores its relationships.
    pub fn trash_entry(&self, id: EntryId) -> WeftResult<bool> {
        self.entries.set_status(id, EntryStatus::Trashed)
    }

    /// Restore a trashed entry to published.
    pub fn restore_entry(&self, id: EntryId) -> WeftResult<bool> {
        self.entries.set_status(id, EntryStatus::Published)
    }

    /// Permanently delete an entry and every edge referencing it, on
    /// either side of any relationship, in one transaction.
    pub fn delete_entry(&self, id: EntryId) -> WeftResult<bool> {
        let (purged, removed) = self.db.transaction(|txn| {
            let purged = EdgeStore::purge_with(txn, id)?;
            let removed = EntryStore::delete_with(txn, id)?;
            Ok((purged, removed))
        })?;
        if removed {
            tracing::debug!(
                target: "weft::lifecycle",
                entry = id,
                purged_edges = purged,
                "entry permanently deleted"
            );
        }
        Ok(removed)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Run an entry-listing query.
    pub fn find_entries(&self, query: &EntryQuery) -> WeftResult<Vec<EntryId>> {
        query.execute(&self.db, &self.registry.read())
    }
}

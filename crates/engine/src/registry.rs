//! Process-scoped catalog of entry types and relationship definitions.
//!
//! The registry is rebuilt from declarative `define_*` calls every
//! process; it is never persisted. Edges in storage may therefore
//! reference names with no current definition; lookups treat those as
//! "not found", never as an error.

use std::collections::{HashMap, HashSet};

use weft_core::{
    RelationshipArgs, RelationshipKey, WeftError, WeftResult, MAX_RELATIONSHIP_NAME_LEN,
};

use crate::relationships::RelationshipDef;

/// Catalog of registered entry types and defined relationships.
#[derive(Debug, Default)]
pub struct Registry {
    entry_types: HashSet<String>,
    relationships: HashMap<RelationshipKey, RelationshipDef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Entry types
    // =========================================================================

    /// Register an entry type. Re-registering the same name is a no-op.
    pub fn register_entry_type(&mut self, name: &str) -> WeftResult<()> {
        if name.is_empty() {
            return Err(WeftError::invalid_input("entry type must not be empty"));
        }
        self.entry_types.insert(name.to_string());
        Ok(())
    }

    /// Whether an entry type has been registered.
    pub fn entry_type_exists(&self, name: &str) -> bool {
        self.entry_types.contains(name)
    }

    // =========================================================================
    // Relationship definitions
    // =========================================================================

    /// Define a post-to-post relationship.
    ///
    /// Fails when any referenced entry type is unregistered or when an
    /// equivalent definition (same unordered type set and name, in any
    /// permutation) already exists.
    pub fn define_post_to_post(
        &mut self,
        from_type: &str,
        to_types: &[&str],
        name: &str,
        args: RelationshipArgs,
    ) -> WeftResult<RelationshipDef> {
        if name.is_empty() || name.len() > MAX_RELATIONSHIP_NAME_LEN {
            return Err(WeftError::invalid_input(format!(
                "relationship name must be 1..={MAX_RELATIONSHIP_NAME_LEN} characters"
            )));
        }
        if to_types.is_empty() {
            return Err(WeftError::invalid_input(
                "relationship requires at least one to-type",
            ));
        }
        if !self.entry_type_exists(from_type) {
            return Err(WeftError::invalid_entry_type(from_type));
        }
        for t in to_types {
            if !self.entry_type_exists(t) {
                return Err(WeftError::invalid_entry_type(*t));
            }
        }

        let def = RelationshipDef::new(from_type, to_types, name, args);
        let key = def.key();
        if self.relationships.contains_key(&key) {
            return Err(WeftError::duplicate_relationship(&key));
        }
        tracing::debug!(
            target: "weft::registry",
            relationship = %key,
            cardinality = %def.cardinality,
            "defined post-to-post relationship"
        );
        self.relationships.insert(key, def.clone());
        Ok(def)
    }

    /// Look up a definition by unordered type pair and name.
    pub fn get_post_to_post(
        &self,
        type_a: &str,
        type_b: &str,
        name: &str,
    ) -> Option<&RelationshipDef> {
        self.relationships
            .get(&RelationshipKey::pair(type_a, type_b, name))
    }

    /// Whether a definition exists for the unordered type pair and name.
    pub fn post_to_post_exists(&self, type_a: &str, type_b: &str, name: &str) -> bool {
        self.get_post_to_post(type_a, type_b, name).is_some()
    }

    /// Tolerant lookup used by query integration: exact pair key first,
    /// then any definition with the name in which both types participate
    /// (covers definitions whose to-type list has more than two members).
    pub fn resolve(
        &self,
        base_type: &str,
        counterpart_type: &str,
        name: &str,
    ) -> Option<&RelationshipDef> {
        if let Some(def) = self.get_post_to_post(base_type, counterpart_type, name) {
            return Some(def);
        }
        self.relationships.values().find(|def| {
            def.name == name && def.participates(base_type) && def.participates(counterpart_type)
        })
    }

    /// All defined relationships.
    pub fn definitions(&self) -> impl Iterator<Item = &RelationshipDef> {
        self.relationships.values()
    }
}

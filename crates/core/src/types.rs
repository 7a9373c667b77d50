//! Shared value types: entries, edges, cardinality, relationship keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{WeftError, WeftResult};

/// Identifier of a content entry (a row in the entry table).
pub type EntryId = u64;

/// Longest relationship name the edge table accepts.
pub const MAX_RELATIONSHIP_NAME_LEN: usize = 64;

// =============================================================================
// Entry status
// =============================================================================

/// Publication status of an entry.
///
/// Trashed entries are soft-deleted: they drop out of listing queries but
/// keep their edges, so restoring an entry restores its relationships.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Visible in listing queries (default).
    #[default]
    Published,
    /// Authored but not published.
    Draft,
    /// Soft-deleted; edges persist.
    Trashed,
}

impl EntryStatus {
    /// Stable string form used in the entry table.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Published => "published",
            EntryStatus::Draft => "draft",
            EntryStatus::Trashed => "trashed",
        }
    }
}

impl FromStr for EntryStatus {
    type Err = WeftError;

    fn from_str(s: &str) -> WeftResult<Self> {
        match s {
            "published" => Ok(EntryStatus::Published),
            "draft" => Ok(EntryStatus::Draft),
            "trashed" => Ok(EntryStatus::Trashed),
            other => Err(WeftError::serialization(format!(
                "unknown entry status '{other}'"
            ))),
        }
    }
}

// =============================================================================
// Cardinality
// =============================================================================

/// Multiplicity constraint on a relationship.
///
/// Directions read from the relationship's `from` side: `many-to-one`
/// means many from-entries may point at one to-entry, while each
/// from-entry holds at most one edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    OneToOne,
    ManyToOne,
    OneToMany,
    #[default]
    ManyToMany,
}

impl Cardinality {
    /// Stable string form (`"one-to-one"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "one-to-one",
            Cardinality::ManyToOne => "many-to-one",
            Cardinality::OneToMany => "one-to-many",
            Cardinality::ManyToMany => "many-to-many",
        }
    }
}

impl FromStr for Cardinality {
    type Err = WeftError;

    fn from_str(s: &str) -> WeftResult<Self> {
        match s {
            "one-to-one" => Ok(Cardinality::OneToOne),
            "many-to-one" => Ok(Cardinality::ManyToOne),
            "one-to-many" => Ok(Cardinality::OneToMany),
            "many-to-many" => Ok(Cardinality::ManyToMany),
            other => Err(WeftError::invalid_input(format!(
                "invalid cardinality '{other}'. Must be 'one-to-one', 'many-to-one', \
                 'one-to-many', or 'many-to-many'."
            ))),
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Edges
// =============================================================================

/// One stored relationship instance between two entries.
///
/// `subject` is the canonical from-side entry for one-way relationships;
/// bidirectional relationships store a mirror row with subject and object
/// swapped. `sort_order` of 0 means "unset" and sorts last in ordered
/// reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub subject: EntryId,
    pub object: EntryId,
    pub name: String,
    #[serde(default)]
    pub sort_order: i64,
}

impl Edge {
    /// Edge with unset sort order.
    pub fn new(subject: EntryId, object: EntryId, name: impl Into<String>) -> Self {
        Self {
            subject,
            object,
            name: name.into(),
            sort_order: 0,
        }
    }

    /// Edge carrying an explicit sort order.
    pub fn with_order(
        subject: EntryId,
        object: EntryId,
        name: impl Into<String>,
        sort_order: i64,
    ) -> Self {
        Self {
            subject,
            object,
            name: name.into(),
            sort_order,
        }
    }
}

/// Partial-key filter for edge deletion and counting.
///
/// Any subset of columns may be set; an entirely empty filter is rejected
/// by the store to keep a missing filter from wiping the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeFilter {
    pub subject: Option<EntryId>,
    pub object: Option<EntryId>,
    pub name: Option<String>,
}

impl EdgeFilter {
    /// Filter matching every edge with the given subject.
    pub fn for_subject(subject: EntryId) -> Self {
        Self {
            subject: Some(subject),
            ..Self::default()
        }
    }

    /// Filter matching every edge with the given object.
    pub fn for_object(object: EntryId) -> Self {
        Self {
            object: Some(object),
            ..Self::default()
        }
    }

    /// Filter matching one exact edge.
    pub fn exact(subject: EntryId, object: EntryId, name: impl Into<String>) -> Self {
        Self {
            subject: Some(subject),
            object: Some(object),
            name: Some(name.into()),
        }
    }

    /// Restrict the filter to a relationship name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// True when no column is constrained.
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.object.is_none() && self.name.is_none()
    }
}

// =============================================================================
// Relationship key and definition arguments
// =============================================================================

/// Canonical registry key: the sorted, deduplicated union of the
/// participating entry types, paired with the relationship name.
///
/// Declaration order of `from`/`to` never affects the key, so a lookup
/// from either side lands on the same map slot and duplicate definitions
/// with permuted type lists collide as required.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipKey {
    types: Vec<String>,
    name: String,
}

impl RelationshipKey {
    /// Key for a definition with one from-type and one or more to-types.
    pub fn new<S: AsRef<str>>(from_type: &str, to_types: &[S], name: &str) -> Self {
        let mut types: Vec<String> = to_types.iter().map(|t| t.as_ref().to_string()).collect();
        types.push(from_type.to_string());
        types.sort();
        types.dedup();
        Self {
            types,
            name: name.to_string(),
        }
    }

    /// Key for an unordered type pair, as used by side-agnostic lookups.
    pub fn pair(type_a: &str, type_b: &str, name: &str) -> Self {
        Self::new(type_a, &[type_b], name)
    }

    /// The canonicalized type set.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// The relationship name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RelationshipKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] '{}'", self.types.join(", "), self.name)
    }
}

/// Per-side UI metadata carried on a relationship definition.
///
/// The engine stores this verbatim for the presentation layer; only
/// `sortable` has meaning here (whether the side's related list accepts
/// manual ordering).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideUi {
    /// Whether the side renders relationship UI at all.
    #[serde(default)]
    pub enabled: bool,
    /// Whether the side's related list is manually sortable.
    #[serde(default)]
    pub sortable: bool,
    /// Display title for the related list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Optional arguments accepted when defining a relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipArgs {
    /// Multiplicity constraint (default many-to-many).
    #[serde(default)]
    pub cardinality: Cardinality,
    /// UI metadata for the from side.
    #[serde(default)]
    pub from_ui: SideUi,
    /// UI metadata for the to side.
    #[serde(default)]
    pub to_ui: SideUi,
}

impl RelationshipArgs {
    /// Arguments with a non-default cardinality.
    pub fn with_cardinality(cardinality: Cardinality) -> Self {
        Self {
            cardinality,
            ..Self::default()
        }
    }
}

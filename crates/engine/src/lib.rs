//! Relationship engine: definitions, registry, edge operations, and
//! query integration.
//!
//! The engine layers relationship semantics over the storage crate:
//! cardinality enforcement, one-way direction normalization,
//! bidirectional mirror-row fan-out, and the translation of declarative
//! relationship filters into SQL fragments spliced into a generic
//! entry-listing query.

pub mod engine;
pub mod query;
pub mod registry;
pub mod relationships;

pub use engine::Engine;
pub use query::{EntryQuery, OrderBy, Relation, RelationshipFilter, Segment};
pub use registry::Registry;
pub use relationships::{Relationship, RelationshipDef, ReplaceOutcome};

//! Core types and errors for the weftdb workspace.
//!
//! Everything here is plain data: entry identifiers, relationship
//! descriptors, edge rows, and the shared error taxonomy. Storage and
//! engine crates build on these without adding their own error types.

pub mod error;
pub mod types;

pub use error::{WeftError, WeftResult};
pub use types::{
    Cardinality, Edge, EdgeFilter, EntryId, EntryStatus, RelationshipArgs, RelationshipKey,
    SideUi, MAX_RELATIONSHIP_NAME_LEN,
};

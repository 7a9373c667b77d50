//! weftdb: an embedded relationship engine for structured content
//! entries.
//!
//! Entries (typed content items) are connected by named post-to-post
//! relationships stored as rows in a denormalized join table. The crate
//! provides relationship definitions with cardinality enforcement,
//! bidirectional self-referential relationships backed by mirror rows,
//! manual per-side ordering, relationship-aware entry listing, and edge
//! garbage collection on permanent entry deletion.
//!
//! ```no_run
//! use weftdb::{Engine, EntryQuery, RelationshipFilter};
//!
//! # fn main() -> weftdb::WeftResult<()> {
//! let engine = Engine::in_memory()?;
//! engine.register_entry_type("person")?;
//! engine.register_entry_type("company")?;
//!
//! let employment =
//!     engine.define_post_to_post("person", &["company"], "employment", Default::default())?;
//!
//! let alice = engine.create_entry("person")?;
//! let acme = engine.create_entry("company")?;
//! employment.add_relationship(alice, acme)?;
//!
//! let staff = engine.find_entries(
//!     &EntryQuery::new("person").related(RelationshipFilter::single(acme, "employment")),
//! )?;
//! assert_eq!(staff, vec![alice]);
//! # Ok(())
//! # }
//! ```

pub use weft_core::{
    Cardinality, Edge, EdgeFilter, EntryId, EntryStatus, RelationshipArgs, RelationshipKey,
    SideUi, WeftError, WeftResult, MAX_RELATIONSHIP_NAME_LEN,
};
pub use weft_engine::{
    Engine, EntryQuery, OrderBy, Relation, Registry, Relationship, RelationshipDef,
    RelationshipFilter, ReplaceOutcome, Segment,
};
pub use weft_storage::{Database, EdgeStore, EntryRow, EntryStore};

//! SQLite-backed durable stores for weftdb.
//!
//! Two tables matter here: the entry table (the host system's content
//! items, with type and status) and the edge table (the denormalized
//! relationship join table). Schema installation is versioned and
//! idempotent.

pub mod db;
pub mod edges;
pub mod entries;
pub mod schema;

pub use db::{sql_err, Database};
pub use edges::EdgeStore;
pub use entries::{EntryRow, EntryStore};

//! Connection ownership and transaction plumbing.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;

use weft_core::{WeftError, WeftResult};

use crate::schema;

/// Map a rusqlite error into the workspace error type.
pub fn sql_err(e: rusqlite::Error) -> WeftError {
    WeftError::storage(e.to_string())
}

/// Owner of the SQLite connection.
///
/// The engine is synchronous and request-scoped, so a single mutex-guarded
/// connection is the whole concurrency story. All multi-statement
/// operations go through [`Database::transaction`], which also gives
/// cardinality checks and their writes a single atomic scope.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database file and install the schema.
    pub fn open(path: impl AsRef<Path>) -> WeftResult<Arc<Self>> {
        let conn = Connection::open(path).map_err(sql_err)?;
        Self::init(conn)
    }

    /// Open a fresh in-memory database. Used by tests and ephemeral tools.
    pub fn in_memory() -> WeftResult<Arc<Self>> {
        let conn = Connection::open_in_memory().map_err(sql_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> WeftResult<Arc<Self>> {
        schema::ensure(&conn)?;
        Ok(Arc::new(Self {
            conn: Mutex::new(conn),
        }))
    }

    /// Run a closure against the connection.
    pub fn with<T>(&self, f: impl FnOnce(&Connection) -> WeftResult<T>) -> WeftResult<T> {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Run a closure inside a transaction; commit on `Ok`, roll back on
    /// `Err`.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&rusqlite::Transaction<'_>) -> WeftResult<T>,
    ) -> WeftResult<T> {
        let mut conn = self.conn.lock();
        let txn = conn.transaction().map_err(sql_err)?;
        let out = f(&txn)?;
        txn.commit().map_err(sql_err)?;
        Ok(out)
    }
}

//! SQLite read model of the customer analytics view.
//!
//! RULE: Only the store talks to the database.
//! Callers go through CustomerStore methods; they never run SQL, and
//! customer ids are always bound as parameters.

use crate::error::RetentionResult;
use rusqlite::Connection;

mod customer;

pub struct CustomerStore {
    conn: Connection,
}

impl CustomerStore {
    /// Open (or create) the customer database at `path`.
    pub fn open(path: &str) -> RetentionResult<Self> {
        let conn = Connection::open(path)?;
        // WAL only matters for real files; in-memory databases ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> RetentionResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> RetentionResult<()> {
        self.conn.execute_batch(include_str!("../../../migrations/001_customers.sql"))?;
        Ok(())
    }
}

//! Snapshot sources.
//!
//! RULE: Only the store talks to the database or the filesystem.
//! Views and analytics receive a finished `CustomerSnapshot`.

use crate::{error::DeskResult, snapshot::CustomerSnapshot};
use rusqlite::Connection;

mod customer;
mod json;

pub use json::JsonFileSource;

/// Anything that can hand the desk a full customer snapshot, newest first.
pub trait SnapshotSource {
    fn load_snapshot(&self) -> DeskResult<CustomerSnapshot>;
}

pub struct CustomerStore {
    conn: Connection,
}

impl CustomerStore {
    pub fn open(path: &str) -> DeskResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DeskResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DeskResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_customers.sql"))?;
        Ok(())
    }
}

impl SnapshotSource for CustomerStore {
    fn load_snapshot(&self) -> DeskResult<CustomerSnapshot> {
        let records = self.all_customers()?;
        log::info!("store: loaded {} customers from sqlite", records.len());
        Ok(CustomerSnapshot::new(chrono::Utc::now(), records))
    }
}

//! SQLite persistence layer.
//!
//! RULE: Only the store module talks to the database.
//! The app and engine go through `PersistenceGateway`; they never execute SQL.

use crate::{
    error::NpsResult,
    gateway::{LoadedRecord, PersistenceGateway},
    record::ScoreRecord,
    types::AdvisorName,
};
use rusqlite::Connection;

mod advisor;
mod score;

pub struct NpsStore {
    conn: Connection,
}

impl NpsStore {
    pub fn open(path: &str) -> NpsResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        log::debug!("opened store at {path}");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> NpsResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> NpsResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_advisors.sql"))?;
        Ok(())
    }
}

impl PersistenceGateway for NpsStore {
    fn load_all_records(&self) -> NpsResult<Vec<LoadedRecord>> {
        self.all_records()
    }

    fn load_advisors(&self) -> NpsResult<Vec<AdvisorName>> {
        self.advisor_names()
    }

    fn save_record(&self, month: &str, advisor: &str, record: &ScoreRecord) -> NpsResult<()> {
        self.upsert_record(month, advisor, record)
    }

    fn save_advisor(&self, name: &str) -> NpsResult<()> {
        self.insert_advisor(name)
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

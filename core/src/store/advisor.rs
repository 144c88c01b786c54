use super::{now_rfc3339, NpsStore};
use crate::{error::NpsResult, types::AdvisorName};
use rusqlite::params;

impl NpsStore {
    // ── Advisor roster ─────────────────────────────────────────────

    /// Duplicate names are ignored, so repeated saves are harmless.
    pub fn insert_advisor(&self, name: &str) -> NpsResult<()> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO advisor (name, created_at) VALUES (?1, ?2)",
            params![name, now_rfc3339()],
        )?;
        if inserted == 0 {
            log::debug!("advisor '{name}' already stored");
        }
        Ok(())
    }

    pub fn advisor_names(&self) -> NpsResult<Vec<AdvisorName>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM advisor ORDER BY name ASC")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

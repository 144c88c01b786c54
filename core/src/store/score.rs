use super::{now_rfc3339, NpsStore};
use crate::{
    error::NpsResult,
    gateway::LoadedRecord,
    record::{CommentTally, ScoreDistribution, ScoreRecord},
};
use rusqlite::params;

struct RawRow {
    month: String,
    advisor: String,
    scores: String,
    comments: String,
}

fn raw_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        month: row.get(0)?,
        advisor: row.get(1)?,
        scores: row.get(2)?,
        comments: row.get(3)?,
    })
}

fn decode(raw: RawRow) -> NpsResult<LoadedRecord> {
    let scores: ScoreDistribution = serde_json::from_str(&raw.scores)?;
    let comments: CommentTally = serde_json::from_str(&raw.comments)?;
    Ok(LoadedRecord {
        month: raw.month,
        advisor: raw.advisor,
        record: ScoreRecord::new(scores, comments),
    })
}

impl NpsStore {
    // ── Score records ──────────────────────────────────────────────

    /// Last write wins; `created_at` survives an overwrite.
    pub fn upsert_record(&self, month: &str, advisor: &str, record: &ScoreRecord) -> NpsResult<()> {
        let scores = serde_json::to_string(&record.scores)?;
        let comments = serde_json::to_string(&record.comments)?;
        let now = now_rfc3339();
        self.conn.execute(
            "INSERT INTO nps_record (month, advisor, scores, comments, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT (month, advisor) DO UPDATE SET
                scores = excluded.scores,
                comments = excluded.comments,
                updated_at = excluded.updated_at",
            params![month, advisor, scores, comments, now],
        )?;
        Ok(())
    }

    pub fn all_records(&self) -> NpsResult<Vec<LoadedRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT month, advisor, scores, comments
             FROM nps_record ORDER BY month ASC, advisor ASC",
        )?;
        let raw = stmt
            .query_map([], raw_row_mapper)?
            .collect::<Result<Vec<_>, _>>()?;
        raw.into_iter().map(decode).collect()
    }
}

//! Persistence gateway — the durable side of the working set.
//!
//! RULE: callers mutate the `AggregationStore` first, then hand the same
//! value to the gateway. A gateway failure is reported back as a
//! `SyncOutcome`; it never undoes the local write.
//!
//! There is no optimistic-concurrency check. Two sessions saving the same
//! (month, advisor) key resolve last-write-wins at the backing store.

use crate::{
    error::{NpsError, NpsResult},
    record::ScoreRecord,
    types::{AdvisorName, MonthId},
};
use serde::{Deserialize, Serialize};

/// One persisted row as returned by `load_all_records`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedRecord {
    pub month: MonthId,
    pub advisor: AdvisorName,
    #[serde(flatten)]
    pub record: ScoreRecord,
}

/// The contract a durable backend must fulfil.
pub trait PersistenceGateway {
    fn load_all_records(&self) -> NpsResult<Vec<LoadedRecord>>;

    fn load_advisors(&self) -> NpsResult<Vec<AdvisorName>>;

    /// Insert or overwrite the record stored under (month, advisor).
    fn save_record(&self, month: &str, advisor: &str, record: &ScoreRecord) -> NpsResult<()>;

    /// Idempotent: saving a name that already exists is a success.
    fn save_advisor(&self, name: &str) -> NpsResult<()>;
}

/// Result of pushing a local mutation to the gateway.
#[derive(Debug)]
pub enum SyncOutcome {
    Synced,
    /// The local value stands; the remote copy is stale.
    Failed(NpsError),
}

impl SyncOutcome {
    pub fn from_result(result: NpsResult<()>) -> Self {
        match result {
            Ok(()) => SyncOutcome::Synced,
            Err(e) => SyncOutcome::Failed(e),
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced)
    }
}

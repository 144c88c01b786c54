//! In-memory working set: month → advisor → ScoreRecord, plus the roster.
//!
//! RULE: this is the single source of truth for the metrics engine during a
//! session. Every operation is synchronous and infallible. Durability lives
//! behind the persistence gateway and never rolls back a local mutation.

use crate::{
    gateway::LoadedRecord,
    record::ScoreRecord,
    types::{AdvisorName, MonthId, NEW_MONTH_SENTINEL},
};
use std::collections::BTreeMap;

static EMPTY_MONTH: BTreeMap<AdvisorName, ScoreRecord> = BTreeMap::new();

#[derive(Debug, Clone, Default)]
pub struct AggregationStore {
    months: BTreeMap<MonthId, BTreeMap<AdvisorName, ScoreRecord>>,
    advisors: Vec<AdvisorName>,
}

impl AggregationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from gateway rows. Later rows for the same key win.
    pub fn from_loaded(rows: Vec<LoadedRecord>, advisors: Vec<AdvisorName>) -> Self {
        let mut store = Self::new();
        for row in rows {
            store.upsert(&row.month, &row.advisor, row.record);
        }
        for name in advisors {
            store.add_advisor(&name);
        }
        store
    }

    // ── Records ───────────────────────────────────────────────────

    /// Replace whatever is stored under (month, advisor). No field merge.
    pub fn upsert(&mut self, month: &str, advisor: &str, record: ScoreRecord) {
        let previous = self
            .months
            .entry(month.to_string())
            .or_default()
            .insert(advisor.to_string(), record);
        log::debug!(
            "upsert {month}/{advisor} ({})",
            if previous.is_some() { "overwrite" } else { "insert" }
        );
    }

    pub fn remove(&mut self, month: &str, advisor: &str) -> Option<ScoreRecord> {
        let month_map = self.months.get_mut(month)?;
        let removed = month_map.remove(advisor);
        if month_map.is_empty() {
            self.months.remove(month);
        }
        removed
    }

    /// Months with data, most recent first. The new-month sentinel is never listed.
    pub fn list_months(&self) -> Vec<MonthId> {
        self.months
            .keys()
            .rev()
            .filter(|m| m.as_str() != NEW_MONTH_SENTINEL)
            .cloned()
            .collect()
    }

    /// Records for `month`, or an empty mapping when the month is unknown.
    pub fn records_for_month(&self, month: &str) -> &BTreeMap<AdvisorName, ScoreRecord> {
        self.months.get(month).unwrap_or(&EMPTY_MONTH)
    }

    pub fn get(&self, month: &str, advisor: &str) -> Option<&ScoreRecord> {
        self.months.get(month).and_then(|m| m.get(advisor))
    }

    pub fn all_records(&self) -> impl Iterator<Item = &ScoreRecord> {
        self.months.values().flat_map(|m| m.values())
    }

    pub fn record_count(&self) -> usize {
        self.months.values().map(BTreeMap::len).sum()
    }

    // ── Roster ────────────────────────────────────────────────────

    /// Append to the roster. Blank names and exact duplicates are ignored.
    /// Returns whether the name was added.
    pub fn add_advisor(&mut self, name: &str) -> bool {
        if name.trim().is_empty() || self.advisors.iter().any(|a| a == name) {
            return false;
        }
        self.advisors.push(name.to_string());
        true
    }

    /// Replace the roster wholesale, keeping the same dedup rules.
    pub fn replace_advisors(&mut self, names: Vec<AdvisorName>) {
        self.advisors.clear();
        for name in names {
            self.add_advisor(&name);
        }
    }

    pub fn advisors(&self) -> &[AdvisorName] {
        &self.advisors
    }
}

//! Metrics engine — NPS figures from score distributions.
//!
//! Everything here is pure arithmetic over resident data. No I/O, no
//! logging on the hot path, no mutation of inputs.
//!
//! Granularities:
//!   1. Single advisor     — `compute_nps` on one record's distribution
//!   2. Whole month        — `compute_general` over the summed distributions
//!   3. All months         — `overall_general` over every record in the store
//!
//! The month and overall figures are recomputed from summed raw counts.
//! They are NOT the mean of per-advisor NPS values.

use crate::{
    aggregation::AggregationStore,
    error::NpsResult,
    record::{CommentTally, ScoreDistribution, ScoreRecord},
    types::{AdvisorName, MonthId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Public types ─────────────────────────────────────────────────────────────

/// Figures derived from one score distribution. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Percentage in [-100, 100], rounded to two decimals.
    pub nps: f64,
    pub promoters: u64,
    pub passives: u64,
    pub detractors: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorMetrics {
    pub advisor: AdvisorName,
    pub metrics: DerivedMetrics,
    pub comment_total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: MonthId,
    pub general: DerivedMetrics,
    pub comment_total: u64,
    pub advisors: Vec<AdvisorMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthTrendPoint {
    pub month: MonthId,
    pub general: DerivedMetrics,
}

// ── Core formula ─────────────────────────────────────────────────────────────

/// Promoters rate 9–10, passives 7–8, detractors 0–6.
pub fn compute_nps(scores: &ScoreDistribution) -> DerivedMetrics {
    let total = scores.total();
    if total == 0 {
        return DerivedMetrics::default();
    }

    let counts = scores.counts();
    let promoters = saturating_sum(&counts[9..=10]);
    let passives = saturating_sum(&counts[7..=8]);
    let detractors = saturating_sum(&counts[..7]);

    let raw = (promoters as f64 - detractors as f64) / total as f64 * 100.0;

    DerivedMetrics {
        nps: round2(raw),
        promoters,
        passives,
        detractors,
        total,
    }
}

/// Validating entry point for untrusted counts.
pub fn compute_nps_raw(counts: &[i64]) -> NpsResult<DerivedMetrics> {
    ScoreDistribution::from_counts(counts).map(|d| compute_nps(&d))
}

fn saturating_sum(counts: &[u64]) -> u64 {
    counts.iter().fold(0u64, |acc, &c| acc.saturating_add(c))
}

/// Round half away from zero to two decimals. Negative zero folds to zero.
fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

// ── Aggregation ──────────────────────────────────────────────────────────────

/// Element-wise sum of the score distributions. Order-independent.
pub fn aggregate_scores<'a, I>(records: I) -> ScoreDistribution
where
    I: IntoIterator<Item = &'a ScoreRecord>,
{
    records
        .into_iter()
        .fold(ScoreDistribution::zero(), |sum, record| sum.combine(&record.scores))
}

/// General metrics for one month: NPS of the summed distribution.
pub fn compute_general(month_records: &BTreeMap<AdvisorName, ScoreRecord>) -> DerivedMetrics {
    compute_nps(&aggregate_scores(month_records.values()))
}

/// General metrics across every month in the store.
pub fn overall_general(store: &AggregationStore) -> DerivedMetrics {
    compute_nps(&aggregate_scores(store.all_records()))
}

// ── Comments ─────────────────────────────────────────────────────────────────

pub fn comment_total(record: &ScoreRecord) -> u64 {
    tally_total(&record.comments)
}

fn tally_total(c: &CommentTally) -> u64 {
    saturating_sum(&[c.positive, c.neutral, c.negative])
}

pub fn month_comment_total(month_records: &BTreeMap<AdvisorName, ScoreRecord>) -> u64 {
    month_records
        .values()
        .fold(0u64, |acc, r| acc.saturating_add(comment_total(r)))
}

// ── Breakdowns ───────────────────────────────────────────────────────────────

/// Per-advisor figures for one month.
///
/// Roster advisors with a record come first, in roster order. Advisors with
/// a record but missing from the roster follow, alphabetically. Roster
/// advisors without a record are skipped.
pub fn advisor_breakdown(
    month_records: &BTreeMap<AdvisorName, ScoreRecord>,
    roster: &[AdvisorName],
) -> Vec<AdvisorMetrics> {
    let on_roster = roster
        .iter()
        .filter_map(|name| month_records.get_key_value(name));
    let off_roster = month_records
        .iter()
        .filter(|(name, _)| !roster.contains(name));

    on_roster
        .chain(off_roster)
        .map(|(advisor, record)| AdvisorMetrics {
            advisor: advisor.clone(),
            metrics: compute_nps(&record.scores),
            comment_total: comment_total(record),
        })
        .collect()
}

pub fn month_summary(month: &str, store: &AggregationStore) -> MonthSummary {
    let records = store.records_for_month(month);
    MonthSummary {
        month: month.to_string(),
        general: compute_general(records),
        comment_total: month_comment_total(records),
        advisors: advisor_breakdown(records, store.advisors()),
    }
}

/// General metrics per month, oldest first.
pub fn month_trend(store: &AggregationStore) -> Vec<MonthTrendPoint> {
    let mut months = store.list_months();
    months.reverse();
    months
        .into_iter()
        .map(|month| {
            let general = compute_general(store.records_for_month(&month));
            MonthTrendPoint { month, general }
        })
        .collect()
}

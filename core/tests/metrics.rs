//! Metrics engine tests.
//!
//! Covers the NPS formula, summation-based month rollups, and the
//! difference between the general figure and a mean of advisor figures.

use nps_core::{
    aggregation::AggregationStore,
    error::NpsError,
    metrics::{
        advisor_breakdown, aggregate_scores, comment_total, compute_general, compute_nps,
        compute_nps_raw, month_comment_total, month_summary, month_trend, overall_general,
        DerivedMetrics,
    },
    record::{CommentTally, ScoreDistribution, ScoreRecord, MAX_BUCKET_COUNT},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn record(scores: [u32; 11]) -> ScoreRecord {
    ScoreRecord::new(ScoreDistribution::new(scores), CommentTally::default())
}

fn with_comments(scores: [u32; 11], positive: u64, neutral: u64, negative: u64) -> ScoreRecord {
    let mut r = record(scores);
    r.comments.positive = positive;
    r.comments.neutral = neutral;
    r.comments.negative = negative;
    r
}

const ABIDAM: [u32; 11] = [2, 3, 3, 0, 0, 2, 1, 14, 35, 47, 20];
const ALL_PROMOTERS_10: [u32; 11] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 10, 0];
const ALL_DETRACTORS_10: [u32; 11] = [10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
/// 60 detractors, 40 promoters: total 100, NPS -20.
const HEAVY_MIXED: [u32; 11] = [60, 0, 0, 0, 0, 0, 0, 0, 0, 0, 40];

// ── Tests ────────────────────────────────────────────────────────────────────

/// The reference distribution from the dashboard's example month.
#[test]
fn reference_distribution_matches_known_figures() {
    let m = compute_nps(&ScoreDistribution::new(ABIDAM));
    assert_eq!(m.total, 127);
    assert_eq!(m.promoters, 67);
    assert_eq!(m.passives, 49);
    assert_eq!(m.detractors, 11);
    assert_eq!(m.nps, 44.09);
}

#[test]
fn empty_distribution_yields_all_zero() {
    let m = compute_nps(&ScoreDistribution::zero());
    assert_eq!(m, DerivedMetrics::default());
    assert_eq!(m.nps, 0.0);
    assert_eq!(m.total, 0);
}

/// Same input, same output, every time.
#[test]
fn compute_nps_is_deterministic() {
    let d = ScoreDistribution::new(ABIDAM);
    let first = compute_nps(&d);
    for _ in 0..10 {
        assert_eq!(compute_nps(&d), first);
    }
}

/// Sweep a deterministic spread of distributions and check the bounds.
#[test]
fn nps_is_bounded_for_many_inputs() {
    let mut state: u64 = 0x5EED;
    for _ in 0..500 {
        let mut counts = [0u32; 11];
        for slot in counts.iter_mut() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            *slot = ((state >> 33) % 50) as u32;
        }
        let m = compute_nps(&ScoreDistribution::new(counts));
        assert!(
            (-100.0..=100.0).contains(&m.nps),
            "NPS out of range for {counts:?}: {}",
            m.nps
        );
        assert_eq!(m.promoters + m.passives + m.detractors, m.total);
    }
}

#[test]
fn extreme_distributions_hit_the_bounds() {
    assert_eq!(compute_nps(&ScoreDistribution::new(ALL_PROMOTERS_10)).nps, 100.0);
    assert_eq!(compute_nps(&ScoreDistribution::new(ALL_DETRACTORS_10)).nps, -100.0);
}

#[test]
fn raw_input_is_validated_before_computing() {
    assert!(matches!(
        compute_nps_raw(&[1, 2, 3]),
        Err(NpsError::ScoreLength { expected: 11, actual: 3 })
    ));
    assert!(matches!(
        compute_nps_raw(&[0, 0, 0, 0, 0, 0, 0, 0, 0, -2, 0]),
        Err(NpsError::NegativeScore { index: 9, value: -2 })
    ));
    let ok = compute_nps_raw(&[2, 3, 3, 0, 0, 2, 1, 14, 35, 47, 20]).unwrap();
    assert_eq!(ok.nps, 44.09);
}

/// Huge untrusted counts are rejected instead of overflowing the totals.
#[test]
fn oversized_raw_counts_are_rejected() {
    assert!(matches!(
        compute_nps_raw(&[i64::MAX; 11]),
        Err(NpsError::ScoreTooLarge { index: 0, .. })
    ));
    let mut counts = [0i64; 11];
    counts[10] = i64::from(MAX_BUCKET_COUNT) + 1;
    assert!(matches!(
        compute_nps_raw(&counts),
        Err(NpsError::ScoreTooLarge { index: 10, .. })
    ));
}

/// Every bucket at the ceiling, across many records, still computes.
#[test]
fn max_buckets_compute_without_overflow() {
    let full = record([MAX_BUCKET_COUNT; 11]);
    let single = compute_nps(&full.scores);
    assert_eq!(single.total, 11 * u64::from(MAX_BUCKET_COUNT));
    assert_eq!(single.nps, -45.45);

    let many: Vec<ScoreRecord> = (0..64).map(|_| full).collect();
    let summed = aggregate_scores(&many);
    let general = compute_nps(&summed);
    assert_eq!(general.total, 64 * 11 * u64::from(MAX_BUCKET_COUNT));
    assert_eq!(general.nps, single.nps);
}

#[test]
fn aggregate_is_order_independent() {
    let a = record(ABIDAM);
    let b = record(HEAVY_MIXED);
    let c = record(ALL_PROMOTERS_10);

    let abc = aggregate_scores([&a, &b, &c]);
    let cab = aggregate_scores([&c, &a, &b]);
    assert_eq!(abc, cab);

    // (a + b) + c == a + (b + c)
    let ab = ScoreRecord::new(aggregate_scores([&a, &b]), CommentTally::default());
    let bc = ScoreRecord::new(aggregate_scores([&b, &c]), CommentTally::default());
    assert_eq!(aggregate_scores([&ab, &c]), aggregate_scores([&a, &bc]));
    assert_eq!(aggregate_scores([&ab, &c]), abc);
}

#[test]
fn aggregate_of_nothing_is_zero() {
    assert_eq!(aggregate_scores(std::iter::empty()), ScoreDistribution::zero());
}

/// Equal-weight pair: the general figure happens to equal the mean.
#[test]
fn general_for_equal_weight_pair() {
    let mut store = AggregationStore::new();
    store.upsert("2024-01", "A", record(ALL_PROMOTERS_10));
    store.upsert("2024-01", "B", record(ALL_DETRACTORS_10));

    let month = store.records_for_month("2024-01");
    assert_eq!(
        aggregate_scores(month.values()),
        ScoreDistribution::new([10, 0, 0, 0, 0, 0, 0, 0, 0, 10, 0])
    );

    let g = compute_general(month);
    assert_eq!(g.total, 20);
    assert_eq!(g.promoters, 10);
    assert_eq!(g.detractors, 10);
    assert_eq!(g.nps, 0.0);
}

/// Unequal totals (10 vs 100): the general figure comes from summed counts
/// and must differ from the mean of the two advisor figures.
#[test]
fn general_is_not_the_mean_of_advisor_nps() {
    let mut store = AggregationStore::new();
    store.upsert("2024-01", "A", record(ALL_PROMOTERS_10));
    store.upsert("2024-01", "B", record(HEAVY_MIXED));
    let month = store.records_for_month("2024-01");

    let a = compute_nps(&ScoreDistribution::new(ALL_PROMOTERS_10));
    let b = compute_nps(&ScoreDistribution::new(HEAVY_MIXED));
    assert_eq!(a.nps, 100.0);
    assert_eq!(b.nps, -20.0);
    let mean = (a.nps + b.nps) / 2.0;

    let general = compute_general(month);
    assert_eq!(general, compute_nps(&aggregate_scores(month.values())));
    assert_eq!(general.total, 110);
    assert_eq!(general.nps, -9.09);
    assert_ne!(general.nps, mean, "general NPS must not be an average of advisor NPS");
}

#[test]
fn comment_totals_ignore_categories() {
    let mut r = with_comments(ABIDAM, 15, 8, 4);
    r.comments.categories.service = 500;
    assert_eq!(comment_total(&r), 27);

    let mut store = AggregationStore::new();
    store.upsert("2024-01", "A", r);
    store.upsert("2024-01", "B", with_comments(HEAVY_MIXED, 1, 1, 2));
    assert_eq!(month_comment_total(store.records_for_month("2024-01")), 31);
}

#[test]
fn breakdown_follows_roster_then_unknown_advisors() {
    let mut store = AggregationStore::new();
    for name in ["Zed", "Leo", "Abidam"] {
        store.add_advisor(name);
    }
    store.upsert("2024-01", "Abidam", record(ABIDAM));
    store.upsert("2024-01", "Zed", record(ALL_PROMOTERS_10));
    store.upsert("2024-01", "Guest", record(ALL_DETRACTORS_10));

    let rows = advisor_breakdown(store.records_for_month("2024-01"), store.advisors());
    let names: Vec<&str> = rows.iter().map(|r| r.advisor.as_str()).collect();
    assert_eq!(names, vec!["Zed", "Abidam", "Guest"], "Leo has no record and is skipped");
    assert_eq!(rows[1].metrics.nps, 44.09);
}

#[test]
fn summary_trend_and_overall_rollups() {
    let mut store = AggregationStore::new();
    store.upsert("2024-01", "A", record(ALL_PROMOTERS_10));
    store.upsert("2024-02", "A", record(ALL_DETRACTORS_10));
    store.upsert("2024-02", "B", record(ALL_DETRACTORS_10));

    let summary = month_summary("2024-02", &store);
    assert_eq!(summary.general.total, 20);
    assert_eq!(summary.general.nps, -100.0);

    let trend = month_trend(&store);
    let months: Vec<&str> = trend.iter().map(|p| p.month.as_str()).collect();
    assert_eq!(months, vec!["2024-01", "2024-02"]);
    assert_eq!(trend[0].general.nps, 100.0);

    let overall = overall_general(&store);
    assert_eq!(overall.total, 30);
    assert_eq!(overall.promoters, 10);
    assert_eq!(overall.detractors, 20);
    assert_eq!(overall.nps, -33.33);

    let missing = month_summary("1999-01", &store);
    assert_eq!(missing.general, DerivedMetrics::default());
    assert!(missing.advisors.is_empty());
}

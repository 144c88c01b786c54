//! Canonical shape of one advisor's monthly survey data.

use crate::{
    error::{NpsError, NpsResult},
    types::RATING_BUCKETS,
};
use serde::{Deserialize, Serialize};

/// Largest respondent count a single rating bucket may hold.
pub const MAX_BUCKET_COUNT: u32 = u32::MAX;

/// Respondent counts per rating. Index `i` holds how many people answered `i`.
///
/// Buckets entered or loaded for one record are bounded by `MAX_BUCKET_COUNT`,
/// so the same values always round-trip through storage. Sums of many records
/// (see `combine`) are held as `u64` and saturate instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<u64>")]
pub struct ScoreDistribution([u64; RATING_BUCKETS]);

impl ScoreDistribution {
    pub fn new(counts: [u32; RATING_BUCKETS]) -> Self {
        Self(counts.map(u64::from))
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Validate untrusted input: exactly 11 entries, each in 0..=MAX_BUCKET_COUNT.
    pub fn from_counts(counts: &[i64]) -> NpsResult<Self> {
        if counts.len() != RATING_BUCKETS {
            return Err(NpsError::ScoreLength {
                expected: RATING_BUCKETS,
                actual: counts.len(),
            });
        }
        let mut out = [0u64; RATING_BUCKETS];
        for (index, &value) in counts.iter().enumerate() {
            if value < 0 {
                return Err(NpsError::NegativeScore { index, value });
            }
            if value > i64::from(MAX_BUCKET_COUNT) {
                return Err(NpsError::ScoreTooLarge {
                    index,
                    value,
                    max: MAX_BUCKET_COUNT,
                });
            }
            out[index] = value as u64;
        }
        Ok(Self(out))
    }

    pub fn counts(&self) -> &[u64; RATING_BUCKETS] {
        &self.0
    }

    pub fn get(&self, rating: usize) -> Option<u64> {
        self.0.get(rating).copied()
    }

    pub fn set(&mut self, rating: usize, count: u32) -> NpsResult<()> {
        let slot = self
            .0
            .get_mut(rating)
            .ok_or(NpsError::RatingOutOfRange { rating })?;
        *slot = u64::from(count);
        Ok(())
    }

    /// Element-wise saturating sum.
    pub fn combine(&self, other: &ScoreDistribution) -> ScoreDistribution {
        let mut out = self.0;
        for (slot, count) in out.iter_mut().zip(other.0) {
            *slot = slot.saturating_add(count);
        }
        Self(out)
    }

    pub fn total(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, &c| acc.saturating_add(c))
    }
}

impl TryFrom<Vec<i64>> for ScoreDistribution {
    type Error = NpsError;

    fn try_from(value: Vec<i64>) -> Result<Self, Self::Error> {
        Self::from_counts(&value)
    }
}

impl From<ScoreDistribution> for Vec<u64> {
    fn from(value: ScoreDistribution) -> Self {
        value.0.to_vec()
    }
}

/// Comment counts by topic. Entered independently of the sentiment counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentCategories {
    pub price: u64,
    pub delivery: u64,
    pub service: u64,
    pub inventory: u64,
    pub other: u64,
}

/// Comment tally for one advisor-month.
///
/// Category counts are never reconciled against the sentiment counts;
/// the two tallies are free-form and may disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentTally {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    pub categories: CommentCategories,
}

/// One advisor's score distribution and comment tally for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub scores: ScoreDistribution,
    pub comments: CommentTally,
}

impl ScoreRecord {
    pub fn new(scores: ScoreDistribution, comments: CommentTally) -> Self {
        Self { scores, comments }
    }
}

//! Shared primitive types used across the whole crate.

use crate::error::{NpsError, NpsResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Month identifier, zero-padded `YYYY-MM`.
pub type MonthId = String;

/// Advisor display name. Unique within a month, case-sensitive.
pub type AdvisorName = String;

/// Selector value that stands for "create a new month".
pub const NEW_MONTH_SENTINEL: &str = "new";

/// Number of rating buckets on the 0..=10 survey scale.
pub const RATING_BUCKETS: usize = 11;

/// Validate a month identifier. Lexicographic order on valid ids is
/// chronological order, which the store relies on.
pub fn validate_month(value: &str) -> NpsResult<MonthId> {
    let invalid = || NpsError::InvalidMonth {
        value: value.to_string(),
    };
    if value.len() != 7 || value.as_bytes()[4] != b'-' {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").map_err(|_| invalid())?;
    Ok(value.to_string())
}

/// Current calendar month in UTC.
pub fn current_month() -> MonthId {
    chrono::Utc::now().format("%Y-%m").to_string()
}

/// What the month picker points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthSelector {
    Existing(MonthId),
    #[serde(rename = "new")]
    NewMonth,
}

impl MonthSelector {
    /// Parse a raw picker value; the sentinel maps to `NewMonth`.
    pub fn parse(value: &str) -> NpsResult<Self> {
        if value == NEW_MONTH_SENTINEL {
            Ok(MonthSelector::NewMonth)
        } else {
            validate_month(value).map(MonthSelector::Existing)
        }
    }

    pub fn month(&self) -> Option<&str> {
        match self {
            MonthSelector::Existing(m) => Some(m),
            MonthSelector::NewMonth => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The sentinel serializes to the same literal the picker sends.
    #[test]
    fn new_month_serializes_as_sentinel() {
        let json = serde_json::to_string(&MonthSelector::NewMonth).unwrap();
        assert_eq!(json, format!("\"{NEW_MONTH_SENTINEL}\""));
        let back: MonthSelector = serde_json::from_str("\"new\"").unwrap();
        assert_eq!(back, MonthSelector::NewMonth);
        assert_eq!(
            serde_json::to_string(&MonthSelector::Existing("2024-01".into())).unwrap(),
            r#"{"existing":"2024-01"}"#
        );
    }

    #[test]
    fn accepts_zero_padded_months() {
        assert_eq!(validate_month("2024-01").unwrap(), "2024-01");
        assert_eq!(validate_month("1999-12").unwrap(), "1999-12");
    }

    #[test]
    fn rejects_malformed_months() {
        for bad in ["2024-1", "2024-13", "2024-00", "24-01", "2024/01", "", "new"] {
            assert!(validate_month(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn sentinel_parses_to_new_month() {
        assert_eq!(MonthSelector::parse("new").unwrap(), MonthSelector::NewMonth);
        assert_eq!(
            MonthSelector::parse("2024-03").unwrap(),
            MonthSelector::Existing("2024-03".into())
        );
    }
}

//! Export serializer — metrics tables to delimited text.
//!
//! Column names and order for month exports are a downstream contract.
//! Add columns at the end; never rename or reorder existing ones.

use crate::{
    aggregation::AggregationStore,
    metrics::{comment_total, compute_nps},
};
use serde::Serialize;

pub const DEFAULT_SEPARATOR: char = ',';
pub const EXPORT_MIME_TYPE: &str = "text/csv";

pub const MONTH_EXPORT_COLUMNS: [&str; 11] = [
    "month",
    "advisor",
    "nps",
    "total_responses",
    "promoters",
    "passives",
    "detractors",
    "total_comments",
    "positive_comments",
    "neutral_comments",
    "negative_comments",
];

// ── Values and rows ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportValue {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl ExportValue {
    fn render(&self, separator: char) -> String {
        match self {
            ExportValue::Text(s) => quote_text(s, separator),
            ExportValue::Int(n) => n.to_string(),
            ExportValue::UInt(n) => n.to_string(),
            ExportValue::Float(f) if *f == 0.0 => "0".to_string(),
            ExportValue::Float(f) => f.to_string(),
            ExportValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for ExportValue {
    fn from(value: &str) -> Self {
        ExportValue::Text(value.to_string())
    }
}

impl From<String> for ExportValue {
    fn from(value: String) -> Self {
        ExportValue::Text(value)
    }
}

impl From<i64> for ExportValue {
    fn from(value: i64) -> Self {
        ExportValue::Int(value)
    }
}

impl From<u64> for ExportValue {
    fn from(value: u64) -> Self {
        ExportValue::UInt(value)
    }
}

impl From<f64> for ExportValue {
    fn from(value: f64) -> Self {
        ExportValue::Float(value)
    }
}

impl From<bool> for ExportValue {
    fn from(value: bool) -> Self {
        ExportValue::Bool(value)
    }
}

/// A flat record whose key order is its column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportRow {
    fields: Vec<(String, ExportValue)>,
}

impl ExportRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<ExportValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Replaces the value if `key` exists, otherwise appends a column.
    pub fn insert(&mut self, key: &str, value: impl Into<ExportValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ExportValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ── Serialization ────────────────────────────────────────────────────────────

fn quote_text(value: &str, separator: char) -> String {
    let needs_quotes = value.contains(separator)
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render rows as delimited text.
///
/// The header comes from the first row's keys. Later rows are rendered in
/// that key order; a key missing from a row renders as an empty field.
/// Lines are joined with `\n` and there is no trailing newline.
pub fn to_delimited_text(rows: &[ExportRow], separator: char) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };

    let headers: Vec<&str> = first.keys().collect();
    let sep = separator.to_string();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|h| quote_text(h, separator))
            .collect::<Vec<_>>()
            .join(&sep),
    );
    for row in rows {
        lines.push(
            headers
                .iter()
                .map(|h| row.get(h).map(|v| v.render(separator)).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(&sep),
        );
    }
    lines.join("\n")
}

/// One row per advisor with a record in `month`, in `records_for_month` order.
pub fn build_month_export_rows(month: &str, store: &AggregationStore) -> Vec<ExportRow> {
    store
        .records_for_month(month)
        .iter()
        .map(|(advisor, record)| {
            let m = compute_nps(&record.scores);
            let c = &record.comments;
            let values: [ExportValue; 11] = [
                month.into(),
                advisor.as_str().into(),
                m.nps.into(),
                m.total.into(),
                m.promoters.into(),
                m.passives.into(),
                m.detractors.into(),
                comment_total(record).into(),
                c.positive.into(),
                c.neutral.into(),
                c.negative.into(),
            ];
            MONTH_EXPORT_COLUMNS
                .iter()
                .zip(values)
                .fold(ExportRow::new(), |row, (key, value)| row.with(key, value))
        })
        .collect()
}

// ── Files ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportFile {
    pub filename: String,
    pub mime_type: String,
    pub content: String,
}

/// `NPS_<scope>_<month>.csv`
pub fn export_filename(scope: &str, month: &str) -> String {
    format!("NPS_{scope}_{month}.csv")
}

pub fn export_month(scope: &str, month: &str, store: &AggregationStore) -> ExportFile {
    let rows = build_month_export_rows(month, store);
    log::debug!("exporting {} rows for {month}", rows.len());
    ExportFile {
        filename: export_filename(scope, month),
        mime_type: EXPORT_MIME_TYPE.to_string(),
        content: to_delimited_text(&rows, DEFAULT_SEPARATOR),
    }
}

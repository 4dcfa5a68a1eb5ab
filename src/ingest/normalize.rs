//! Canonicalizes vote indicators and dates.
//!
//! Two dataset shapes exist: boolean-coded (`true`, `TRUE`, `1`) and
//! label-coded (`positive` / `negative`). A [`VotePolicy`] is picked per
//! dataset instead of branching inline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::report::RejectReason;
use super::types::{RawRecord, ReviewRecord};
use super::validate::{ReviewSchema, ValidRow, validate};

/// Date formats tried, in order, against the first token of the date field.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// How a vote-indicator cell maps to `voted_up`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum VotePolicy {
    /// `true`, `TRUE` and `1` are positive; anything else is negative.
    #[default]
    BooleanLiteral,
    /// The configured label is positive; anything else is negative.
    Label { positive: String },
}

impl VotePolicy {
    pub fn default_label() -> Self {
        VotePolicy::Label {
            positive: "positive".to_string(),
        }
    }

    /// Decodes a present vote cell.
    ///
    /// The canonical `true`/`false` literals are honoured by every strategy, so
    /// feeding a decoded value back in returns it unchanged.
    pub fn decode(&self, value: &str) -> bool {
        let value = value.trim();
        match value {
            "true" => return true,
            "false" => return false,
            _ => {}
        }
        match self {
            VotePolicy::BooleanLiteral => matches!(value, "TRUE" | "1"),
            VotePolicy::Label { positive } => value == positive,
        }
    }
}

/// Parses the first whitespace-delimited token of `value` as a calendar date.
/// Any time-of-day suffix is discarded.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let token = value.split_whitespace().next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
}

/// Converts a presence-checked row into a [`ReviewRecord`].
pub fn normalize(row: ValidRow<'_>, policy: &VotePolicy) -> Result<ReviewRecord, RejectReason> {
    let date = parse_date(row.date).ok_or(RejectReason::InvalidDate)?;
    Ok(ReviewRecord {
        date,
        voted_up: policy.decode(row.vote),
    })
}

/// Validates then normalizes one raw row.
pub fn review_from_raw(record: &RawRecord, schema: &ReviewSchema) -> Result<ReviewRecord, RejectReason> {
    normalize(validate(record, schema)?, &schema.policy)
}

/// Parses a numeric cell, tolerating thousands separators (`"1,234.5"`).
pub fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

//! Presence checks that run before any parsing.

use serde::{Deserialize, Serialize};

use super::normalize::VotePolicy;
use super::report::RejectReason;
use super::types::RawRecord;

/// Which columns of a review dataset carry the date and the vote, and how the
/// vote is encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSchema {
    pub date_column: String,
    pub vote_column: String,
    #[serde(default)]
    pub policy: VotePolicy,
}

impl ReviewSchema {
    /// Steam review export: `timestamp_updated` plus a boolean-coded `voted_up`.
    pub fn boolean_coded() -> Self {
        Self {
            date_column: "timestamp_updated".to_string(),
            vote_column: "voted_up".to_string(),
            policy: VotePolicy::BooleanLiteral,
        }
    }

    /// Six-month sentiment dump: `timestamp` plus a `rating` label.
    pub fn label_coded() -> Self {
        Self {
            date_column: "timestamp".to_string(),
            vote_column: "rating".to_string(),
            policy: VotePolicy::default_label(),
        }
    }
}

/// A row that passed presence checks, borrowing the two cells of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidRow<'a> {
    pub date: &'a str,
    pub vote: &'a str,
}

/// Checks that `record` carries a non-empty date and a vote indicator.
///
/// An explicit negative indicator (`false`, `0`, `negative`) is accepted here;
/// only a missing one is rejected.
pub fn validate<'a>(record: &'a RawRecord, schema: &ReviewSchema) -> Result<ValidRow<'a>, RejectReason> {
    let date = record
        .non_empty(&schema.date_column)
        .ok_or(RejectReason::MissingDate)?;
    let vote = record
        .non_empty(&schema.vote_column)
        .ok_or(RejectReason::MissingVote)?;
    Ok(ValidRow { date, vote })
}

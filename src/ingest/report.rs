//! Row rejection reasons and the per-run ingest report.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Why a row was excluded from the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    #[error("date field missing or empty")]
    MissingDate,
    #[error("date field could not be parsed")]
    InvalidDate,
    #[error("vote indicator missing")]
    MissingVote,
    #[error("category field missing or empty")]
    MissingCategory,
    #[error("label field missing or empty")]
    MissingLabel,
    #[error("numeric field missing or unparsable")]
    InvalidNumber,
}

/// Counts accumulated while a pipeline walks its rows.
///
/// Returned by value from each ingest pass; nothing here is global.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub rows_read: usize,
    pub accepted: usize,
    pub rejected: BTreeMap<RejectReason, usize>,
}

impl IngestReport {
    pub fn accept(&mut self) {
        self.rows_read += 1;
        self.accepted += 1;
    }

    pub fn reject(&mut self, reason: RejectReason) {
        self.rows_read += 1;
        *self.rejected.entry(reason).or_default() += 1;
    }

    /// Records a reason against a row that is still kept (e.g. a blank playtime
    /// cell inside an otherwise valid category row).
    pub fn note(&mut self, reason: RejectReason) {
        *self.rejected.entry(reason).or_default() += 1;
    }

    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }

    pub fn rejected_for(&self, reason: RejectReason) -> usize {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }

    /// Emits the report as structured log events for `chart`.
    pub fn log(&self, chart: &str) {
        info!(
            chart,
            rows_read = self.rows_read,
            accepted = self.accepted,
            rejected = self.rejected_total(),
            "Ingest complete"
        );
        for (reason, count) in &self.rejected {
            warn!(chart, %reason, count, "Rows rejected");
        }
    }
}

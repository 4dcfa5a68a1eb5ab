//! Row validation and normalization.
//!
//! Raw CSV rows go through [`validate`] (presence checks) and then
//! [`normalize`] (vote policy and date parsing). Rejections are returned per
//! row and tallied in an [`IngestReport`].

pub mod normalize;
pub mod report;
pub mod types;
pub mod validate;

pub use normalize::{VotePolicy, parse_date, parse_number, review_from_raw};
pub use report::{IngestReport, RejectReason};
pub use types::{CategoryTotal, QuarterAggregate, QuarterKey, RawRecord, ReviewRecord};
pub use validate::{ReviewSchema, validate};

use tracing::debug;

/// Runs every row through validation and normalization, keeping the accepted
/// records in source order.
pub fn ingest_reviews(rows: &[RawRecord], schema: &ReviewSchema) -> (Vec<ReviewRecord>, IngestReport) {
    let mut report = IngestReport::default();
    let mut records = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        match review_from_raw(row, schema) {
            Ok(record) => {
                report.accept();
                records.push(record);
            }
            Err(reason) => {
                debug!(row = idx, %reason, "Skipping invalid row");
                report.reject(reason);
            }
        }
    }

    (records, report)
}

use crate::ingest::{CategoryTotal, IngestReport, RawRecord, RejectReason, parse_number};
use std::collections::HashMap;
use tracing::debug;

/// Label of the bucket that collects everything past the top N.
pub const OTHER_LABEL: &str = "Other";

/// Accumulates per-category totals in first-seen order.
#[derive(Debug, Default)]
struct Groups {
    index: HashMap<String, usize>,
    totals: Vec<CategoryTotal>,
}

impl Groups {
    fn slot(&mut self, category: &str) -> &mut CategoryTotal {
        let idx = match self.index.get(category) {
            Some(idx) => *idx,
            None => {
                self.totals.push(CategoryTotal::new(category, 0.0));
                self.index.insert(category.to_string(), self.totals.len() - 1);
                self.totals.len() - 1
            }
        };
        &mut self.totals[idx]
    }
}

/// Sums `value_column` per distinct `category_column`.
///
/// A row whose value is empty or not a number still opens its category but
/// adds nothing to it. A row without a category is rejected.
pub fn sum_by_category(
    rows: &[RawRecord],
    category_column: &str,
    value_column: &str,
) -> (Vec<CategoryTotal>, IngestReport) {
    let mut groups = Groups::default();
    let mut report = IngestReport::default();

    for row in rows {
        let Some(category) = row.non_empty(category_column) else {
            report.reject(RejectReason::MissingCategory);
            continue;
        };
        report.accept();

        let slot = groups.slot(category);
        match row.get(value_column).and_then(parse_number) {
            Some(value) => slot.total += value,
            None => {
                debug!(category, column = value_column, "Ignoring non-numeric value");
                report.note(RejectReason::InvalidNumber);
            }
        }
    }

    (groups.totals, report)
}

/// Counts rows per distinct `category_column`, in first-seen order.
pub fn count_by_category(rows: &[RawRecord], category_column: &str) -> (Vec<CategoryTotal>, IngestReport) {
    let mut groups = Groups::default();
    let mut report = IngestReport::default();

    for row in rows {
        match row.non_empty(category_column) {
            Some(category) => {
                report.accept();
                groups.slot(category).total += 1.0;
            }
            None => report.reject(RejectReason::MissingCategory),
        }
    }

    (groups.totals, report)
}

/// Sorts totals descending (ties keep their incoming order), keeps the first
/// `n`, and folds the remainder into a trailing [`OTHER_LABEL`] entry.
///
/// The `Other` entry is always present, with `0` when nothing was folded.
pub fn top_n_with_other(mut totals: Vec<CategoryTotal>, n: usize) -> Vec<CategoryTotal> {
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));

    let rest: f64 = totals.iter().skip(n).map(|t| t.total).sum();
    totals.truncate(n);
    totals.push(CategoryTotal::new(OTHER_LABEL, rest));
    totals
}

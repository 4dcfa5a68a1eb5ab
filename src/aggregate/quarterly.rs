use crate::ingest::{QuarterAggregate, QuarterKey, ReviewRecord};
use std::collections::HashMap;

/// Groups reviews by calendar quarter and counts positive and negative votes.
///
/// Output follows the order in which each quarter is first seen in `records`,
/// not chronological order; see [`sort_chronologically`]. Every record lands in
/// exactly one group, and a quarter with no votes of one kind keeps a zero count.
pub fn aggregate_quarters(records: &[ReviewRecord]) -> Vec<QuarterAggregate> {
    let mut index: HashMap<QuarterKey, usize> = HashMap::new();
    let mut groups: Vec<(QuarterKey, u64, u64)> = Vec::new();

    for record in records {
        let key = QuarterKey::from_date(record.date);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key, 0, 0));
            groups.len() - 1
        });

        let group = &mut groups[slot];
        if record.voted_up {
            group.1 += 1;
        } else {
            group.2 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(key, positive, negative)| QuarterAggregate {
            quarter_start: key.start(),
            positive_count: positive,
            negative_count: negative,
        })
        .collect()
}

/// Sorts aggregates by `quarter_start`, oldest first.
pub fn sort_chronologically(aggregates: &mut [QuarterAggregate]) {
    aggregates.sort_by_key(|a| a.quarter_start);
}

//! Monthly concurrent-player series from a SteamCharts export.

use crate::ingest::{IngestReport, RawRecord, RejectReason, parse_number};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LABEL_COLUMN: &str = "Month";
pub const DEFAULT_VALUE_COLUMN: &str = "Avg. Players";

/// One point on the player-count timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCountPoint {
    pub label: String,
    pub year: Option<i32>,
    pub players: f64,
}

/// Extracts the trailing four-digit year of a label such as `"February 2024"`.
pub fn label_year(label: &str) -> Option<i32> {
    label
        .split_whitespace()
        .last()
        .filter(|t| t.len() == 4 && t.chars().all(|c| c.is_ascii_digit()))
        .and_then(|t| t.parse().ok())
}

/// Builds the player series in source order.
pub fn player_series(
    rows: &[RawRecord],
    label_column: &str,
    value_column: &str,
) -> (Vec<PlayerCountPoint>, IngestReport) {
    let mut report = IngestReport::default();
    let mut points = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(label) = row.non_empty(label_column) else {
            report.reject(RejectReason::MissingLabel);
            continue;
        };
        let Some(players) = row.get(value_column).and_then(parse_number) else {
            report.reject(RejectReason::InvalidNumber);
            continue;
        };

        report.accept();
        points.push(PlayerCountPoint {
            label: label.to_string(),
            year: label_year(label),
            players,
        });
    }

    (points, report)
}

/// Keeps the points whose label falls in `year`.
pub fn filter_by_year(points: &[PlayerCountPoint], year: i32) -> Vec<PlayerCountPoint> {
    points
        .iter()
        .filter(|p| p.year == Some(year))
        .cloned()
        .collect()
}

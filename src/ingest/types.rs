//! Row-level data types shared by the ingest and aggregation stages.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// One CSV row as parsed, column name → cell text.
///
/// A column the row does not carry is *absent* (`get` returns `None`), which is
/// distinct from a present but empty cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    /// Builds a record from `(column, value)` pairs. Later duplicates win.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Returns the trimmed cell, treating an empty cell the same as an absent one.
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).map(str::trim).filter(|v| !v.is_empty())
    }
}

/// A validated, normalized review row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReviewRecord {
    pub date: NaiveDate,
    pub voted_up: bool,
}

/// Calendar quarter of a year, rendered as `"<year>-Q<n>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuarterKey {
    year: i32,
    quarter: u8,
}

impl QuarterKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: (date.month0() / 3 + 1) as u8,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Quarter number, 1 through 4.
    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    /// First day of the quarter.
    pub fn start(&self) -> NaiveDate {
        let month = (u32::from(self.quarter) - 1) * 3 + 1;
        // year came from a valid date or a parsed key and month is in 1..=10.
        NaiveDate::from_ymd_opt(self.year, month, 1).expect("first day of a quarter exists")
    }
}

impl fmt::Display for QuarterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

/// Error returned when a string is not of the form `"<year>-Q<1..4>"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid quarter key '{0}'")]
pub struct ParseQuarterKeyError(String);

impl FromStr for QuarterKey {
    type Err = ParseQuarterKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseQuarterKeyError(s.to_string());
        let (year, quarter) = s.rsplit_once("-Q").ok_or_else(err)?;
        let year: i32 = year.parse().map_err(|_| err())?;
        let quarter: u8 = quarter.parse().map_err(|_| err())?;
        if !(1..=4).contains(&quarter) || NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
            return Err(err());
        }
        Ok(Self { year, quarter })
    }
}

/// Positive/negative vote counts for one quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterAggregate {
    pub quarter_start: NaiveDate,
    pub positive_count: u64,
    pub negative_count: u64,
}

impl QuarterAggregate {
    pub fn total(&self) -> u64 {
        self.positive_count + self.negative_count
    }
}

/// One bar of a category chart (playtime by language, reviews by language).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

impl CategoryTotal {
    pub fn new(category: impl Into<String>, total: f64) -> Self {
        Self {
            category: category.into(),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_quarter_boundaries() {
        assert_eq!(QuarterKey::from_date(date(2022, 3, 1)).to_string(), "2022-Q1");
        assert_eq!(QuarterKey::from_date(date(2022, 3, 31)).to_string(), "2022-Q1");
        assert_eq!(QuarterKey::from_date(date(2022, 4, 1)).to_string(), "2022-Q2");
        assert_eq!(QuarterKey::from_date(date(2022, 12, 31)).to_string(), "2022-Q4");
    }

    #[test]
    fn test_quarter_start() {
        assert_eq!(QuarterKey::from_date(date(2022, 8, 17)).start(), date(2022, 7, 1));
        assert_eq!(QuarterKey::from_date(date(2021, 1, 1)).start(), date(2021, 1, 1));
        assert_eq!(QuarterKey::from_date(date(2021, 11, 30)).start(), date(2021, 10, 1));
    }

    #[test]
    fn test_quarter_key_parse() {
        let key: QuarterKey = "2023-Q3".parse().unwrap();
        assert_eq!(key.year(), 2023);
        assert_eq!(key.quarter(), 3);
        assert_eq!(key.start(), date(2023, 7, 1));

        assert!("2023-Q0".parse::<QuarterKey>().is_err());
        assert!("2023-Q5".parse::<QuarterKey>().is_err());
        assert!("2023Q1".parse::<QuarterKey>().is_err());
        assert!("abcd-Q1".parse::<QuarterKey>().is_err());
    }

    #[test]
    fn test_raw_record_absent_vs_empty() {
        let record = RawRecord::from_pairs([("timestamp", "  "), ("rating", "negative")]);
        assert_eq!(record.get("timestamp"), Some("  "));
        assert_eq!(record.non_empty("timestamp"), None);
        assert_eq!(record.get("voted_up"), None);
        assert_eq!(record.non_empty("rating"), Some("negative"));
    }
}

//! Aggregations that turn row sets into chart-ready series.

pub mod category;
pub mod geo;
pub mod players;
pub mod quarterly;

pub use category::{OTHER_LABEL, count_by_category, sum_by_category, top_n_with_other};
pub use geo::{LanguagePoint, language_anchor, language_points};
pub use players::{PlayerCountPoint, filter_by_year, player_series};
pub use quarterly::{aggregate_quarters, sort_chronologically};

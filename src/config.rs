use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::ingest::ReviewSchema;
use crate::series::{ChartKind, ChartSpec};

/// Environment variable naming the directory relative sources are resolved against.
pub const DATA_DIR_ENV: &str = "CHARTS_DATA_DIR";

/// A set of charts to build in one run.
///
/// Stored as JSON on disk:
/// ```json
/// {
///   "charts": [
///     { "name": "playtime", "source": "data.set/cyberpunk_2077_filtered.csv",
///       "kind": "category_sum", "top_n": 3 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub charts: Vec<ChartSpec>,
}

impl ChartConfig {
    /// Loads and checks the config at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("failed to read chart config '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("invalid chart config '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: ChartConfig = serde_json::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    /// Chart names become file and object names, so they must be unique and
    /// free of path separators.
    fn check(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for chart in &self.charts {
            if chart.name.is_empty() || chart.name.contains(['/', '\\']) {
                anyhow::bail!("invalid chart name '{}'", chart.name);
            }
            if !seen.insert(chart.name.as_str()) {
                anyhow::bail!("duplicate chart name '{}'", chart.name);
            }
        }
        Ok(())
    }

    /// The charts of the review site, one per page section.
    pub fn builtin() -> Self {
        Self {
            charts: vec![
                ChartSpec {
                    name: "review_quarters".to_string(),
                    source: "data.set/cyberpunk_reviews_6month.csv".to_string(),
                    kind: ChartKind::Quarterly {
                        schema: ReviewSchema::label_coded(),
                        chronological: false,
                    },
                },
                ChartSpec {
                    name: "playtime_by_language".to_string(),
                    source: "data.set/cyberpunk_2077_filtered.csv".to_string(),
                    kind: ChartKind::CategorySum {
                        category_column: "language".to_string(),
                        value_column: "playtime_at_review".to_string(),
                        top_n: Some(3),
                    },
                },
                ChartSpec {
                    name: "language_map".to_string(),
                    source: "data.set/cyberpunk_2077_filtered.csv".to_string(),
                    kind: ChartKind::LanguageMap {
                        category_column: "language".to_string(),
                    },
                },
                ChartSpec {
                    name: "player_timeline".to_string(),
                    source: "data.set/cyberpunk2077_steamcharts.csv".to_string(),
                    kind: ChartKind::Players {
                        label_column: "Month".to_string(),
                        value_column: "Avg. Players".to_string(),
                        year: None,
                    },
                },
            ],
        }
    }
}

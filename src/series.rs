//! Chart definitions and the load → ingest → aggregate → publish pipeline.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::aggregate::{
    LanguagePoint, PlayerCountPoint, aggregate_quarters, count_by_category, filter_by_year,
    language_points, player_series, sort_chronologically, sum_by_category, top_n_with_other,
};
use crate::fetch::HttpClient;
use crate::ingest::{CategoryTotal, IngestReport, QuarterAggregate, RawRecord, ReviewSchema, ingest_reviews};
use crate::loader::Loader;
use crate::publish::SeriesSink;

fn default_category_column() -> String {
    "language".to_string()
}

fn default_value_column() -> String {
    "playtime_at_review".to_string()
}

fn default_label_column() -> String {
    crate::aggregate::players::DEFAULT_LABEL_COLUMN.to_string()
}

fn default_players_column() -> String {
    crate::aggregate::players::DEFAULT_VALUE_COLUMN.to_string()
}

/// What a chart computes from its rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartKind {
    /// Positive/negative reviews per calendar quarter.
    Quarterly {
        schema: ReviewSchema,
        #[serde(default)]
        chronological: bool,
    },
    /// Sum of a numeric column per category, optionally cut to top N plus "Other".
    CategorySum {
        #[serde(default = "default_category_column")]
        category_column: String,
        #[serde(default = "default_value_column")]
        value_column: String,
        #[serde(default)]
        top_n: Option<usize>,
    },
    /// Row count per category.
    CategoryCount {
        #[serde(default = "default_category_column")]
        category_column: String,
    },
    /// Row count per language, placed on the world map.
    LanguageMap {
        #[serde(default = "default_category_column")]
        category_column: String,
    },
    /// Average players per month, optionally restricted to one year.
    Players {
        #[serde(default = "default_label_column")]
        label_column: String,
        #[serde(default = "default_players_column")]
        value_column: String,
        #[serde(default)]
        year: Option<i32>,
    },
}

/// A named chart bound to one dataset source.
///
/// Near-duplicate charts over the same file are separate specs; nothing merges them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub name: String,
    pub source: String,
    #[serde(flatten)]
    pub kind: ChartKind,
}

/// The ordered data handed to the rendering side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ChartSeries {
    Quarterly(Vec<QuarterAggregate>),
    Categories(Vec<CategoryTotal>),
    LanguageMap(Vec<LanguagePoint>),
    Players(Vec<PlayerCountPoint>),
}

impl ChartSeries {
    /// The empty series of the shape `kind` produces.
    pub fn empty_for(kind: &ChartKind) -> Self {
        match kind {
            ChartKind::Quarterly { .. } => ChartSeries::Quarterly(Vec::new()),
            ChartKind::CategorySum { .. } | ChartKind::CategoryCount { .. } => ChartSeries::Categories(Vec::new()),
            ChartKind::LanguageMap { .. } => ChartSeries::LanguageMap(Vec::new()),
            ChartKind::Players { .. } => ChartSeries::Players(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChartSeries::Quarterly(v) => v.len(),
            ChartSeries::Categories(v) => v.len(),
            ChartSeries::LanguageMap(v) => v.len(),
            ChartSeries::Players(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Computes the series for `kind` from already-loaded rows.
pub fn assemble(kind: &ChartKind, rows: &[RawRecord]) -> (ChartSeries, IngestReport) {
    match kind {
        ChartKind::Quarterly { schema, chronological } => {
            let (records, report) = ingest_reviews(rows, schema);
            let mut aggregates = aggregate_quarters(&records);
            if *chronological {
                sort_chronologically(&mut aggregates);
            }
            (ChartSeries::Quarterly(aggregates), report)
        }
        ChartKind::CategorySum {
            category_column,
            value_column,
            top_n,
        } => {
            let (totals, report) = sum_by_category(rows, category_column, value_column);
            let totals = match top_n {
                Some(n) => top_n_with_other(totals, *n),
                None => totals,
            };
            (ChartSeries::Categories(totals), report)
        }
        ChartKind::CategoryCount { category_column } => {
            let (counts, report) = count_by_category(rows, category_column);
            (ChartSeries::Categories(counts), report)
        }
        ChartKind::LanguageMap { category_column } => {
            let (counts, report) = count_by_category(rows, category_column);
            (ChartSeries::LanguageMap(language_points(&counts)), report)
        }
        ChartKind::Players {
            label_column,
            value_column,
            year,
        } => {
            let (points, report) = player_series(rows, label_column, value_column);
            let points = match year {
                Some(y) => filter_by_year(&points, *y),
                None => points,
            };
            (ChartSeries::Players(points), report)
        }
    }
}

/// Outcome of one chart pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ChartRun {
    pub chart: String,
    pub series: ChartSeries,
    pub report: IngestReport,
    pub load_error: Option<String>,
}

/// Loads the chart's dataset, assembles its series and hands it to `sink`.
///
/// A load failure is not an error here: the sink is told about it and the run
/// carries an empty series. Errors returned come from the sink itself.
#[tracing::instrument(skip_all, fields(chart = %spec.name))]
pub async fn run_chart<C: HttpClient>(
    loader: &Loader<C>,
    spec: &ChartSpec,
    sink: &dyn SeriesSink,
) -> Result<ChartRun> {
    let rows = match loader.load(&spec.source).await {
        Ok(rows) => rows,
        Err(failure) => {
            error!(error = %failure, kind = failure.kind(), "Dataset load failed, chart skipped");
            sink.load_failed(&spec.name, &failure).await?;
            return Ok(ChartRun {
                chart: spec.name.clone(),
                series: ChartSeries::empty_for(&spec.kind),
                report: IngestReport::default(),
                load_error: Some(failure.to_string()),
            });
        }
    };

    let (series, report) = assemble(&spec.kind, &rows);
    report.log(&spec.name);

    sink.publish(&spec.name, &series).await?;
    info!(points = series.len(), "Chart series published");

    Ok(ChartRun {
        chart: spec.name.clone(),
        series,
        report,
        load_error: None,
    })
}

//! Output formatting and persistence for chart series.
//!
//! Supports pretty-printing, JSON files, and flat CSV files.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};

use crate::loader::LoadFailure;
use crate::series::ChartSeries;

/// Diagnostic written in place of a series when its dataset could not be loaded.
#[derive(Debug, Serialize)]
pub struct LoadDiagnostic {
    pub chart: String,
    pub timestamp: DateTime<Utc>,
    pub error_type: String,
    pub error_message: String,
}

impl LoadDiagnostic {
    pub fn from_failure(chart: &str, failure: &LoadFailure) -> Self {
        LoadDiagnostic {
            chart: chart.to_string(),
            timestamp: Utc::now(),
            error_type: failure.kind().to_string(),
            error_message: error_chain(failure),
        }
    }
}

/// Joins an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Logs a series using Rust's debug pretty-print format.
pub fn print_pretty(series: &ChartSeries) {
    debug!("{:#?}", series);
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `value` as pretty JSON to `path`, creating parent directories.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)?;
    debug!(path = %path.display(), "Wrote JSON");
    Ok(())
}

/// Writes the rows of `series` to a CSV file with a header line.
pub fn write_series_csv(path: &Path, series: &ChartSeries) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    match series {
        ChartSeries::Quarterly(rows) => rows.iter().try_for_each(|r| writer.serialize(r))?,
        ChartSeries::Categories(rows) => rows.iter().try_for_each(|r| writer.serialize(r))?,
        ChartSeries::LanguageMap(rows) => rows.iter().try_for_each(|r| writer.serialize(r))?,
        ChartSeries::Players(rows) => rows.iter().try_for_each(|r| writer.serialize(r))?,
    }

    writer.flush()?;
    debug!(path = %path.display(), rows = series.len(), "Wrote CSV");
    Ok(())
}

/// Picks JSON or CSV from the extension of `path`; anything but `.csv` is JSON.
pub fn write_series(path: &Path, series: &ChartSeries) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => write_series_csv(path, series),
        _ => write_json(path, series),
    }
}

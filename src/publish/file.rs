use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use super::SeriesSink;
use crate::loader::LoadFailure;
use crate::output::{LoadDiagnostic, write_json, write_series, write_series_csv};
use crate::series::ChartSeries;

/// Writes `<dir>/<chart>.json` and `<dir>/<chart>.csv` for each series, and
/// `<dir>/<chart>.error.json` when a dataset fails to load.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SeriesSink for FileSink {
    async fn publish(&self, chart: &str, series: &ChartSeries) -> Result<()> {
        let json_path = self.dir.join(format!("{chart}.json"));
        let csv_path = self.dir.join(format!("{chart}.csv"));
        write_json(&json_path, series)?;
        write_series_csv(&csv_path, series)?;
        info!(chart, dir = %self.dir.display(), "Series written");
        Ok(())
    }

    async fn load_failed(&self, chart: &str, failure: &LoadFailure) -> Result<()> {
        let path = self.dir.join(format!("{chart}.error.json"));
        write_json(&path, &LoadDiagnostic::from_failure(chart, failure))
    }
}

/// Writes a single series to one path, JSON or CSV by extension. A load
/// failure goes to `<path>.error.json`.
pub struct PathSink {
    path: PathBuf,
}

impl PathSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn error_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".error.json");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SeriesSink for PathSink {
    async fn publish(&self, chart: &str, series: &ChartSeries) -> Result<()> {
        write_series(&self.path, series)?;
        info!(chart, path = %self.path.display(), "Series written");
        Ok(())
    }

    async fn load_failed(&self, chart: &str, failure: &LoadFailure) -> Result<()> {
        write_json(&self.error_path(), &LoadDiagnostic::from_failure(chart, failure))
    }
}

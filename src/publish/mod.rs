//! Hand-off of finished series to whatever draws them.
//!
//! [`SeriesSink`] is the only thing the pipeline knows about rendering: it is
//! given either a finished series or the reason there is none.

mod file;
mod s3;

pub use file::{FileSink, PathSink};
pub use s3::S3Sink;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::loader::LoadFailure;
use crate::output::{LoadDiagnostic, print_json, print_pretty};
use crate::series::ChartSeries;

#[async_trait]
pub trait SeriesSink: Send + Sync {
    /// Receives the finished series for `chart`.
    async fn publish(&self, chart: &str, series: &ChartSeries) -> Result<()>;

    /// Told that `chart` has no data because its dataset failed to load.
    async fn load_failed(&self, chart: &str, failure: &LoadFailure) -> Result<()>;
}

/// Logs series as JSON instead of writing them anywhere.
pub struct LogSink;

#[async_trait]
impl SeriesSink for LogSink {
    async fn publish(&self, _chart: &str, series: &ChartSeries) -> Result<()> {
        print_pretty(series);
        print_json(series)
    }

    async fn load_failed(&self, chart: &str, failure: &LoadFailure) -> Result<()> {
        let diag = LoadDiagnostic::from_failure(chart, failure);
        warn!(chart, error_type = %diag.error_type, error = %diag.error_message, "No series for chart");
        Ok(())
    }
}

/// Forwards to every inner sink in order, stopping at the first error.
pub struct FanOut(pub Vec<Box<dyn SeriesSink>>);

#[async_trait]
impl SeriesSink for FanOut {
    async fn publish(&self, chart: &str, series: &ChartSeries) -> Result<()> {
        for sink in &self.0 {
            sink.publish(chart, series).await?;
        }
        Ok(())
    }

    async fn load_failed(&self, chart: &str, failure: &LoadFailure) -> Result<()> {
        for sink in &self.0 {
            sink.load_failed(chart, failure).await?;
        }
        Ok(())
    }
}

//! Reads a CSV dataset from disk or HTTP into [`RawRecord`]s.

use crate::fetch::{HttpClient, fetch_bytes, is_remote};
use crate::ingest::RawRecord;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A dataset could not be fetched or parsed as delimited text.
#[derive(Debug, thiserror::Error)]
pub enum LoadFailure {
    #[error("failed to fetch '{source_path}': {message}")]
    Fetch { source_path: String, message: String },
    #[error("failed to read '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse '{source_path}' as CSV")]
    Parse {
        source_path: String,
        #[source]
        source: csv::Error,
    },
}

impl LoadFailure {
    /// Short machine-readable tag used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadFailure::Fetch { .. } => "fetch_error",
            LoadFailure::Read { .. } => "read_error",
            LoadFailure::Parse { .. } => "parse_error",
        }
    }
}

/// Resolves dataset sources and parses them.
///
/// Sources beginning with `http://` or `https://` go through the HTTP client;
/// everything else is a file path, joined onto `base_dir` when relative.
pub struct Loader<C> {
    client: C,
    base_dir: Option<PathBuf>,
}

impl<C: HttpClient> Loader<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            base_dir: None,
        }
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    fn resolve(&self, source: &str) -> PathBuf {
        let path = Path::new(source);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Fetches `source` and parses it into rows.
    #[tracing::instrument(skip(self, source), fields(source = %source))]
    pub async fn load(&self, source: &str) -> Result<Vec<RawRecord>, LoadFailure> {
        let bytes = if is_remote(source) {
            fetch_bytes(&self.client, source)
                .await
                .map_err(|e| LoadFailure::Fetch {
                    source_path: source.to_string(),
                    message: format!("{e:#}"),
                })?
        } else {
            let path = self.resolve(source);
            let read = tokio::fs::read(&path).await;
            let data = read.map_err(|e| LoadFailure::Read { path, source: e })?;
            Bytes::from(data)
        };

        debug!(bytes = bytes.len(), "Dataset bytes received, parsing");
        let rows = parse_csv(&bytes).map_err(|e| LoadFailure::Parse {
            source_path: source.to_string(),
            source: e,
        })?;
        info!(rows = rows.len(), "Dataset loaded");
        Ok(rows)
    }
}

/// Parses headed CSV text. Short rows are allowed; their missing trailing
/// columns are absent from the resulting record.
pub fn parse_csv(data: &[u8]) -> Result<Vec<RawRecord>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(data);

    let headers = rdr.headers()?.clone();
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result?;
        rows.push(RawRecord::from_pairs(headers.iter().zip(record.iter())));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::BasicClient;
    use crate::ingest::ReviewSchema;
    use crate::publish::LogSink;
    use crate::series::{ChartKind, ChartSeries, ChartSpec, run_chart};
    use async_trait::async_trait;
    use std::env;
    use std::fs;

    /// Answers every request with a fixed status and body.
    struct CannedClient {
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl HttpClient for CannedClient {
        async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            let resp = http::Response::builder()
                .status(self.status)
                .body(self.body.as_bytes().to_vec())
                .unwrap();
            Ok(reqwest::Response::from(resp))
        }
    }

    #[tokio::test]
    async fn test_load_remote_rows() {
        let loader = Loader::new(CannedClient {
            status: 200,
            body: "timestamp,rating\n2022-07-15,positive\n",
        });
        let rows = loader.load("https://example.com/reviews.csv").await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("rating"), Some("positive"));
    }

    #[tokio::test]
    async fn test_load_remote_error_status_is_fetch_failure() {
        let loader = Loader::new(CannedClient { status: 404, body: "" });
        let err = loader
            .load("https://example.com/reviews.csv")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "fetch_error");
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_remote_error_status_empties_chart() {
        let loader = Loader::new(CannedClient { status: 503, body: "" });
        let spec = ChartSpec {
            name: "review_quarters".to_string(),
            source: "https://example.com/reviews.csv".to_string(),
            kind: ChartKind::Quarterly {
                schema: ReviewSchema::label_coded(),
                chronological: false,
            },
        };

        let run = run_chart(&loader, &spec, &LogSink).await.unwrap();

        assert_eq!(run.series, ChartSeries::Quarterly(Vec::new()));
        assert!(run.load_error.unwrap().starts_with("failed to fetch"));
    }

    #[test]
    fn test_parse_csv_headers_and_rows() {
        let data = b"timestamp,rating\n2022-07-15 10:00:00,positive\n2022-10-01,negative\n";
        let rows = parse_csv(data).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("timestamp"), Some("2022-07-15 10:00:00"));
        assert_eq!(rows[1].get("rating"), Some("negative"));
    }

    #[test]
    fn test_parse_csv_short_row_is_absent() {
        let data = b"timestamp,rating\n2022-07-15\n";
        let rows = parse_csv(data).unwrap();

        assert_eq!(rows[0].get("timestamp"), Some("2022-07-15"));
        assert_eq!(rows[0].get("rating"), None);
    }

    #[test]
    fn test_parse_csv_quoted_numbers() {
        let data = b"Month,Avg. Players\n\"February 2024\",\"33,010.5\"\n";
        let rows = parse_csv(data).unwrap();
        assert_eq!(rows[0].get("Avg. Players"), Some("33,010.5"));
    }

    #[test]
    fn test_parse_csv_invalid_utf8_fails() {
        let data = b"a,b\n\xff\xfe,1\n";
        assert!(parse_csv(data).is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_read_failure() {
        let loader = Loader::new(BasicClient::new());
        let err = loader
            .load("definitely/not/here/reviews.csv")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "read_error");
    }

    #[tokio::test]
    async fn test_load_relative_to_base_dir() {
        let dir = env::temp_dir().join("review_charts_loader_test");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("reviews.csv"), "timestamp,rating\n2023-01-02,positive\n").unwrap();

        let loader = Loader::new(BasicClient::new()).with_base_dir(&dir);
        let rows = loader.load("reviews.csv").await.unwrap();

        assert_eq!(rows.len(), 1);
        fs::remove_dir_all(&dir).unwrap();
    }
}

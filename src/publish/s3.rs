use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::io::Write;
use tracing::info;

use super::SeriesSink;
use crate::loader::LoadFailure;
use crate::output::LoadDiagnostic;
use crate::series::ChartSeries;

/// Uploads each series as JSON to `s3://<bucket>/<prefix>/<chart>.json`,
/// gzip-compressed (with a `.gz` suffix) when `gzip` is set.
pub struct S3Sink {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
    gzip: bool,
}

impl S3Sink {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>, gzip: bool) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: "charts".to_string(),
            gzip,
        }
    }

    /// Builds a client from the ambient AWS environment.
    pub async fn from_env(bucket: impl Into<String>, gzip: bool) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket, gzip)
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn key_for(&self, name: &str) -> String {
        let key = format!("{}/{}.json", self.prefix.trim_end_matches('/'), name);
        if self.gzip { format!("{key}.gz") } else { key }
    }

    async fn put_json(&self, name: &str, value: &impl Serialize) -> Result<()> {
        let body = encode_body(&serde_json::to_vec(value)?, self.gzip)?;
        let key = self.key_for(name);

        let mut req = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type("application/json");
        if self.gzip {
            req = req.content_encoding("gzip");
        }
        req.send()
            .await
            .with_context(|| format!("S3 PutObject failed for s3://{}/{}", self.bucket, key))?;

        info!(bucket = %self.bucket, key = %key, "Uploaded to S3");
        Ok(())
    }
}

/// Returns `data` as-is or gzip-compressed.
pub(crate) fn encode_body(data: &[u8], gzip: bool) -> Result<Vec<u8>> {
    if !gzip {
        return Ok(data.to_vec());
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[async_trait]
impl SeriesSink for S3Sink {
    async fn publish(&self, chart: &str, series: &ChartSeries) -> Result<()> {
        self.put_json(chart, series).await
    }

    async fn load_failed(&self, chart: &str, failure: &LoadFailure) -> Result<()> {
        let diag = LoadDiagnostic::from_failure(chart, failure);
        self.put_json(&format!("{chart}.error"), &diag).await
    }
}

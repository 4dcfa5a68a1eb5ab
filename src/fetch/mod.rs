//! HTTP access for remote datasets.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use bytes::Bytes;
use tracing::debug;

/// Returns `true` when `source` should be fetched over HTTP rather than read from disk.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Issues a GET for `url` and returns the response body.
///
/// # Errors
///
/// Fails on an invalid URL, a transport error, or a non-success status code.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Bytes> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().with_context(|| format!("invalid dataset url '{url}'"))?,
    );

    let resp = client.execute(req).await?.error_for_status()?;
    let body = resp.bytes().await?;
    debug!(url, bytes = body.len(), "Fetched remote dataset");
    Ok(body)
}

use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport used by the loader for remote datasets.
///
/// Kept as a trait so tests and callers can swap in a client with custom
/// headers, proxies or canned responses.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

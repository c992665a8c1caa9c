use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a single HTTP request. Implementations must not follow redirects.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

pub mod http_fetcher;

use std::time::Duration;

use async_trait::async_trait;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the body of `url`, giving up after `timeout`.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>>;

    /// Fetch a document and decode it as (lossy) UTF-8.
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String> {
        let body = self.fetch(url, timeout).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
pub mod fake;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use url::Url;

use crate::app::Result;
use crate::config::FetchConfig;
use crate::fetcher::Fetcher;

const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .timeout(config.feed_timeout().max(config.page_timeout()))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        let target = Url::parse(url)?;
        let response = self.client.get(target).timeout(timeout).send().await?;

        response.error_for_status_ref()?;

        let body = response.bytes().await?.to_vec();
        tracing::debug!(url, bytes = body.len(), "Fetched document");

        Ok(body)
    }
}

//! In-memory fetcher serving canned documents.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{Result, SwipeError};
use crate::fetcher::Fetcher;

#[derive(Default)]
pub struct StaticFetcher {
    documents: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: &str) -> Self {
        self.documents.insert(url.to_string(), body.to_string());
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        self.documents
            .get(url)
            .map(|body| body.clone().into_bytes())
            .ok_or_else(|| SwipeError::Other(format!("no document for {url}")))
    }
}

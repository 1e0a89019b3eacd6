// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::future::Future;
use url::Url;

/// Where the published export comes from.
pub trait Source: Send + Sync {
    /// Fetch the whole export as text.
    fn fetch_text(&self) -> impl Future<Output = Result<String>> + Send;
}

/// Plain HTTP(S) GET against a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }
}

impl Source for HttpSource {
    async fn fetch_text(&self) -> Result<String> {
        let text = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .with_context(|| format!("GET {}", self.url))?
            .error_for_status()?
            .text()
            .await
            .with_context(|| format!("reading body from {}", self.url))?;
        Ok(text)
    }
}

//! Image download capability
//!
//! Workers only see the [`Fetcher`] trait; [`HttpFetcher`] is the reqwest-backed
//! implementation used by the binary.

use crate::{Config, PaletteError};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

/// Retrieves the raw bytes behind a URL.
///
/// Any transport failure or non-2xx response is reported as
/// [`PaletteError::Fetch`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, PaletteError>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, PaletteError> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let client = builder
            .build()
            .map_err(|e| PaletteError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, PaletteError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PaletteError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PaletteError::fetch(url, format!("HTTP status {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PaletteError::fetch(url, e))?;

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

/// Parses `url` and ensures it is HTTP or HTTPS.
pub fn validate_url(url: &str) -> Result<Url, PaletteError> {
    let parsed = Url::parse(url).map_err(|e| PaletteError::fetch(url, e))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(PaletteError::fetch(url, format!("unsupported scheme '{scheme}'"))),
    }
}

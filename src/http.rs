//! Static HTTP transport. One shared reqwest client per engine, built with
//! browser-like behavior: cookie jar, compression, pooled connections and
//! hard connect/read timeouts.
//!
//! There is deliberately no retry loop here. The engine's only recovery
//! path for a failed static fetch is the single rendering fallback.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::HttpConfig;
use crate::descriptor::HttpMethod;
use crate::error::SourceError;
use crate::request::PageRequest;

/// Outcome of a static page fetch.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport seam: the engine fetches through this; tests inject fakes.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &PageRequest) -> Result<FetchedPage, SourceError>;
}

pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .cookie_store(config.enable_cookies)
            .gzip(config.enable_compression)
            .brotli(config.enable_compression)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(SourceError::ClientBuild)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn fetch(&self, request: &PageRequest) -> Result<FetchedPage, SourceError> {
        log::debug!("{} {}", request.method, request.url);
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        let response = builder
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(|e| SourceError::Network {
                url: request.url.clone(),
                source: e,
            })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| SourceError::Network {
            url: request.url.clone(),
            source: e,
        })?;
        Ok(FetchedPage { status, body })
    }
}

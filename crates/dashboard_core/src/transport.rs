use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use shared::{
    error::FetchError,
    protocol::{ResourceRequest, ACCESS_TOKEN_HEADER},
};
use thiserror::Error;
use url::Url;

/// Source of raw resource bodies. The production implementation talks HTTP;
/// tests substitute scripted fetchers.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn get_json(&self, request: &ResourceRequest) -> Result<serde_json::Value, FetchError>;
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid api base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("api base url '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpFetcherConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: None,
            timeout: None,
        }
    }
}

pub struct HttpFetcher {
    http: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl HttpFetcher {
    pub fn new(config: HttpFetcherConfig) -> Result<Self, SetupError> {
        let base_url =
            Url::parse(config.base_url.trim()).map_err(|source| SetupError::InvalidBaseUrl {
                url: config.base_url.clone(),
                source,
            })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(SetupError::UnsupportedScheme(config.base_url));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
            access_token: config
                .access_token
                .filter(|token| !token.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves the request against the base url, keeping any path prefix the
    /// base url carries (e.g. a reverse proxy mount point).
    pub fn endpoint(&self, request: &ResourceRequest) -> Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}{}", request.resource.path()));
        url.set_query(None);
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                request
                    .query
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            );
        }
        url
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn get_json(&self, request: &ResourceRequest) -> Result<serde_json::Value, FetchError> {
        let url = self.endpoint(request);
        let mut builder = self
            .http
            .get(url.clone())
            .header(CONTENT_TYPE, "application/json");
        if request.resource.requires_access_token() {
            if let Some(token) = &self.access_token {
                builder = builder.header(ACCESS_TOKEN_HEADER, token);
            }
        }

        let response = builder
            .send()
            .await
            .map_err(|err| FetchError::transport(format!("failed to reach {url}: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::transport(format!("failed to read response body: {err}")))?;
        serde_json::from_slice(&body).map_err(|err| FetchError::decode(err.to_string()))
    }
}

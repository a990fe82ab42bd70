//! HTTP clients: one for the upstream profile pages, one for our own scrape endpoint.

use crate::error::FetchError;
use crate::grid::ColorGrid;
use async_trait::async_trait;
use std::time::Duration;

/// Source of profile documents, by identifier.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    async fn fetch_document(&self, identifier: &str) -> Result<String, FetchError>;
}

fn build_client(timeout_sec: u64) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_sec))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(FetchError::Client)
}

async fn get_success(
    client: &reqwest::Client,
    url: String,
) -> Result<(String, reqwest::Response), FetchError> {
    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(source) => return Err(FetchError::Request { url, source }),
    };
    if !response.status().is_success() {
        return Err(FetchError::Status {
            url,
            status: response.status().as_u16(),
        });
    }
    Ok((url, response))
}

/// Fetches `{base_url}/{identifier}` as text.
pub struct HttpProfileFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProfileFetcher {
    pub fn new(base_url: &str, timeout_sec: u64) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(timeout_sec)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn document_url(&self, identifier: &str) -> String {
        format!("{}/{}", self.base_url, identifier)
    }
}

#[async_trait]
impl ProfileFetcher for HttpProfileFetcher {
    async fn fetch_document(&self, identifier: &str) -> Result<String, FetchError> {
        let (url, response) = get_success(&self.client, self.document_url(identifier)).await?;
        response
            .text()
            .await
            .map_err(|source| FetchError::Request { url, source })
    }
}

/// Client of a running scrape server.
pub struct GridClient {
    client: reqwest::Client,
    server_url: String,
}

impl GridClient {
    pub fn new(server_url: &str, timeout_sec: u64) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(timeout_sec)?,
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn scrape_url(&self, identifier: &str) -> String {
        format!("{}/scrape/{}", self.server_url, identifier)
    }

    pub async fn fetch_grid(&self, identifier: &str) -> Result<ColorGrid, FetchError> {
        let (url, response) = get_success(&self.client, self.scrape_url(identifier)).await?;
        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;
        serde_json::from_str(&body).map_err(|err| FetchError::Decode {
            url,
            message: err.to_string(),
        })
    }
}

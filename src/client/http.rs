//! HTTP transport for remote catalog servers

use super::error::CacheError;
use super::transport::PageFetcher;
use crate::core::error::ErrorResponse;
use crate::core::query::{PageRequest, PageResult};
use crate::core::row::Product;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Fetcher posting [`PageRequest`]s to `{base_url}/products/page`
#[derive(Clone, Debug)]
pub struct HttpPageFetcher {
    client: Client,
    endpoint: String,
}

impl HttpPageFetcher {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/products/page", base_url.trim_end_matches('/')),
        }
    }

    /// Client with a request timeout applied by reqwest itself
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, CacheError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::transport(e.to_string(), false))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn transport_error(err: reqwest::Error) -> CacheError {
    if err.is_timeout() {
        return CacheError::transport(format!("request timed out: {}", err), true);
    }
    let retryable = err.is_connect() || err.is_request() || err.is_body() || err.is_decode();
    CacheError::transport(err.to_string(), retryable)
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, request: PageRequest) -> Result<PageResult<Product>, CacheError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<PageResult<Product>>()
                .await
                .map_err(transport_error);
        }

        tracing::debug!(status = status.as_u16(), endpoint = %self.endpoint, "page request failed");

        let server_error = status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS;
        match response.json::<ErrorResponse>().await {
            Ok(body) => Err(CacheError::from_response(body, server_error)),
            Err(_) => Err(CacheError::transport(
                format!("unexpected status {}", status),
                server_error,
            )),
        }
    }
}

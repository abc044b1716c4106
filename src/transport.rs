//! Shared HTTP plumbing for the three upstream providers.
//!
//! Every request goes through the same pooled [`Client`]; failures are mapped to
//! [`TransportError`] so callers can tell upstream trouble apart from domain errors.

use log::{debug, warn};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {0}")]
    Body(String, #[source] reqwest::Error),
}

/// Builds the connection-pooled client shared by all providers.
pub(crate) fn build_client(timeout: Duration, user_agent: &str) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
}

async fn send(request: RequestBuilder, url: &str) -> Result<reqwest::Response, TransportError> {
    debug!("Requesting {}", url);
    let response = request
        .send()
        .await
        .map_err(|e| TransportError::NetworkRequest(url.to_string(), e))?;

    match response.error_for_status() {
        Ok(resp) => Ok(resp),
        Err(e) => {
            warn!("HTTP error for {}: {:?}", url, e);
            Err(if let Some(status) = e.status() {
                TransportError::HttpStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                }
            } else {
                TransportError::NetworkRequest(url.to_string(), e)
            })
        }
    }
}

/// Sends the request and returns the body as text.
pub(crate) async fn get_text(request: RequestBuilder, url: &str) -> Result<String, TransportError> {
    send(request, url)
        .await?
        .text()
        .await
        .map_err(|e| TransportError::Body(url.to_string(), e))
}

/// Sends the request and decodes the body as JSON.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    url: &str,
) -> Result<T, TransportError> {
    send(request, url)
        .await?
        .json::<T>()
        .await
        .map_err(|e| TransportError::Body(url.to_string(), e))
}

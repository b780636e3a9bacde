use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use crate::api::auth::API_KEY_HEADER;
use crate::error::{Error, Result, TransportError};
use crate::interfaces::upstream_client::{UpstreamClient, UpstreamResponse};

/// Pooled HTTP client for the orders service.
///
/// Built once at startup and shared through `Arc`. Every request carries the
/// shared API key.
pub struct ReqwestUpstreamClient {
    client: reqwest::Client,
}

impl ReqwestUpstreamClient {
    pub fn new(api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(api_key)
            .map_err(|e| Error::ConfigError(format!("api_key is not a valid header value: {}", e)))?;
        headers.insert(API_KEY_HEADER, value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(ReqwestUpstreamClient { client })
    }
}

#[async_trait]
impl UpstreamClient for ReqwestUpstreamClient {
    async fn get(&self, url: &str, timeout: Duration) -> std::result::Result<UpstreamResponse, TransportError> {
        let response = self.client.get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(describe)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(describe)?;

        Ok(UpstreamResponse::new(status, body.to_vec()))
    }
}

fn describe(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::new(format!("request timed out: {}", err))
    } else if err.is_connect() {
        TransportError::new(format!("connection failed: {}", err))
    } else {
        TransportError::new(err.to_string())
    }
}

use std::time::Duration;
use async_trait::async_trait;
use crate::error::TransportError;

/// Raw HTTP response from the upstream orders endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        UpstreamResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Timed GET against a configured URL. Implementations are shared across
/// concurrent fetches and must not be built per request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<UpstreamResponse, TransportError>;
}

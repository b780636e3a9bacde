use std::sync::Arc;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use crate::api::error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Returns the caller's API key, or `None` when the header is absent, empty,
/// or not valid visible ASCII.
pub fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
}

/// Shared-key authentication between services.
#[derive(Clone)]
pub struct ApiKeyAuth {
    valid_key: String,
}

impl ApiKeyAuth {
    pub fn new(valid_key: impl Into<String>) -> Self {
        ApiKeyAuth {
            valid_key: valid_key.into(),
        }
    }

    pub fn verify_key(&self, key: &str) -> bool {
        !self.valid_key.is_empty() && self.valid_key == key
    }

    pub fn verify_headers(&self, headers: &HeaderMap) -> bool {
        extract_api_key(headers).is_some_and(|key| self.verify_key(key))
    }
}

/// Rejects requests whose `X-API-Key` does not match the shared key.
pub async fn require_api_key(
    State(auth): State<Arc<ApiKeyAuth>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !auth.verify_headers(request.headers()) {
        tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API key");
        return Err(ApiError::InvalidCredential);
    }

    Ok(next.run(request).await)
}

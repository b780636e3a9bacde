use std::time::Duration;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use crate::error::{Error, FetchError};

/// Errors surfaced at the HTTP boundary. Every variant renders as
/// `{"detail": "<message>"}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing API key")]
    MissingCredential,

    #[error("Invalid or missing API key")]
    InvalidCredential,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Rate limit exceeded. Try again later.")]
    RateLimited { retry_after: Duration },

    #[error(transparent)]
    Upstream(#[from] FetchError),

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCredential
            | ApiError::InvalidCredential
            | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(_) | ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::OrderNotFound(_) => ApiError::NotFound("Order not found".to_string()),
            Error::Fetch(fetch) => ApiError::Upstream(fetch),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(cause) = &self {
            tracing::error!("Internal error: {}", cause);
        }

        let status = self.status();
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        let mut response = (status, body).into_response();

        if let ApiError::RateLimited { retry_after } = self {
            let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            response.headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }

        response
    }
}

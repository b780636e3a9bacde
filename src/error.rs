use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Configuration Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Order Store Errors
    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    // Upstream Errors
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Observability Errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    // System Errors
    #[error("Task failure: {0}")]
    TaskFailure(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Terminal outcome of a fetch against the orders service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Orders service authentication failed")]
    AuthenticationFailed,

    #[error("Orders service network error: {0}")]
    Network(String),

    #[error("Orders service returned status: {0}")]
    UpstreamStatus(u16),

    #[error("Orders service returned invalid data format: {0}")]
    BadFormat(String),

    #[error("Failed to fetch orders after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    AuthenticationFailed,
    Network,
    UpstreamStatus,
    BadFormat,
    RetriesExhausted,
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchErrorKind::AuthenticationFailed => "authentication_failed",
            FetchErrorKind::Network => "network_error",
            FetchErrorKind::UpstreamStatus => "upstream_status",
            FetchErrorKind::BadFormat => "bad_format",
            FetchErrorKind::RetriesExhausted => "retries_exhausted",
        }
    }
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::AuthenticationFailed => FetchErrorKind::AuthenticationFailed,
            FetchError::Network(_) => FetchErrorKind::Network,
            FetchError::UpstreamStatus(_) => FetchErrorKind::UpstreamStatus,
            FetchError::BadFormat(_) => FetchErrorKind::BadFormat,
            FetchError::RetriesExhausted { .. } => FetchErrorKind::RetriesExhausted,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::AuthenticationFailed => Some(401),
            FetchError::UpstreamStatus(code) => Some(*code),
            _ => None,
        }
    }
}

/// Transport-level failure reported by an [`UpstreamClient`](crate::interfaces::upstream_client::UpstreamClient).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        TransportError(message.into())
    }
}

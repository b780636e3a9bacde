use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Settings for calls from the analytics service to the orders service.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub orders_api_url: String,
    pub request_timeout_secs: f64,
    pub max_retries: u32,
    pub initial_backoff_secs: f64,
}

impl UpstreamConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.initial_backoff_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            orders_api_url: "http://127.0.0.1:8000/orders".to_string(),
            request_timeout_secs: 5.0,
            max_retries: 3,
            initial_backoff_secs: 0.5,
        }
    }
}

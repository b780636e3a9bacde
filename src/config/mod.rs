use serde::{Deserialize, Serialize};

pub mod upstream;
pub mod rate_limit;
pub mod loader;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct OrdersServiceConfig {
    pub bind_addr: String,
}

impl Default for OrdersServiceConfig {
    fn default() -> Self {
        OrdersServiceConfig {
            bind_addr: "127.0.0.1:8000".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyticsServiceConfig {
    pub bind_addr: String,
    pub upstream: upstream::UpstreamConfig,
    pub rate_limit: rate_limit::RateLimitConfig,
}

impl Default for AnalyticsServiceConfig {
    fn default() -> Self {
        AnalyticsServiceConfig {
            bind_addr: "127.0.0.1:8001".to_string(),
            upstream: upstream::UpstreamConfig::default(),
            rate_limit: rate_limit::RateLimitConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind_addr: String,
    pub orders_url: String,
    pub analytics_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            bind_addr: "127.0.0.1:8080".to_string(),
            orders_url: "http://127.0.0.1:8000".to_string(),
            analytics_url: "http://127.0.0.1:8001".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}

use crate::config::rate_limit::RateLimitConfig;
use crate::config::upstream::UpstreamConfig;
use crate::config::*;
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Shared credential used between the gateway, analytics and orders services.
    pub api_key: String,
    pub orders: OrdersServiceConfig,
    pub analytics: AnalyticsServiceConfig,
    pub gateway: GatewayConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("ORDER_ANALYTICS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("api_key", std::env::var("ORDERS_API_KEY").ok())
            .map_err(|e| Error::ConfigError(e.to_string()))?
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let app_config: AppConfig = config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::ConfigError("api_key must be set".to_string()));
        }
        validate_upstream(&self.analytics.upstream)?;
        validate_rate_limit(&self.analytics.rate_limit)?;
        Ok(())
    }
}

fn validate_upstream(upstream: &UpstreamConfig) -> Result<()> {
    if upstream.max_retries < 1 {
        return Err(Error::ConfigError("max_retries must be at least 1".to_string()));
    }
    validate_seconds("initial_backoff_secs", upstream.initial_backoff_secs)?;
    validate_seconds("request_timeout_secs", upstream.request_timeout_secs)?;
    Ok(())
}

/// Seconds must be positive and small enough to become a `Duration`.
fn validate_seconds(name: &str, secs: f64) -> Result<()> {
    if !(secs.is_finite() && secs > 0.0) || Duration::try_from_secs_f64(secs).is_err() {
        return Err(Error::ConfigError(format!("{} must be a positive number of seconds", name)));
    }
    Ok(())
}

fn validate_rate_limit(rate_limit: &RateLimitConfig) -> Result<()> {
    if rate_limit.max_requests < 1 {
        return Err(Error::ConfigError("rate_limit.max_requests must be at least 1".to_string()));
    }
    if rate_limit.window_secs < 1 {
        return Err(Error::ConfigError("rate_limit.window_secs must be at least 1".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let config = Config::builder()
            .set_override("api_key", "shared-key")
            .unwrap()
            .build()
            .unwrap();

        let app = AppConfig::from_config(config).unwrap();
        assert_eq!(app.api_key, "shared-key");
        assert_eq!(app.orders.bind_addr, "127.0.0.1:8000");
        assert_eq!(app.analytics.upstream.orders_api_url, "http://127.0.0.1:8000/orders");
        assert_eq!(app.analytics.upstream.max_retries, 3);
        assert_eq!(app.analytics.upstream.initial_backoff(), Duration::from_millis(500));
        assert_eq!(app.analytics.upstream.request_timeout(), Duration::from_secs(5));
        assert_eq!(app.analytics.rate_limit.max_requests, 60);
        assert_eq!(app.analytics.rate_limit.window(), Duration::from_secs(60));
        assert!(!app.logging.json);
    }

    #[test]
    fn overrides_nested_values() {
        let config = Config::builder()
            .set_override("api_key", "k")
            .unwrap()
            .set_override("analytics.upstream.max_retries", 4_i64)
            .unwrap()
            .set_override("analytics.upstream.initial_backoff_secs", 0.25)
            .unwrap()
            .build()
            .unwrap();

        let app = AppConfig::from_config(config).unwrap();
        assert_eq!(app.analytics.upstream.max_retries, 4);
        assert_eq!(app.analytics.upstream.initial_backoff(), Duration::from_millis(250));
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let config = Config::builder().build().unwrap();
        let err = AppConfig::from_config(config).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn zero_retries_and_backoff_are_rejected() {
        let mut app = AppConfig {
            api_key: "k".to_string(),
            ..AppConfig::default()
        };
        assert!(app.validate().is_ok());

        app.analytics.upstream.max_retries = 0;
        assert!(app.validate().is_err());

        app.analytics.upstream.max_retries = 1;
        app.analytics.upstream.initial_backoff_secs = 0.0;
        assert!(app.validate().is_err());

        app.analytics.upstream.initial_backoff_secs = 0.5;
        app.analytics.rate_limit.max_requests = 0;
        assert!(app.validate().is_err());
    }

    #[test]
    fn unbounded_durations_are_rejected() {
        for secs in [f64::INFINITY, 1e30, f64::NAN] {
            let mut app = AppConfig {
                api_key: "k".to_string(),
                ..AppConfig::default()
            };
            app.analytics.upstream.initial_backoff_secs = secs;
            assert!(app.validate().is_err(), "initial_backoff_secs = {secs}");

            app.analytics.upstream.initial_backoff_secs = 0.5;
            app.analytics.upstream.request_timeout_secs = secs;
            assert!(app.validate().is_err(), "request_timeout_secs = {secs}");
        }
    }

    #[test]
    fn validated_durations_convert() {
        let mut app = AppConfig {
            api_key: "k".to_string(),
            ..AppConfig::default()
        };
        app.analytics.upstream.initial_backoff_secs = 3600.0;
        app.analytics.upstream.request_timeout_secs = 0.001;
        app.validate().unwrap();

        assert_eq!(app.analytics.upstream.initial_backoff(), Duration::from_secs(3600));
        assert_eq!(app.analytics.upstream.request_timeout(), Duration::from_millis(1));
    }
}

use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::config::LoggingConfig;

/// Installs the global subscriber. `RUST_LOG` wins over the configured filter.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {}", e);
    }
}

pub fn trace_fetch_orders(url: &str) -> Span {
    tracing::info_span!(
        "fetch_orders",
        url = %url,
    )
}

pub fn trace_proxy(method: &str, path: &str) -> Span {
    tracing::info_span!(
        "gateway_proxy",
        method = %method,
        path = %path,
    )
}

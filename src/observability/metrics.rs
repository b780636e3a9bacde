use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use crate::error::Result;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Upstream fetch metrics
    pub static ref UPSTREAM_ATTEMPTS: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "orders_upstream_attempts_total",
            "Orders service fetch attempts by outcome"
        ),
        &["outcome"]
    ).unwrap();

    pub static ref FETCH_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "orders_fetch_failures_total",
            "Terminal orders fetch failures by kind"
        ),
        &["kind"]
    ).unwrap();

    pub static ref FETCH_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "orders_fetch_latency_seconds",
            "Orders fetch latency including retries"
        ).buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0])
    ).unwrap();

    // Rate limiting metrics
    pub static ref RATE_LIMIT_REJECTIONS: IntCounter = IntCounter::new(
        "analytics_rate_limit_rejections_total",
        "Requests rejected by the analytics rate limiter"
    ).unwrap();
}

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(UPSTREAM_ATTEMPTS.clone()))?;
    REGISTRY.register(Box::new(FETCH_FAILURES.clone()))?;
    REGISTRY.register(Box::new(FETCH_LATENCY.clone()))?;
    REGISTRY.register(Box::new(RATE_LIMIT_REJECTIONS.clone()))?;
    Ok(())
}

/// Renders the registry in the Prometheus text exposition format.
pub fn render() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

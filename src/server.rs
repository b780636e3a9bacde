use std::sync::Arc;
use std::time::Instant;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};
use crate::analytics::fetcher::OrdersFetcher;
use crate::analytics::http_client::ReqwestUpstreamClient;
use crate::api::auth::ApiKeyAuth;
use crate::api::rate_limit::FixedWindowRateLimiter;
use crate::api::{analytics, gateway, orders};
use crate::config::loader::AppConfig;
use crate::error::Result;
use crate::interfaces::upstream_client::UpstreamClient;
use crate::orders::store::InMemoryOrderStore;

pub fn orders_router(config: &AppConfig) -> Router {
    let state = Arc::new(orders::OrdersState {
        store: Arc::new(InMemoryOrderStore::new()),
    });
    orders::create_router(state, Arc::new(ApiKeyAuth::new(config.api_key.clone())))
}

/// Builds the analytics state around one pooled upstream client.
pub fn analytics_state(config: &AppConfig) -> Result<Arc<analytics::AnalyticsState>> {
    let client: Arc<dyn UpstreamClient> = Arc::new(ReqwestUpstreamClient::new(&config.api_key)?);
    let fetcher = OrdersFetcher::new(client, config.analytics.upstream.clone());
    let rate_limiter = Arc::new(FixedWindowRateLimiter::from_config(&config.analytics.rate_limit));

    Ok(Arc::new(analytics::AnalyticsState {
        fetcher,
        rate_limiter,
    }))
}

pub fn gateway_router(config: &AppConfig) -> Result<Router> {
    let client = reqwest::Client::builder().build()?;
    let state = gateway::GatewayState::new(client, &config.gateway, ApiKeyAuth::new(config.api_key.clone()));
    Ok(gateway::create_router(Arc::new(state)))
}

/// Resolves once the shutdown flag is `true` or the sender is gone.
pub async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            break;
        }
    }
}

/// Serves `router` until the shutdown flag flips to `true`.
pub async fn serve(name: &'static str, listener: TcpListener, router: Router, mut shutdown: watch::Receiver<bool>) {
    match listener.local_addr() {
        Ok(addr) => info!("{} service listening on http://{}", name, addr),
        Err(e) => error!("{} service has no local address: {}", name, e),
    }

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(async move { wait_for_shutdown(&mut shutdown).await })
        .await;

    match result {
        Ok(()) => info!("{} service stopped", name),
        Err(e) => error!("{} service failed: {}", name, e),
    }
}

/// Periodically drops rate-limit windows that have elapsed.
pub async fn evict_rate_limit_windows(limiter: Arc<FixedWindowRateLimiter>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(limiter.window());
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let evicted = limiter.evict_expired(Instant::now());
                if evicted > 0 {
                    tracing::debug!(evicted, remaining = limiter.tracked_keys(), "Evicted expired rate-limit windows");
                }
            }
            _ = wait_for_shutdown(&mut shutdown) => break,
        }
    }
}

use std::sync::Arc;
use axum::{
    Router,
    routing::get,
    extract::{Query, Request, State, Json, rejection::QueryRejection},
    middleware::{self, Next},
    response::Response,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use crate::analytics::calculations;
use crate::analytics::fetcher::OrdersFetcher;
use crate::api::auth::extract_api_key;
use crate::api::error::ApiError;
use crate::api::rate_limit::{FixedWindowRateLimiter, RateLimitDecision};
use crate::observability::metrics;
use crate::types::analytics::{AnalyticsSummary, LocationBreakdown, StatusBreakdown};

const DEFAULT_LOCATION_LIMIT: usize = 3;

pub struct AnalyticsState {
    pub fetcher: OrdersFetcher,
    pub rate_limiter: Arc<FixedWindowRateLimiter>,
}

pub fn create_router(state: Arc<AnalyticsState>) -> Router {
    let protected = Router::new()
        .route("/analytics/summary", get(summary))
        .route("/analytics/status-breakdown", get(status_breakdown))
        .route("/analytics/location-breakdown", get(location_breakdown))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Identifies the caller by API key, then applies the per-key window.
async fn rate_limit_middleware(
    State(state): State<Arc<AnalyticsState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = extract_api_key(request.headers())
        .ok_or(ApiError::MissingCredential)?;

    if let RateLimitDecision::Reject { retry_after } = state.rate_limiter.check(key) {
        return Err(ApiError::RateLimited { retry_after });
    }

    Ok(next.run(request).await)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics_handler() -> Result<String, ApiError> {
    Ok(metrics::render()?)
}

async fn summary(
    State(state): State<Arc<AnalyticsState>>,
) -> Result<Json<AnalyticsSummary>, ApiError> {
    let orders = state.fetcher.fetch_orders().await?;
    Ok(Json(calculations::summarize(&orders)))
}

async fn status_breakdown(
    State(state): State<Arc<AnalyticsState>>,
) -> Result<Json<StatusBreakdown>, ApiError> {
    let orders = state.fetcher.fetch_orders().await?;
    Ok(Json(calculations::status_breakdown(&orders)))
}

#[derive(Deserialize)]
struct LocationParams {
    limit: Option<usize>,
}

async fn location_breakdown(
    State(state): State<Arc<AnalyticsState>>,
    params: Result<Query<LocationParams>, QueryRejection>,
) -> Result<Json<LocationBreakdown>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;
    let limit = params.limit.unwrap_or(DEFAULT_LOCATION_LIMIT);
    if limit == 0 {
        return Err(ApiError::Validation("limit must be at least 1".to_string()));
    }

    let orders = state.fetcher.fetch_orders().await?;
    Ok(Json(calculations::location_breakdown(&orders, limit)))
}

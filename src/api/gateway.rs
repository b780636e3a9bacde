use std::sync::Arc;
use std::time::Instant;
use axum::{
    Router,
    body::{self, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tracing::Instrument;
use crate::api::auth::ApiKeyAuth;
use crate::api::error::ApiError;
use crate::config::GatewayConfig;
use crate::observability::tracing::trace_proxy;

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const ALLOW_METHODS: &str = "GET, POST, PATCH, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, X-API-Key";

const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
];

pub struct GatewayState {
    pub client: reqwest::Client,
    pub orders_url: String,
    pub analytics_url: String,
    pub auth: ApiKeyAuth,
}

impl GatewayState {
    pub fn new(client: reqwest::Client, config: &GatewayConfig, auth: ApiKeyAuth) -> Self {
        GatewayState {
            client,
            orders_url: config.orders_url.clone(),
            analytics_url: config.analytics_url.clone(),
            auth,
        }
    }

    fn upstream_for(&self, path: &str) -> Option<&str> {
        if path.starts_with("/orders") {
            Some(self.orders_url.as_str())
        } else if path.starts_with("/analytics") {
            Some(self.analytics_url.as_str())
        } else {
            None
        }
    }
}

pub fn create_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .fallback(route_request)
        .layer(middleware::from_fn(cors_headers))
        .with_state(state)
}

/// Adds the CORS headers to every response, including rejections.
async fn cors_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    response
}

async fn route_request(
    State(state): State<Arc<GatewayState>>,
    request: Request,
) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    if !state.auth.verify_headers(request.headers()) {
        tracing::warn!(path = %request.uri().path(), "Blocked unauthorized request");
        return ApiError::Unauthorized.into_response();
    }

    let path = request.uri().path().to_string();
    let Some(base_url) = state.upstream_for(&path) else {
        return ApiError::NotFound("Route not found".to_string()).into_response();
    };

    let method = request.method().clone();
    let started = Instant::now();
    let result = forward(&state.client, base_url, request)
        .instrument(trace_proxy(method.as_str(), &path))
        .await;

    match result {
        Ok(response) => {
            tracing::info!(
                method = %method,
                path = %path,
                status = response.status().as_u16(),
                latency = ?started.elapsed(),
                "Proxied request"
            );
            response
        }
        Err(err) => {
            tracing::error!(method = %method, path = %path, "Proxy failed: {}", err);
            err.into_response()
        }
    }
}

async fn forward(client: &reqwest::Client, base_url: &str, request: Request) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts.uri.path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", base_url.trim_end_matches('/'), path_and_query);

    let body = body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::Validation(format!("Request body rejected: {}", e)))?;

    let upstream = client.request(parts.method, &url)
        .headers(strip_hop_by_hop(parts.headers))
        .body(body)
        .send()
        .await
        .map_err(|e| ApiError::BadGateway(e.to_string()))?;

    let status = upstream.status();
    let headers = strip_hop_by_hop(upstream.headers().clone());
    let bytes = upstream.bytes()
        .await
        .map_err(|e| ApiError::BadGateway(e.to_string()))?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove(header::CONTENT_LENGTH);
    headers
}

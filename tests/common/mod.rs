#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use order_analytics::error::TransportError;
use order_analytics::interfaces::sleeper::Sleeper;
use order_analytics::interfaces::upstream_client::{UpstreamClient, UpstreamResponse};
use tower::ServiceExt;

pub const API_KEY: &str = "shared-key";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    TestResponse { status, headers, body }
}

pub fn get(uri: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, api_key: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn order_json(id: i64, location: &str, cost: f64, delivery_time: i64, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "item_name": format!("Item {}", id),
        "location": location,
        "cost": cost,
        "delivery_time": delivery_time,
        "status": status,
    })
}

/// Upstream stand-in that replays canned outcomes and counts calls.
/// The last outcome repeats once the script runs out.
pub struct ScriptedClient {
    script: Mutex<Vec<Result<UpstreamResponse, TransportError>>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(script: Vec<Result<UpstreamResponse, TransportError>>) -> Arc<Self> {
        Arc::new(ScriptedClient {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn json(status: u16, body: serde_json::Value) -> Arc<Self> {
        Self::new(vec![Ok(UpstreamResponse::new(status, body.to_string()))])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamClient for ScriptedClient {
    async fn get(&self, _url: &str, _timeout: Duration) -> Result<UpstreamResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.remove(0)
        } else {
            script[0].clone()
        }
    }
}

#[derive(Default)]
pub struct NoopSleeper {
    pub calls: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for NoopSleeper {
    async fn sleep(&self, duration: Duration) {
        self.calls.lock().unwrap().push(duration);
    }
}

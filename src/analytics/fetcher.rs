//! Retrying fetch of the order list from the orders service.
//!
//! Every attempt is classified into an [`AttemptOutcome`]. The driving loop
//! stops on success or on a terminal failure, and otherwise sleeps for the
//! current backoff delay and doubles it. No delay follows the final attempt.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn, Instrument};
use crate::config::upstream::UpstreamConfig;
use crate::error::FetchError;
use crate::interfaces::sleeper::{Sleeper, TokioSleeper};
use crate::interfaces::upstream_client::{UpstreamClient, UpstreamResponse};
use crate::observability::metrics::{FETCH_FAILURES, FETCH_LATENCY, UPSTREAM_ATTEMPTS};
use crate::observability::tracing::trace_fetch_orders;
use crate::types::order::Order;

/// Result of a single upstream attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success(Vec<Order>),
    Retryable(FetchError),
    Terminal(FetchError),
}

impl AttemptOutcome {
    fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Success(_) => "success",
            AttemptOutcome::Retryable(_) => "retryable",
            AttemptOutcome::Terminal(_) => "terminal",
        }
    }
}

/// Classifies a received HTTP response.
///
/// 401 is terminal since retrying cannot fix a credential problem. Any other
/// error status is retryable. A success whose body is not a list of orders
/// is terminal.
pub fn classify_response(response: &UpstreamResponse) -> AttemptOutcome {
    if response.status == 401 {
        return AttemptOutcome::Terminal(FetchError::AuthenticationFailed);
    }
    if !response.is_success() {
        return AttemptOutcome::Retryable(FetchError::UpstreamStatus(response.status));
    }

    match parse_orders(&response.body) {
        Ok(orders) => AttemptOutcome::Success(orders),
        Err(reason) => AttemptOutcome::Terminal(FetchError::BadFormat(reason)),
    }
}

fn parse_orders(body: &[u8]) -> Result<Vec<Order>, String> {
    let payload: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| format!("body is not valid JSON: {}", e))?;

    let items = match payload {
        serde_json::Value::Array(items) => items,
        _ => return Err("expected a JSON array of orders".to_string()),
    };

    items.into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(format!("order at index {} is not an object", index));
            }
            serde_json::from_value::<Order>(item)
                .map_err(|e| format!("order at index {}: {}", index, e))
        })
        .collect()
}

/// Fetches the full order list, retrying transient failures with
/// exponential backoff.
///
/// Attempts are numbered `1..=max_retries`. Each attempt is bounded by the
/// configured request timeout. A transport failure or a non-401 error status
/// is retried; authentication and format failures stop immediately.
pub async fn fetch_orders(
    client: &dyn UpstreamClient,
    sleeper: &dyn Sleeper,
    config: &UpstreamConfig,
) -> Result<Vec<Order>, FetchError> {
    let max_attempts = config.max_retries;
    let timeout = config.request_timeout();
    let mut backoff = config.initial_backoff();
    let started = Instant::now();

    for attempt in 1..=max_attempts {
        let outcome = run_attempt(client, &config.orders_api_url, timeout).await;
        UPSTREAM_ATTEMPTS.with_label_values(&[outcome.label()]).inc();

        match outcome {
            AttemptOutcome::Success(orders) => {
                FETCH_LATENCY.observe(started.elapsed().as_secs_f64());
                debug!(attempt, count = orders.len(), "Fetched orders");
                return Ok(orders);
            }
            AttemptOutcome::Terminal(err) => {
                return Err(fail(err, attempt, started));
            }
            AttemptOutcome::Retryable(err) => {
                if attempt == max_attempts {
                    return Err(fail(err, attempt, started));
                }
                warn!(
                    attempt,
                    max_attempts,
                    delay = ?backoff,
                    "Orders fetch failed: {}. Retrying",
                    err
                );
                sleeper.sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            }
        }
    }

    Err(fail(FetchError::RetriesExhausted { attempts: max_attempts }, max_attempts, started))
}

async fn run_attempt(client: &dyn UpstreamClient, url: &str, timeout: Duration) -> AttemptOutcome {
    match tokio::time::timeout(timeout, client.get(url, timeout)).await {
        Ok(Ok(response)) => classify_response(&response),
        Ok(Err(transport)) => AttemptOutcome::Retryable(FetchError::Network(transport.to_string())),
        Err(_) => AttemptOutcome::Retryable(FetchError::Network(format!(
            "request timed out after {:?}",
            timeout
        ))),
    }
}

fn fail(err: FetchError, attempt: u32, started: Instant) -> FetchError {
    FETCH_LATENCY.observe(started.elapsed().as_secs_f64());
    FETCH_FAILURES.with_label_values(&[err.kind().as_str()]).inc();
    error!(attempt, kind = err.kind().as_str(), "Orders fetch failed: {}", err);
    err
}

/// Owns the pooled upstream client and retry settings for the analytics service.
#[derive(Clone)]
pub struct OrdersFetcher {
    client: Arc<dyn UpstreamClient>,
    sleeper: Arc<dyn Sleeper>,
    config: UpstreamConfig,
}

impl OrdersFetcher {
    pub fn new(client: Arc<dyn UpstreamClient>, config: UpstreamConfig) -> Self {
        OrdersFetcher {
            client,
            sleeper: Arc::new(TokioSleeper),
            config,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub async fn fetch_orders(&self) -> Result<Vec<Order>, FetchError> {
        fetch_orders(self.client.as_ref(), self.sleeper.as_ref(), &self.config)
            .instrument(trace_fetch_orders(&self.config.orders_api_url))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchErrorKind, TransportError};
    use crate::interfaces::upstream_client::MockUpstreamClient;
    use async_trait::async_trait;
    use mockall::Sequence;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSleeper {
        calls: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        fn calls(&self) -> Vec<Duration> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.calls.lock().unwrap().push(duration);
        }
    }

    fn config(max_retries: u32, initial_backoff_secs: f64) -> UpstreamConfig {
        UpstreamConfig {
            orders_api_url: "http://orders.local/orders".to_string(),
            request_timeout_secs: 5.0,
            max_retries,
            initial_backoff_secs,
        }
    }

    fn orders_body() -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!([
            {"id": 1, "item_name": "A", "location": "Austin", "cost": 10.0, "delivery_time": 30, "status": "delivered"},
            {"id": 2, "item_name": "B", "location": "Dallas", "cost": 20.0, "delivery_time": 50, "status": "pending"},
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn network_errors_back_off_exponentially_until_exhausted() {
        let mut client = MockUpstreamClient::new();
        client.expect_get()
            .times(4)
            .returning(|_, _| Err(TransportError::new("connection refused")));
        let sleeper = RecordingSleeper::default();

        let err = fetch_orders(&client, &sleeper, &config(4, 0.25)).await.unwrap_err();

        assert_eq!(err.kind(), FetchErrorKind::Network);
        assert!(err.to_string().contains("network error"));
        assert_eq!(
            sleeper.calls(),
            vec![
                Duration::from_millis(250),
                Duration::from_millis(500),
                Duration::from_secs(1),
            ]
        );
    }

    #[tokio::test]
    async fn authentication_failure_is_never_retried() {
        let mut client = MockUpstreamClient::new();
        client.expect_get()
            .times(1)
            .returning(|_, _| Ok(UpstreamResponse::new(401, r#"{"detail":"Invalid or missing API key"}"#)));
        let sleeper = RecordingSleeper::default();

        let err = fetch_orders(&client, &sleeper, &config(3, 0.5)).await.unwrap_err();

        assert_eq!(err, FetchError::AuthenticationFailed);
        assert_eq!(err.to_string(), "Orders service authentication failed");
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn non_list_body_is_a_terminal_format_error() {
        let mut client = MockUpstreamClient::new();
        client.expect_get()
            .times(1)
            .returning(|_, _| Ok(UpstreamResponse::new(200, r#"{"orders": []}"#)));
        let sleeper = RecordingSleeper::default();

        let err = fetch_orders(&client, &sleeper, &config(3, 0.5)).await.unwrap_err();

        assert_eq!(err.kind(), FetchErrorKind::BadFormat);
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn list_of_non_objects_is_a_format_error() {
        let outcome = classify_response(&UpstreamResponse::new(200, "[1, 2, 3]"));
        assert!(matches!(outcome, AttemptOutcome::Terminal(FetchError::BadFormat(_))));
    }

    #[tokio::test]
    async fn server_error_then_success_returns_orders_after_one_backoff() {
        let mut seq = Sequence::new();
        let mut client = MockUpstreamClient::new();
        client.expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(UpstreamResponse::new(503, "unavailable")));
        client.expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(UpstreamResponse::new(200, orders_body())));
        let sleeper = RecordingSleeper::default();

        let orders = fetch_orders(&client, &sleeper, &config(3, 0.5)).await.unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].location, "Austin");
        assert_eq!(sleeper.calls(), vec![Duration::from_millis(500)]);
    }

    #[tokio::test]
    async fn status_error_on_final_attempt_carries_the_code() {
        let mut client = MockUpstreamClient::new();
        client.expect_get()
            .times(1)
            .returning(|_, _| Ok(UpstreamResponse::new(404, r#"{"detail":"Not Found"}"#)));
        let sleeper = RecordingSleeper::default();

        let err = fetch_orders(&client, &sleeper, &config(1, 0.5)).await.unwrap_err();

        assert_eq!(err, FetchError::UpstreamStatus(404));
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.to_string(), "Orders service returned status: 404");
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn success_short_circuits_remaining_attempts() {
        let mut client = MockUpstreamClient::new();
        client.expect_get()
            .times(1)
            .withf(|url, timeout| url.ends_with("/orders") && *timeout == Duration::from_secs(5))
            .returning(|_, _| Ok(UpstreamResponse::new(200, "[]")));
        let sleeper = RecordingSleeper::default();

        let orders = fetch_orders(&client, &sleeper, &config(5, 0.5)).await.unwrap();

        assert!(orders.is_empty());
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn zero_attempts_reports_exhaustion() {
        let client = MockUpstreamClient::new();
        let sleeper = RecordingSleeper::default();

        let err = fetch_orders(&client, &sleeper, &config(0, 0.5)).await.unwrap_err();

        assert_eq!(err, FetchError::RetriesExhausted { attempts: 0 });
    }

    #[tokio::test]
    async fn fetcher_uses_injected_sleeper() {
        let mut client = MockUpstreamClient::new();
        client.expect_get()
            .times(2)
            .returning(|_, _| Err(TransportError::new("dns failure")));
        let sleeper = Arc::new(RecordingSleeper::default());

        let fetcher = OrdersFetcher::new(Arc::new(client), config(2, 0.1))
            .with_sleeper(sleeper.clone());
        let err = fetcher.fetch_orders().await.unwrap_err();

        assert_eq!(err, FetchError::Network("dns failure".to_string()));
        assert_eq!(sleeper.calls(), vec![Duration::from_millis(100)]);
    }
}

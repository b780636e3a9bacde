use std::time::Duration;
use clap::{Parser, ValueEnum};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};
use order_analytics::api::analytics::create_router;
use order_analytics::config::loader::AppConfig;
use order_analytics::observability::metrics::register_metrics;
use order_analytics::observability::tracing::init_tracing;
use order_analytics::server;
use order_analytics::utils::task_supervisor::TaskSupervisor;

const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(5);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Component {
    Orders,
    Analytics,
    Gateway,
    All,
}

impl Component {
    fn runs(self, other: Component) -> bool {
        self == Component::All || self == other
    }
}

/// Orders CRUD, order analytics, and the API gateway in front of them.
#[derive(Parser, Debug)]
#[command(name = "order-analytics", version)]
struct Cli {
    /// Which service to run.
    #[arg(value_enum, default_value_t = Component::All)]
    component: Component,

    /// Configuration environment, read from `config/<env>`. Defaults to `APP_ENV` or `development`.
    #[arg(long)]
    env: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let env = cli.env
        .or_else(|| std::env::var("APP_ENV").ok())
        .unwrap_or_else(|| "development".to_string());

    let config = AppConfig::load(&env)?;
    init_tracing(&config.logging);
    register_metrics()?;
    info!(env = %env, component = ?cli.component, "Starting");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut supervisor = TaskSupervisor::new();

    if cli.component.runs(Component::Orders) {
        let listener = TcpListener::bind(&config.orders.bind_addr).await?;
        let router = server::orders_router(&config);
        supervisor.spawn("orders", server::serve("orders", listener, router, shutdown_rx.clone()));
    }

    if cli.component.runs(Component::Analytics) {
        let listener = TcpListener::bind(&config.analytics.bind_addr).await?;
        let state = server::analytics_state(&config)?;
        supervisor.spawn(
            "rate_limit_eviction",
            server::evict_rate_limit_windows(state.rate_limiter.clone(), shutdown_rx.clone()),
        );
        supervisor.spawn("analytics", server::serve("analytics", listener, create_router(state), shutdown_rx.clone()));
    }

    if cli.component.runs(Component::Gateway) {
        let listener = TcpListener::bind(&config.gateway.bind_addr).await?;
        let router = server::gateway_router(&config)?;
        supervisor.spawn("gateway", server::serve("gateway", listener, router, shutdown_rx.clone()));
    }

    let mut health = tokio::time::interval(HEALTH_CHECK_INTERVAL);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            _ = health.tick() => {
                if let Err(e) = supervisor.check_health() {
                    warn!("Stopping after task failure: {}", e);
                    break;
                }
            }
        }
    }

    let _ = shutdown_tx.send(true);
    match tokio::time::timeout(SHUTDOWN_GRACE, supervisor.join_all()).await {
        Ok(result) => result?,
        Err(_) => {
            warn!("Tasks still running after {:?}, aborting", SHUTDOWN_GRACE);
            supervisor.abort_all();
        }
    }
    info!("Shutdown complete");
    Ok(())
}

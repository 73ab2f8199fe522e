//! Storefront HTTP server.
//!
//! Wires configuration, storage, mail delivery and the effect dispatcher
//! behind the axum router, then serves until Ctrl+C or SIGTERM.

mod config;

use anyhow::Context;
use config::{Config, OutboxConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use std::time::Duration;
use storefront_auth::providers::{ConsoleMailer, SmtpMailer};
use storefront_auth::{AuthService, PasswordHasher, SmtpConfig, TokenConfig, TokenService};
use storefront_core::mailer::Mailer;
use storefront_core::metrics::register_metrics;
use storefront_core::outbox::{EffectDispatcher, EffectExecutor};
use storefront_core::retry::RetryPolicy;
use storefront_core::services::AccountService;
use storefront_core::stores::{
    AccountStore, CartStore, CatalogStore, NotificationStore, OrderStore, RatingStore,
    SidebarStore, StoreHealth,
};
use storefront_core::{Clock, Environment, SystemClock};
use storefront_postgres::PostgresStore;
use storefront_testing::InMemoryStore;
use storefront_web::AppState;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long queued emails and notifications get to drain after shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting storefront server");

    let config = Config::from_env()?;
    info!(
        addr = %config.server.addr(),
        environment = %config.server.environment,
        database = config.database.is_some(),
        smtp = config.smtp.is_some(),
        "Configuration loaded"
    );
    if config.auth.using_default_secret {
        warn!("JWT_SECRET is not set; using the development secret");
    }

    PrometheusBuilder::new()
        .with_http_listener(config.server.metrics_addr())
        .install()
        .context("Failed to install Prometheus exporter")?;
    register_metrics();
    info!(addr = %config.server.metrics_addr(), "Metrics exporter listening");

    let mailer = build_mailer(&config)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (env, dispatcher) = if let Some(database) = &config.database {
        info!("Connecting to PostgreSQL...");
        let store = PostgresStore::connect(&database.url, database.max_connections)
            .await
            .context("Failed to connect to PostgreSQL")?;
        store.migrate().await.context("Failed to run migrations")?;
        info!("PostgreSQL connected and migrated");
        wire(&Arc::new(store), mailer, clock.clone(), config.outbox)
    } else {
        warn!("DATABASE_URL is not set; data lives in memory and is lost on exit");
        wire(&Arc::new(InMemoryStore::new()), mailer, clock.clone(), config.outbox)
    };

    let tokens = TokenService::new(
        &TokenConfig::new(config.auth.jwt_secret.as_str()).with_expires_in(config.auth.expires_in),
    );
    let auth = AuthService::new(
        AccountService::new(env.clone()),
        tokens,
        PasswordHasher::new(),
        clock,
    );
    let app = storefront_web::router(AppState::new(&env, auth));
    drop(env);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped; draining side effects");
    match tokio::time::timeout(DRAIN_TIMEOUT, dispatcher).await {
        Ok(Ok(())) => info!("Shutdown complete"),
        Ok(Err(err)) => warn!(error = %err, "Effect dispatcher panicked"),
        Err(_) => warn!("Timed out draining side effects"),
    }

    Ok(())
}

/// Build the environment over `store` and start its effect dispatcher.
fn wire<S>(
    store: &Arc<S>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    outbox: OutboxConfig,
) -> (Environment, JoinHandle<()>)
where
    S: AccountStore
        + CatalogStore
        + OrderStore
        + RatingStore
        + CartStore
        + NotificationStore
        + SidebarStore
        + StoreHealth
        + 'static,
{
    let policy = RetryPolicy::builder().max_retries(outbox.max_retries).build();
    let executor = EffectExecutor::new(store.clone(), mailer, clock.clone(), policy);
    let (channel, dispatcher) = EffectDispatcher::channel(executor, outbox.capacity);

    let env = Environment::from_store(store, Arc::new(channel), clock);
    (env, dispatcher.spawn())
}

fn build_mailer(config: &Config) -> anyhow::Result<Arc<dyn Mailer>> {
    let Some(smtp) = &config.smtp else {
        info!("EMAIL_USER/EMAIL_PASS not set; mail is logged instead of sent");
        return Ok(Arc::new(ConsoleMailer::new()));
    };

    let mailer = SmtpMailer::new(
        SmtpConfig::new(smtp.host.as_str(), smtp.username.as_str(), smtp.password.as_str())
            .with_port(smtp.port)
            .with_from_name(smtp.from_name.as_str()),
    )
    .context("Failed to configure SMTP mailer")?;
    info!(host = %smtp.host, port = smtp.port, "SMTP mailer configured");
    Ok(Arc::new(mailer))
}

/// Graceful shutdown signal handler.
///
/// Waits for:
/// - Ctrl+C (SIGINT)
/// - SIGTERM (in production environments)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}

//! NewsHub web server
//!
//! The binary serving the site. Handles:
//! - Request routing and page rendering
//! - Session management (cookie-backed, stored in Postgres)
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;
mod render;
mod service;

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use newshub_common::{
    config::AppConfig,
    db::DbPool,
    metrics,
    session::SeaOrmSessionStore,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tower_sessions::{Expiry, SessionManagerLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub templates: Arc<tera::Tera>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        e
    })?;
    let config = Arc::new(config);

    // Initialize tracing; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.observability.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("Starting NewsHub v{}", newshub_common::VERSION);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port != 0 {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .set_buckets(metrics::LATENCY_BUCKETS)?
            .install()?;
        info!("Metrics exporter listening on {}", metrics_addr);
    }

    // Initialize database connection and apply pending migrations
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;
    sqlx::migrate!("../../migrations")
        .run(db.primary.get_postgres_connection_pool())
        .await?;

    // Load templates
    let templates = Arc::new(render::engine(&config.templates.dir)?);

    // Session store backed by the same database, with a periodic sweep
    let session_store = SeaOrmSessionStore::new(db.primary.clone());
    let sweeper = session_store.clone();
    let sweep_interval = std::time::Duration::from_secs(config.session.sweep_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            match sweeper.delete_expired().await {
                Ok(0) => {}
                Ok(n) => tracing::debug!(removed = n, "swept expired sessions"),
                Err(e) => tracing::warn!(error = %e, "session sweep failed"),
            }
        }
    });

    let session_layer = SessionManagerLayer::new(session_store)
        .with_name(config.session.cookie_name.clone())
        .with_secure(config.session.cookie_secure)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            config.session.expiry_minutes,
        )));

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        templates,
    };

    // Build the router
    let app = create_router(state, session_layer);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(
    state: AppState,
    session_layer: SessionManagerLayer<SeaOrmSessionStore>,
) -> Router {
    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let request_timeout = state.config.request_timeout();

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Pages
        .route("/", get(handlers::home::index))
        .route("/article", get(handlers::article::show))
        .route("/article", post(handlers::article::submit))
        .route("/category", get(handlers::category::show))
        .route("/search", get(handlers::search::show))
        // Accounts
        .route("/register", get(handlers::account::register_form))
        .route("/register", post(handlers::account::register))
        .route("/login", get(handlers::account::login_form))
        .route("/login", post(handlers::account::login))
        .route("/logout", get(handlers::account::logout))
        // Layers
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CompressionLayer::new())
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

//! Voiceflow billing service
//!
//! REST service for the subscription billing subsystem.
//!
//! ## Endpoints
//!
//! - `GET /api/plans` - Plan catalog (public)
//! - `GET /api/billing/subscription` - Current user's subscription
//! - `GET /api/billing/usage/:resource` - Usage-limit check
//! - `POST /api/billing/orders` - Create a checkout order
//! - `POST /api/billing/subscriptions` - Create a recurring subscription
//! - `POST /api/billing/verify` - Verify a checkout callback
//! - `POST /api/webhooks/razorpay` - Razorpay webhook handler
//! - `GET /health` - Liveness probe

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use voiceflow::adapters::http::billing::{billing_router, BillingAppState};
use voiceflow::adapters::postgres::{
    PostgresPaymentRepository, PostgresProfileRepository, PostgresSubscriptionRepository,
    PostgresUsageTracker, PostgresWebhookEventRepository,
};
use voiceflow::adapters::razorpay::{RazorpayClient, RazorpayConfig};
use voiceflow::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.server.log_level)?)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        port = config.server.port,
        test_mode = config.payment.is_test_mode(),
        "Starting Voiceflow billing service"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .connect(&config.database.url)
        .await?;
    tracing::info!("Database pool created");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let gateway = RazorpayClient::new(RazorpayConfig::new(
        config.payment.razorpay_key_id.clone(),
        config.payment.razorpay_key_secret.clone(),
    ));

    let state = BillingAppState {
        subscription_repository: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        payment_repository: Arc::new(PostgresPaymentRepository::new(pool.clone())),
        webhook_event_repository: Arc::new(PostgresWebhookEventRepository::new(pool.clone())),
        profile_repository: Arc::new(PostgresProfileRepository::new(pool.clone())),
        usage_tracker: Arc::new(PostgresUsageTracker::new(pool.clone())),
        payment_gateway: Arc::new(gateway),
        webhook_secret: config.payment.razorpay_webhook_secret.clone(),
        checkout_secret: config.payment.razorpay_key_secret.clone(),
        gateway_plan_ids: config.payment.gateway_plan_ids(),
    };

    let app = build_router(state, &config);

    let addr = config.server.socket_addr()?;
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(state: BillingAppState, config: &AppConfig) -> Router {
    let cors = cors_layer(config);

    // Middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    Router::new()
        .nest("/api", billing_router())
        .layer(middleware)
        // Health route without timeout - must always respond quickly
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

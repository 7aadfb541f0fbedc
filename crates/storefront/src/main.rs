//! Shopfront - a small shop with a catalog, session cart, checkout and
//! admin panel.
//!
//! # Architecture
//!
//! - Axum web framework, Askama templates rendered on the server
//! - `SQLite` for products, users, orders and sessions
//! - Embedded migrations, applied on every start
//!
//! Admin accounts are provisioned with `shopfront-cli admin create`, or once
//! at startup from `SHOPFRONT_ADMIN_PASSWORD`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use sentry::integrations::tracing as sentry_tracing;
use sqlx::SqlitePool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopfront_storefront::config::ShopConfig;
use shopfront_storefront::services::auth::{AuthService, BootstrapOutcome};
use shopfront_storefront::state::AppState;
use shopfront_storefront::{app, db, middleware};

/// Start Sentry when a DSN is configured. The guard flushes on drop.
fn init_sentry(config: &ShopConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;

    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config.sentry_environment.clone().map(Into::into),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        attach_stacktrace: true,
        ..Default::default()
    };
    Some(sentry::init((dsn, options)))
}

/// Warnings and errors become Sentry events; info and debug ride along as
/// breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

async fn ensure_admin_account(pool: &SqlitePool, config: &ShopConfig) {
    let outcome = AuthService::new(pool)
        .ensure_bootstrap_admin(config.admin_password.as_ref())
        .await
        .expect("Failed to check bootstrap admin");

    match outcome {
        BootstrapOutcome::Created => tracing::info!("Bootstrap admin account created"),
        BootstrapOutcome::AlreadyPresent => {}
        BootstrapOutcome::NotConfigured => tracing::warn!(
            "No admin account and SHOPFRONT_ADMIN_PASSWORD is unset; \
             create one with `shopfront-cli admin create`"
        ),
    }
}

#[tokio::main]
async fn main() {
    let config = ShopConfig::from_env().expect("Failed to load configuration");

    // Sentry first so the tracing layer below has a hub to report to.
    let sentry_guard = init_sentry(&config);
    init_tracing();
    if sentry_guard.is_some() {
        tracing::info!("Sentry enabled");
    }

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    db::migrate(&pool)
        .await
        .expect("Failed to run database migrations");
    ensure_admin_account(&pool, &config).await;

    let session_store = middleware::create_session_store(&pool)
        .await
        .expect("Failed to create session store");
    let _session_cleanup = middleware::spawn_expired_session_cleanup(session_store.clone());
    let session_layer = middleware::create_session_layer(session_store, &config);

    let addr = config.socket_addr();
    let app = app(AppState::new(config, pool), session_layer)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Shopfront listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutting down");
}

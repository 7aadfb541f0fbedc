//! Shopfront storefront library.
//!
//! The catalog, cart, checkout and admin panel as a library, so the router
//! can be driven from integration tests and the CLI can share the data layer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, body::Body, http::Request};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::SqliteStore;

use crate::models::product::UPLOADS_URL_PREFIX;
use crate::state::AppState;

/// Build the shop router with its middleware stack.
///
/// Sentry layers are left to the binary so tests run without a hub.
pub fn app(state: AppState, session_layer: SessionManagerLayer<SqliteStore>) -> Router {
    let config = state.config();
    let debug_routes = config.debug_routes;
    let static_files = ServeDir::new(&config.static_dir);
    let uploads = ServeDir::new(&config.upload_dir);

    Router::new()
        .merge(routes::routes(debug_routes))
        .nest_service("/static", static_files)
        .nest_service(UPLOADS_URL_PREFIX, uploads)
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

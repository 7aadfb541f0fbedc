//! Admin panel route handlers.
//!
//! Everything except the login form is behind the `RequireAdmin` extractor.

pub mod auth;
pub mod orders;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Largest accepted product form, image included.
pub const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Admin routes: login/logout plus the `/admin` tree.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin-login", get(auth::login_page).post(auth::login))
        .route("/admin-logout", get(auth::logout))
        .route("/admin", get(products::index).post(products::create))
        .route(
            "/admin/product/edit/{id}",
            get(products::edit_page).post(products::update),
        )
        .route("/admin/product/delete/{id}", post(products::delete))
        .route("/admin/orders", get(orders::index))
        .route("/admin/order/{id}", get(orders::show))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Catalog
//! GET  /product/{id}              - Product detail
//! GET  /health                    - Liveness
//! GET  /health/ready              - Database readiness
//!
//! # Cart
//! GET  /cart                      - Cart page
//! GET  /add-to-cart/{id}          - Add one unit, back to the referring page
//! GET  /remove-from-cart/{id}     - Remove a line
//! POST /update-cart               - inc / dec / set / remove
//!
//! # Checkout
//! GET  /checkout                  - Review and delivery form
//! POST /checkout                  - Place the order
//! GET  /order-success/{id}        - Confirmation
//!
//! # Customer accounts
//! GET  /register, POST /register
//! GET  /login,    POST /login
//! GET  /logout
//!
//! # Admin (see `admin`)
//! GET  /admin-login, POST /admin-login
//! GET  /admin-logout
//! GET  /admin, POST /admin        - Product list / create
//! GET  /admin/product/edit/{id}, POST /admin/product/edit/{id}
//! POST /admin/product/delete/{id}
//! GET  /admin/orders
//! GET  /admin/order/{id}
//!
//! # Diagnostics (SHOPFRONT_DEBUG_ROUTES)
//! GET  /debug-products            - Catalog as JSON
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Cart routes.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/add-to-cart/{id}", get(cart::add))
        .route("/remove-from-cart/{id}", get(cart::remove))
        .route("/update-cart", post(cart::update))
}

/// Checkout routes.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/order-success/{id}", get(checkout::success))
}

/// Customer account routes.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
}

/// Create all routes for the shop.
pub fn routes(debug_routes: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/", get(catalog::index))
        .route("/product/{id}", get(catalog::show))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(cart_routes())
        .merge(checkout_routes())
        .merge(auth_routes())
        .merge(admin::routes());

    if debug_routes {
        tracing::warn!("Debug routes enabled");
        router.route("/debug-products", get(catalog::debug_products))
    } else {
        router
    }
}

//! Session middleware configuration.
//!
//! Sessions live in the shop's `SQLite` database via tower-sessions. The
//! store creates its own `tower_sessions` table.

use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::ShopConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shopfront_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// How often expired session rows are purged.
const EXPIRED_SESSION_SWEEP: std::time::Duration = std::time::Duration::from_secs(60 * 60);

/// Create the session store and its table.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session table cannot be created.
pub async fn create_session_store(pool: &SqlitePool) -> Result<SqliteStore, sqlx::Error> {
    let store = SqliteStore::new(pool.clone());
    store.migrate().await?;
    Ok(store)
}

/// Spawn a background task that deletes expired sessions.
#[must_use]
pub fn spawn_expired_session_cleanup(
    store: SqliteStore,
) -> JoinHandle<Result<(), tower_sessions::session_store::Error>> {
    tokio::task::spawn(store.continuously_delete_expired(EXPIRED_SESSION_SWEEP))
}

/// Create the session layer over `store`.
///
/// Cookies are `HttpOnly`, `SameSite=Lax`, and `Secure` when the shop is
/// served over https.
#[must_use]
pub fn create_session_layer(
    store: SqliteStore,
    config: &ShopConfig,
) -> SessionManagerLayer<SqliteStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, new hub per request)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span)
//! 4. Security headers
//! 5. Session layer (tower-sessions with `SQLite` store)

pub mod auth;
pub mod flash;
pub mod page;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalUser, RequireAdmin, clear_current_admin, clear_current_user, set_current_admin,
    set_current_user,
};
pub use flash::{flash, take_flashes};
pub use page::PageContext;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, create_session_store, spawn_expired_session_cleanup};

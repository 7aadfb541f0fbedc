//! Per-page context shared by every rendered template.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::auth::{current_user, is_admin};
use crate::middleware::flash::take_flashes;
use crate::services::cart::CartStore;

/// Navigation and flash data for the base layout.
///
/// Extracting it consumes the queued flash messages, so only handlers that
/// render a page should ask for it.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub flashes: Vec<String>,
    pub username: Option<String>,
    pub is_admin: bool,
    pub cart_count: u32,
}

impl PageContext {
    /// Build the context from a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn load(session: &Session) -> Result<Self, AppError> {
        let flashes = take_flashes(session).await?;
        let username = current_user(session)
            .await
            .map(|u| u.username.into_inner());
        let is_admin = is_admin(session).await;
        let cart_count = CartStore::new(session).load().await?.item_count();

        Ok(Self {
            flashes,
            username,
            is_admin,
            cart_count,
        })
    }

    /// Add a message to show on this page.
    #[must_use]
    pub fn with_flash(mut self, message: impl Into<String>) -> Self {
        self.flashes.push(message.into());
        self
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        Self::load(&session).await
    }
}

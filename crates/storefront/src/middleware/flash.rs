//! One-shot messages carried to the next rendered page.

use tower_sessions::Session;

use crate::models::session_keys;

/// Queue a message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn flash(
    session: &Session,
    message: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    let mut messages: Vec<String> = session
        .get(session_keys::FLASH)
        .await?
        .unwrap_or_default();
    messages.push(message.into());
    session.insert(session_keys::FLASH, messages).await
}

/// Remove and return all queued messages.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn take_flashes(session: &Session) -> Result<Vec<String>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<String>>(session_keys::FLASH)
        .await?
        .unwrap_or_default())
}

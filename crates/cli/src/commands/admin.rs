//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! SHOPFRONT_ADMIN_PASSWORD=... shopfront-cli admin create --username alice
//! SHOPFRONT_ADMIN_PASSWORD=... shopfront-cli admin set-password --username alice
//! ```
//!
//! The password is never taken from the command line so it does not end up
//! in shell history.
//!
//! # Environment Variables
//!
//! - `SHOPFRONT_ADMIN_PASSWORD` - Password to set (at least 12 characters)

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use shopfront_storefront::config::{self, ConfigError};
use shopfront_storefront::db::RepositoryError;
use shopfront_storefront::services::auth::{AuthError, AuthService};

use super::migrate::MigrationError;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Password variable is unset.
    #[error("Missing environment variable: SHOPFRONT_ADMIN_PASSWORD")]
    MissingPassword,

    /// Password variable is set but rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An account with that username exists.
    #[error("User already exists: {0}")]
    UserExists(String),

    /// No account with that username.
    #[error("No such user: {0}")]
    UserNotFound(String),

    #[error(transparent)]
    Auth(AuthError),

    #[error(transparent)]
    Database(#[from] MigrationError),
}

/// Create an admin account.
///
/// # Errors
///
/// Returns an error if the password is missing or weak, the username is
/// invalid or taken, or the database cannot be reached.
pub async fn create(username: &str) -> Result<(), AdminError> {
    let password = password_from_env()?;
    let pool = super::connect().await?;

    tracing::info!("Creating admin user: {username}");

    let user = AuthService::new(&pool)
        .create_admin(username, password.expose_secret())
        .await
        .map_err(|e| match e {
            AuthError::DuplicateUsername => AdminError::UserExists(username.to_owned()),
            other => AdminError::Auth(other),
        })?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Username: {}",
        user.id,
        user.username
    );

    Ok(())
}

/// Replace the password of an existing account.
///
/// # Errors
///
/// Returns an error if the password is missing or weak, the account does
/// not exist, or the database cannot be reached.
pub async fn set_password(username: &str) -> Result<(), AdminError> {
    let password = password_from_env()?;
    let pool = super::connect().await?;

    AuthService::new(&pool)
        .set_password(username, password.expose_secret())
        .await
        .map_err(|e| match e {
            AuthError::Repository(RepositoryError::NotFound) => {
                AdminError::UserNotFound(username.to_owned())
            }
            other => AdminError::Auth(other),
        })?;

    tracing::info!("Password updated for {username}");

    Ok(())
}

fn password_from_env() -> Result<SecretString, AdminError> {
    dotenvy::dotenv().ok();
    config::admin_password_from_env()?.ok_or(AdminError::MissingPassword)
}

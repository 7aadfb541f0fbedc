//! Authentication service.
//!
//! Password registration and login for customers, admin login gated on the
//! `admin` role, and provisioning of the bootstrap admin account.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use tracing::instrument;

use shopfront_core::{UserRole, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Username of the account created from `SHOPFRONT_ADMIN_PASSWORD`.
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";

/// What [`AuthService::ensure_bootstrap_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// An account with the bootstrap name already exists; left untouched.
    AlreadyPresent,
    /// The admin account was created.
    Created,
    /// No password configured, so no account was created.
    NotConfigured,
}

/// Authentication service.
///
/// Handles user registration, login, and admin provisioning.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::DuplicateUsername` if the username is taken.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        self.create_user(username, password, UserRole::Customer)
            .await
    }

    /// Check a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_credentials(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    // =========================================================================
    // Admins
    // =========================================================================

    /// Check credentials and require the `admin` role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the credentials are wrong or
    /// the account is not an admin.
    #[instrument(skip(self, password))]
    pub async fn admin_login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self.login(username, password).await?;
        if !user.role.is_admin() {
            tracing::warn!(user_id = %user.id, "Non-admin attempted admin login");
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::register`].
    #[instrument(skip(self, password))]
    pub async fn create_admin(&self, username: &str, password: &str) -> Result<User, AuthError> {
        self.create_user(username, password, UserRole::Admin).await
    }

    /// Replace the password of an existing account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::Repository(NotFound)` if the account does not exist.
    #[instrument(skip(self, password))]
    pub async fn set_password(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let username = Username::parse(username)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.users.update_password(&username, &password_hash).await?;

        Ok(())
    }

    /// Create the `admin` account from a configured password, once.
    ///
    /// Nothing is created without a password; there is no default.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or insert fails.
    pub async fn ensure_bootstrap_admin(
        &self,
        password: Option<&SecretString>,
    ) -> Result<BootstrapOutcome, AuthError> {
        let username = Username::parse(BOOTSTRAP_ADMIN_USERNAME)?;
        if self.users.get_by_username(&username).await?.is_some() {
            return Ok(BootstrapOutcome::AlreadyPresent);
        }

        let Some(password) = password else {
            return Ok(BootstrapOutcome::NotConfigured);
        };

        self.create_admin(BOOTSTRAP_ADMIN_USERNAME, password.expose_secret())
            .await?;

        Ok(BootstrapOutcome::Created)
    }

    async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&username, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateUsername,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User created");

        Ok(user)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password meets minimum requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password with argon2id and a random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

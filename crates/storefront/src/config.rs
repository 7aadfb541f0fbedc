//! Shop configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults suit a local development run.
//!
//! - `SHOPFRONT_DATABASE_URL` - `SQLite` connection string, falls back to
//!   `DATABASE_URL` (default: `sqlite://shopfront.db?mode=rwc`)
//! - `SHOPFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOPFRONT_PORT` - Listen port (default: 3000)
//! - `SHOPFRONT_BASE_URL` - Public URL; `https` enables secure cookies
//!   (default: `http://localhost:3000`)
//! - `SHOPFRONT_STATIC_DIR` - Stylesheets and other assets
//!   (default: `crates/storefront/static`)
//! - `SHOPFRONT_UPLOAD_DIR` - Where uploaded product images are written
//!   (default: `<static dir>/image`)
//! - `SHOPFRONT_ADMIN_PASSWORD` - Password for the bootstrap `admin` account;
//!   no admin is created at startup when unset
//! - `SHOPFRONT_DEBUG_ROUTES` - Mount `/debug-products` (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Minimum length of the bootstrap admin password.
pub const MIN_ADMIN_PASSWORD_LENGTH: usize = 12;

const DEFAULT_DATABASE_URL: &str = "sqlite://shopfront.db?mode=rwc";
const DEFAULT_STATIC_DIR: &str = "crates/storefront/static";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Shop application configuration.
#[derive(Clone)]
pub struct ShopConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Directory uploaded images are written to and served from
    pub upload_dir: PathBuf,
    /// Password for the bootstrap admin account
    pub admin_password: Option<SecretString>,
    /// Whether diagnostic routes are mounted
    pub debug_routes: bool,
    /// Sentry DSN for error tracking (optional)
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for ShopConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopConfig")
            .field("database_url", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("static_dir", &self.static_dir)
            .field("upload_dir", &self.upload_dir)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("debug_routes", &self.debug_routes)
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .field("sentry_sample_rate", &self.sentry_sample_rate)
            .field("sentry_traces_sample_rate", &self.sentry_traces_sample_rate)
            .finish()
    }
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be parsed or the admin
    /// password fails validation (length, placeholder detection).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = database_url_from_env();
        let host = get_env_or_default("SHOPFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPFRONT_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SHOPFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPFRONT_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("SHOPFRONT_BASE_URL", "http://localhost:3000");

        let static_dir = PathBuf::from(get_env_or_default("SHOPFRONT_STATIC_DIR", DEFAULT_STATIC_DIR));
        let upload_dir = get_optional_env("SHOPFRONT_UPLOAD_DIR")
            .map_or_else(|| static_dir.join("image"), PathBuf::from);

        let admin_password = admin_password_from_env()?;
        let debug_routes = get_bool_env("SHOPFRONT_DEBUG_ROUTES")?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            static_dir,
            upload_dir,
            admin_password,
            debug_routes,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Database URL from `SHOPFRONT_DATABASE_URL`, then `DATABASE_URL`, then the
/// local default.
#[must_use]
pub fn database_url_from_env() -> SecretString {
    if let Ok(value) = std::env::var("SHOPFRONT_DATABASE_URL") {
        return SecretString::from(value);
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return SecretString::from(value);
    }
    SecretString::from(DEFAULT_DATABASE_URL)
}

/// Read and validate `SHOPFRONT_ADMIN_PASSWORD`.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if the password is set but too short
/// or looks like a placeholder.
pub fn admin_password_from_env() -> Result<Option<SecretString>, ConfigError> {
    let Some(value) = get_optional_env("SHOPFRONT_ADMIN_PASSWORD") else {
        return Ok(None);
    };
    let secret = SecretString::from(value);
    validate_admin_password(&secret, "SHOPFRONT_ADMIN_PASSWORD")?;
    Ok(Some(secret))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a boolean flag; unset means false.
fn get_bool_env(key: &str) -> Result<bool, ConfigError> {
    match get_optional_env(key).as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("0" | "false" | "no" | "off") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some(other) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Validate that an admin password is long enough and not a placeholder.
fn validate_admin_password(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.chars().count() < MIN_ADMIN_PASSWORD_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("must be at least {MIN_ADMIN_PASSWORD_LENGTH} characters"),
        ));
    }

    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_config() -> ShopConfig {
        ShopConfig {
            database_url: SecretString::from("sqlite://secret-location.db"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            static_dir: PathBuf::from("static"),
            upload_dir: PathBuf::from("static/image"),
            admin_password: Some(SecretString::from("k3Pq9-vLx2-Wm7z")),
            debug_routes: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_validate_admin_password_too_short() {
        let result = validate_admin_password(&SecretString::from("kanak"), "TEST");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_admin_password_placeholder() {
        let result = validate_admin_password(&SecretString::from("changeme-changeme"), "TEST");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));

        let result = validate_admin_password(&SecretString::from("MyPassword2026!"), "TEST");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_admin_password_valid() {
        let result = validate_admin_password(&SecretString::from("k3Pq9-vLx2-Wm7z"), "TEST");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let addr = sample_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_secure_cookies_follow_base_url() {
        let mut config = sample_config();
        assert!(!config.secure_cookies());
        config.base_url = "https://shop.test".to_string();
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug_output = format!("{:?}", sample_config());

        assert!(debug_output.contains("http://localhost:3000"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("secret-location"));
        assert!(!debug_output.contains("k3Pq9"));
    }
}

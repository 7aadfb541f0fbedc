//! User domain types.

use chrono::{DateTime, Utc};

use shopfront_core::{UserId, UserRole, Username};

/// A shop account (domain type).
///
/// The password hash never leaves the repository layer.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// Customer or admin.
    pub role: UserRole,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

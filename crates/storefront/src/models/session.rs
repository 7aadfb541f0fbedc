//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use shopfront_core::{UserId, Username};

/// Session-stored customer identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's login name.
    pub username: Username,
}

/// Session-stored admin identity.
///
/// Independent of [`CurrentUser`]: logging out of one leaves the other intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's user ID.
    pub user_id: UserId,
    /// Admin's login name.
    pub username: Username,
}

/// Session keys.
pub mod keys {
    /// Key for the shopping cart.
    pub const CART: &str = "cart";

    /// Key for storing the current logged-in customer.
    pub const CURRENT_USER: &str = "user";

    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "admin";

    /// Key for one-shot messages shown on the next rendered page.
    pub const FLASH: &str = "flash";

    /// Key for the orders placed from this session.
    pub const PLACED_ORDERS: &str = "orders";
}

//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod role;
pub mod username;

pub use id::*;
pub use price::{Price, PriceError};
pub use role::UserRole;
pub use username::{Username, UsernameError};

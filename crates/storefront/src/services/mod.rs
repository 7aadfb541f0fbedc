//! Business logic services for the shop.
//!
//! # Services
//!
//! - `catalog` - Product listing and lookup
//! - `cart` - Session cart operations and pricing
//! - `checkout` - Cart to order conversion
//! - `auth` - Password authentication and admin provisioning
//! - `admin` - Product management and order review
//! - `uploads` - Product image storage

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod uploads;

//! Domain models for the shop.
//!
//! These are validated domain types, separate from database row types.

pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{Cart, CartEntry};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, OrderWithItems};
pub use product::{NewProduct, Product};
pub use session::{CurrentAdmin, CurrentUser, keys as session_keys};
pub use user::User;

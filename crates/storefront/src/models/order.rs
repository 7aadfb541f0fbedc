//! Order domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopfront_core::{OrderId, OrderItemId, Price, PriceError, ProductId, UserId};

/// A placed order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Customer account that placed the order, if logged in.
    pub user_id: Option<UserId>,
    /// Name given at checkout.
    pub customer_name: String,
    /// Delivery address given at checkout.
    pub address: String,
    /// Contact phone given at checkout.
    pub phone: String,
    /// Sum of all line subtotals at the time of purchase.
    pub total_amount: Price,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// One line of a placed order.
///
/// Name and unit price are copied from the product when the order is placed
/// and never change afterwards.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    /// Unique line ID.
    pub id: OrderItemId,
    /// Order this line belongs to.
    pub order_id: OrderId,
    /// Product that was bought. May no longer exist.
    pub product_id: ProductId,
    /// Product name at the time of purchase.
    pub product_name: String,
    /// Units bought (always positive).
    pub quantity: u32,
    /// Unit price at the time of purchase.
    pub price: Price,
}

impl OrderItem {
    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the product does not fit.
    pub fn subtotal(&self) -> Result<Price, PriceError> {
        self.price.times(self.quantity)
    }
}

/// An order together with its lines.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// An order ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub address: String,
    pub phone: String,
    pub total_amount: Price,
    pub items: Vec<NewOrderItem>,
}

/// An order line ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Price,
}

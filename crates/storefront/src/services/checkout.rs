//! Checkout: turn a cart into a persisted order.
//!
//! The flow is `review` → `submit`. A [`CheckoutReview`] can only be obtained
//! for a cart with at least one purchasable line, so an empty cart can never
//! reach the point of writing an order.

use thiserror::Error;
use tracing::instrument;

use shopfront_core::{Price, UserId};

use crate::db::{OrderRepository, RepositoryError};
use crate::models::{NewOrder, NewOrderItem, Order};
use crate::services::cart::{CartError, CartManager, CartSnapshot};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No purchasable lines (empty cart, or every product was deleted).
    #[error("Your cart is empty")]
    EmptyCart,

    /// A required customer field was left blank.
    #[error("Please enter your {0}.")]
    MissingField(&'static str),

    /// Cart could not be read or cleared.
    #[error("cart error: {0}")]
    Cart(#[from] CartError),

    /// Order could not be stored; nothing was written.
    #[error("could not place order: {0}")]
    Repository(#[from] RepositoryError),
}

/// Validated delivery details from the checkout form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl CustomerDetails {
    /// Trim and require all three fields.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingField` naming the first blank field.
    pub fn parse(
        name: Option<&str>,
        address: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Self, CheckoutError> {
        Ok(Self {
            name: required(name, "name")?,
            address: required(address, "address")?,
            phone: required(phone, "phone number")?,
        })
    }
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, CheckoutError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_owned()),
        _ => Err(CheckoutError::MissingField(field)),
    }
}

/// A non-empty cart priced for confirmation.
#[derive(Debug, Clone)]
pub struct CheckoutReview {
    snapshot: CartSnapshot,
}

impl CheckoutReview {
    #[must_use]
    pub const fn snapshot(&self) -> &CartSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub const fn total(&self) -> Price {
        self.snapshot.total
    }
}

/// A completed checkout.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub line_count: usize,
}

/// Checkout for one request's session.
pub struct CheckoutWorkflow<'a> {
    cart: &'a CartManager<'a>,
    orders: OrderRepository<'a>,
}

impl<'a> CheckoutWorkflow<'a> {
    #[must_use]
    pub const fn new(cart: &'a CartManager<'a>, orders: OrderRepository<'a>) -> Self {
        Self { cart, orders }
    }

    /// Price the current cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` when there is nothing to buy.
    pub async fn review(&self) -> Result<CheckoutReview, CheckoutError> {
        let snapshot = self.cart.snapshot().await?;
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(CheckoutReview { snapshot })
    }

    /// Store the reviewed cart as an order and empty the cart.
    ///
    /// Lines carry the reviewed name and unit price. The order and all of its
    /// lines are written in one transaction; on failure nothing is stored and
    /// the cart is kept.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the order cannot be stored.
    #[instrument(skip(self, review, details), fields(total = %review.total()))]
    pub async fn submit(
        &self,
        review: CheckoutReview,
        details: CustomerDetails,
        user_id: Option<UserId>,
    ) -> Result<PlacedOrder, CheckoutError> {
        let CheckoutReview { snapshot } = review;
        let line_count = snapshot.lines.len();

        let new_order = NewOrder {
            user_id,
            customer_name: details.name,
            address: details.address,
            phone: details.phone,
            total_amount: snapshot.total,
            items: snapshot
                .lines
                .into_iter()
                .map(|line| NewOrderItem {
                    product_id: line.product.id,
                    product_name: line.product.name,
                    quantity: line.quantity,
                    price: line.product.price,
                })
                .collect(),
        };

        let order = self.orders.create_with_items(&new_order).await?;
        tracing::info!(order_id = %order.id, line_count, "Order placed");

        if let Err(e) = self.cart.clear().await {
            tracing::error!(order_id = %order.id, error = %e, "Order placed but cart not cleared");
        }

        Ok(PlacedOrder { order, line_count })
    }
}

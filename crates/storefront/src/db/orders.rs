//! Order repository for database operations.
//!
//! Orders are written once, together with all of their lines, inside a
//! single transaction. There are no update or delete operations.

use chrono::Utc;
use sqlx::SqlitePool;

use shopfront_core::OrderId;

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderItem, OrderWithItems};

const ORDER_COLUMNS: &str = "id, user_id, customer_name, address, phone, total_amount, created_at";
const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, quantity, price";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an order and all of its lines atomically.
    ///
    /// Either the order and every line are stored, or nothing is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; the
    /// transaction is rolled back when it is dropped uncommitted.
    pub async fn create_with_items(&self, new_order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (user_id, customer_name, address, phone, total_amount, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(new_order.user_id)
        .bind(&new_order.customer_name)
        .bind(&new_order.address)
        .bind(&new_order.phone)
        .bind(new_order.total_amount)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        for item in &new_order.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, product_name, quantity, price) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(order)
    }

    /// List all orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Get an order and its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_items(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ? ORDER BY id"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderWithItems { order, items }))
    }
}

//! Read-only access to the product catalog.

use sqlx::SqlitePool;

use shopfront_core::ProductId;

use crate::db::{ProductRepository, RepositoryError};
use crate::models::Product;

/// Catalog lookups used by the storefront pages and the cart.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// All products, in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.products.list().await
    }

    /// A single product, if it exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.products.get_by_id(id).await
    }
}

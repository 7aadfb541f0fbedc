//! Product repository for database operations.

use chrono::Utc;
use sqlx::SqlitePool;

use shopfront_core::ProductId;

use super::RepositoryError;
use crate::models::{NewProduct, Product};

const PRODUCT_COLUMNS: &str = "id, name, price, image, description, created_at";

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let created = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, price, image, description, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(product.price)
        .bind(product.image.as_deref())
        .bind(product.description.as_deref())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// Replace all editable fields of an existing product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET name = ?, price = ?, image = ?, description = ? \
             WHERE id = ? \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(product.price)
        .bind(product.image.as_deref())
        .bind(product.description.as_deref())
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// Order lines referencing the product are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::Price;

    use super::*;
    use crate::db::test_pool;

    fn new_product(name: &str, price: &str) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            price: Price::parse(price).unwrap(),
            description: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);

        let created = repo.create(&new_product("Teapot", "12.50")).await.unwrap();
        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Teapot");
        assert_eq!(fetched.price, Price::parse("12.5").unwrap());
        assert_eq!(fetched.image, None);
    }

    #[tokio::test]
    async fn test_list_in_insertion_order() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);

        repo.create(&new_product("A", "1")).await.unwrap();
        repo.create(&new_product("B", "2")).await.unwrap();

        let names: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);
        let created = repo.create(&new_product("Old", "1")).await.unwrap();

        let mut changes = new_product("New", "3");
        changes.image = Some("https://example.com/x.png".to_owned());
        let updated = repo.update(created.id, &changes).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "New");
        assert_eq!(updated.image.as_deref(), Some("https://example.com/x.png"));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);

        let result = repo.update(ProductId::new(99), &new_product("X", "1")).await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);
        let created = repo.create(&new_product("Gone", "1")).await.unwrap();

        repo.delete(created.id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(created.id).await,
            Err(RepositoryError::NotFound)
        ));
    }
}

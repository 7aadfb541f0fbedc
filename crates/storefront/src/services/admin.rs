//! Admin workflow: product management and order review.
//!
//! Callers must have passed the `RequireAdmin` guard; nothing here checks
//! the session.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::instrument;

use shopfront_core::{OrderId, Price, PriceError, ProductId};

use crate::db::{OrderRepository, ProductRepository, RepositoryError};
use crate::models::{NewProduct, Order, OrderWithItems, Product};
use crate::services::uploads::{ImageStore, UploadError};

/// Rejected product form input. Nothing is stored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductFormError {
    #[error("Product name is required.")]
    MissingName,
    #[error("Enter a valid non-negative price.")]
    InvalidPrice(#[from] PriceError),
    #[error("Invalid image type. Allowed: png, jpg, jpeg, gif.")]
    DisallowedImage,
}

/// Errors from admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Invalid(#[from] ProductFormError),
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    #[error("order {0} not found")]
    OrderNotFound(OrderId),
    #[error("upload failed: {0}")]
    Upload(#[source] std::io::Error),
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<UploadError> for AdminError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::DisallowedExtension(_) => Self::Invalid(ProductFormError::DisallowedImage),
            UploadError::Io(io) => Self::Upload(io),
        }
    }
}

/// A file received in the `image_file` form field.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Raw product form fields as submitted.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub description: String,
    /// Text `image` field: an external URL or path.
    pub image: String,
    pub image_file: Option<UploadedImage>,
}

/// Where a validated product's image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Upload(UploadedImage),
    Url(String),
    None,
}

/// A validated product form.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
    pub image: ImageSource,
}

impl ProductInput {
    /// Validate a submitted form without touching storage.
    ///
    /// An uploaded file with a name wins over the text `image` field.
    ///
    /// # Errors
    ///
    /// Returns `ProductFormError` for a blank name, an unparseable or negative
    /// price, or an upload that is not an accepted image type.
    pub fn parse(form: ProductForm) -> Result<Self, ProductFormError> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(ProductFormError::MissingName);
        }
        let price = Price::parse(&form.price)?;

        let image = match form.image_file {
            Some(file) if !file.filename.trim().is_empty() => {
                ImageStore::check_extension(&file.filename)
                    .map_err(|_| ProductFormError::DisallowedImage)?;
                ImageSource::Upload(file)
            }
            _ => match form.image.trim() {
                "" => ImageSource::None,
                url => ImageSource::Url(url.to_owned()),
            },
        };

        Ok(Self {
            name: name.to_owned(),
            price,
            description: Some(form.description.trim())
                .filter(|d| !d.is_empty())
                .map(str::to_owned),
            image,
        })
    }
}

/// Admin operations over products and orders.
pub struct AdminService<'a> {
    products: ProductRepository<'a>,
    orders: OrderRepository<'a>,
    images: &'a ImageStore,
}

impl<'a> AdminService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, images: &'a ImageStore) -> Self {
        Self {
            products: ProductRepository::new(pool),
            orders: OrderRepository::new(pool),
            images,
        }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// # Errors
    ///
    /// Returns `AdminError::Repository` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, AdminError> {
        Ok(self.products.list().await?)
    }

    /// # Errors
    ///
    /// Returns `AdminError::ProductNotFound` if the product does not exist.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, AdminError> {
        self.products
            .get_by_id(id)
            .await?
            .ok_or(AdminError::ProductNotFound(id))
    }

    /// Create a product, storing its uploaded image first.
    ///
    /// If the insert fails the stored image is deleted again.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Upload` or `AdminError::Repository` if storing fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: ProductInput) -> Result<Product, AdminError> {
        let (product, stored) = self.store_image(input).await?;

        match self.products.create(&product).await {
            Ok(created) => {
                tracing::info!(product_id = %created.id, "Product created");
                Ok(created)
            }
            Err(e) => {
                self.discard(stored.as_deref()).await;
                Err(e.into())
            }
        }
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::ProductNotFound` if the product does not exist,
    /// `AdminError::Upload` or `AdminError::Repository` if storing fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: ProductInput,
    ) -> Result<Product, AdminError> {
        let previous = self.get_product(id).await?;
        let (product, stored) = self.store_image(input).await?;

        match self.products.update(id, &product).await {
            Ok(updated) => {
                tracing::info!(product_id = %id, "Product updated");
                if previous.image != updated.image {
                    self.discard(previous.uploaded_image()).await;
                }
                Ok(updated)
            }
            Err(e) => {
                self.discard(stored.as_deref()).await;
                Err(match e {
                    RepositoryError::NotFound => AdminError::ProductNotFound(id),
                    other => other.into(),
                })
            }
        }
    }

    /// Delete a product and its uploaded image. Past order lines keep their
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::ProductNotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), AdminError> {
        let product = self.get_product(id).await?;
        self.products.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => AdminError::ProductNotFound(id),
            other => other.into(),
        })?;
        tracing::info!(product_id = %id, "Product deleted");
        self.discard(product.uploaded_image()).await;
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Repository` if the query fails.
    pub async fn list_orders(&self) -> Result<Vec<Order>, AdminError> {
        Ok(self.orders.list().await?)
    }

    /// One order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::OrderNotFound` if the order does not exist.
    pub async fn get_order(&self, id: OrderId) -> Result<OrderWithItems, AdminError> {
        self.orders
            .get_with_items(id)
            .await?
            .ok_or(AdminError::OrderNotFound(id))
    }

    /// Write the upload, if any, and return the row to store plus the stored filename.
    async fn store_image(
        &self,
        input: ProductInput,
    ) -> Result<(NewProduct, Option<String>), AdminError> {
        let (image, stored) = match input.image {
            ImageSource::Upload(file) => {
                let filename = self.images.save(&file.filename, &file.bytes).await?;
                (Some(filename.clone()), Some(filename))
            }
            ImageSource::Url(url) => (Some(url), None),
            ImageSource::None => (None, None),
        };

        let product = NewProduct {
            name: input.name,
            price: input.price,
            description: input.description,
            image,
        };
        Ok((product, stored))
    }

    async fn discard(&self, stored: Option<&str>) {
        if let Some(filename) = stored {
            self.images.remove(filename).await;
        }
    }
}

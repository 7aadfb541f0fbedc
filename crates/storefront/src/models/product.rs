//! Product domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopfront_core::{Price, ProductId};

/// URL prefix under which uploaded images are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// A catalog entry.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name (never blank).
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Stored upload filename or an external image URL.
    pub image: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// When the product was added.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// URL the product image can be loaded from, if it has one.
    ///
    /// Absolute URLs and absolute paths are used as-is; anything else is a
    /// stored upload filename.
    #[must_use]
    pub fn image_url(&self) -> Option<String> {
        match self.uploaded_image() {
            Some(filename) => Some(format!("{UPLOADS_URL_PREFIX}/{filename}")),
            None => self.image.clone(),
        }
    }

    /// Filename of the image when it lives in the upload directory.
    #[must_use]
    pub fn uploaded_image(&self) -> Option<&str> {
        self.image.as_deref().filter(|image| {
            !(image.starts_with("http://")
                || image.starts_with("https://")
                || image.starts_with('/'))
        })
    }
}

/// Validated fields for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    /// Display name (trimmed, non-empty).
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Description, `None` when left blank.
    pub description: Option<String>,
    /// Image filename or URL, `None` when there is none.
    pub image: Option<String>,
}

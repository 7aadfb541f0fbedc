//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Ceramic Mug
//!     price: "12.50"
//!     description: Holds 350 ml.
//!     image: https://images.example.test/mug.jpg
//! ```
//!
//! Prices are strings so they keep their exact decimal value. Every entry is
//! validated before anything is written; products whose name already exists
//! are skipped, so the command can be re-run safely.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info};

use shopfront_storefront::db::{ProductRepository, RepositoryError};
use shopfront_storefront::models::NewProduct;
use shopfront_storefront::services::admin::{ImageSource, ProductForm, ProductInput};

use super::migrate::MigrationError;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Could not read {0}: {1}")]
    Read(String, #[source] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error(transparent)]
    Connect(#[from] MigrationError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Top-level structure of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// One product entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl From<SeedProduct> for ProductForm {
    fn from(p: SeedProduct) -> Self {
        Self {
            name: p.name,
            price: p.price,
            description: p.description,
            image: p.image,
            image_file: None,
        }
    }
}

/// Outcome of a seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Seed products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any entry is
/// invalid, or database operations fail.
pub async fn products(file_path: &str) -> Result<(), SeedError> {
    info!(path = %file_path, "Loading products from file");
    let file = load_file(Path::new(file_path)).await?;
    info!(products = file.products.len(), "Parsed seed file");

    let pool = super::connect().await?;
    let summary = seed_products(&pool, file).await?;

    info!("Seeding complete!");
    info!("  Products inserted: {}", summary.inserted);
    info!("  Products skipped (already exist): {}", summary.skipped);

    Ok(())
}

/// Read and parse a seed file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid YAML.
pub async fn load_file(path: &Path) -> Result<SeedFile, SeedError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SeedError::Read(path.display().to_string(), e))?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Validate every entry, then insert the ones not already in the catalog.
///
/// # Errors
///
/// Returns `SeedError::Invalid` without writing anything if any entry fails
/// validation, or `SeedError::Repository` if an insert fails.
pub async fn seed_products(pool: &SqlitePool, file: SeedFile) -> Result<SeedSummary, SeedError> {
    let mut products = Vec::with_capacity(file.products.len());
    let mut invalid = 0;

    for (index, entry) in file.products.into_iter().enumerate() {
        let name = entry.name.clone();
        match ProductInput::parse(entry.into()) {
            Ok(input) => products.push(into_new_product(input)),
            Err(e) => {
                error!("  - product {} ({name}): {e}", index + 1);
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        return Err(SeedError::Invalid(invalid));
    }

    let repo = ProductRepository::new(pool);
    let mut existing: HashSet<String> = repo.list().await?.into_iter().map(|p| p.name).collect();
    let mut summary = SeedSummary::default();

    for product in products {
        if existing.contains(&product.name) {
            summary.skipped += 1;
            continue;
        }
        let created = repo.create(&product).await?;
        info!(product_id = %created.id, name = %created.name, "Inserted product");
        existing.insert(created.name);
        summary.inserted += 1;
    }

    Ok(summary)
}

fn into_new_product(input: ProductInput) -> NewProduct {
    let image = match input.image {
        ImageSource::Url(url) => Some(url),
        ImageSource::Upload(_) | ImageSource::None => None,
    };
    NewProduct {
        name: input.name,
        price: input.price,
        description: input.description,
        image,
    }
}

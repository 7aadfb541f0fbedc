//! Catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use tracing::instrument;

use shopfront_core::ProductId;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::PageContext;
use crate::models::Product;
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// Catalog listing template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub page: PageContext,
    pub products: Vec<Product>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub page: PageContext,
    pub product: Product,
}

/// Display every product.
#[instrument(skip(state, page))]
pub async fn index(State(state): State<AppState>, page: PageContext) -> Result<IndexTemplate> {
    let products = CatalogService::new(state.pool()).list_products().await?;
    Ok(IndexTemplate { page, products })
}

/// Display a single product.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    page: PageContext,
) -> Result<ProductTemplate> {
    let product = CatalogService::new(state.pool())
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductTemplate { page, product })
}

/// Dump the catalog as JSON. Mounted only when debug routes are enabled.
#[instrument(skip(state))]
pub async fn debug_products(State(state): State<AppState>) -> Result<Json<Value>> {
    let products = CatalogService::new(state.pool()).list_products().await?;

    let products: Vec<Value> = products
        .into_iter()
        .map(|p| {
            json!({
                "id": p.id,
                "name": p.name,
                "price": p.price,
                "desc": p.description,
                "image": p.image,
            })
        })
        .collect();

    Ok(Json(json!({ "products": products })))
}

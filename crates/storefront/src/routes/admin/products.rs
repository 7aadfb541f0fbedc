//! Admin product management.
//!
//! Create and edit forms are `multipart/form-data` so an image file can be
//! sent alongside the text fields.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State, multipart::MultipartError},
    response::Redirect,
};
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::ProductId;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin, flash};
use crate::models::Product;
use crate::services::admin::{AdminError, AdminService, ProductForm, ProductInput, UploadedImage};
use crate::services::uploads::ALLOWED_IMAGE_EXTENSIONS;
use crate::state::AppState;

const SAVE_FAILED: &str = "Error saving product";

// =============================================================================
// Templates
// =============================================================================

/// Product list and creation form.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products.html")]
pub struct ProductsTemplate {
    pub page: PageContext,
    pub products: Vec<Product>,
    pub allowed_extensions: String,
}

/// Product edit form.
#[derive(Template, WebTemplate)]
#[template(path = "admin/edit_product.html")]
pub struct EditProductTemplate {
    pub page: PageContext,
    pub product: Product,
    pub allowed_extensions: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// List products with the creation form.
#[instrument(skip(_admin, state, page))]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    page: PageContext,
) -> Result<ProductsTemplate> {
    let products = AdminService::new(state.pool(), state.images())
        .list_products()
        .await?;

    Ok(ProductsTemplate {
        page,
        products,
        allowed_extensions: allowed_extensions(),
    })
}

/// Create a product from the multipart form.
#[instrument(skip(_admin, state, session, multipart))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect> {
    let form = read_product_form(multipart).await?;
    let service = AdminService::new(state.pool(), state.images());

    let result = match ProductInput::parse(form) {
        Ok(input) => service.create_product(input).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(product) => {
            add_breadcrumb(
                "admin",
                "Product created",
                Some(&[("product_id", &product.id.to_string())]),
            );
            flash(&session, "Product added successfully.").await?;
        }
        Err(e) => report_failure(&session, e).await?,
    }

    Ok(Redirect::to("/admin"))
}

/// Display the edit form for a product.
#[instrument(skip(_admin, state, page))]
pub async fn edit_page(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    page: PageContext,
) -> Result<EditProductTemplate> {
    let product = AdminService::new(state.pool(), state.images())
        .get_product(id)
        .await?;

    Ok(EditProductTemplate {
        page,
        product,
        allowed_extensions: allowed_extensions(),
    })
}

/// Save an edited product.
///
/// Invalid input sends the admin back to the form; everything else returns
/// to the product list.
#[instrument(skip(_admin, state, session, multipart))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Redirect> {
    let form = read_product_form(multipart).await?;
    let service = AdminService::new(state.pool(), state.images());

    let result = match ProductInput::parse(form) {
        Ok(input) => service.update_product(id, input).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(_) => {
            flash(&session, "Product updated.").await?;
            Ok(Redirect::to("/admin"))
        }
        Err(AdminError::Invalid(e)) => {
            flash(&session, e.to_string()).await?;
            Ok(Redirect::to(&format!("/admin/product/edit/{id}")))
        }
        Err(e) => {
            report_failure(&session, e).await?;
            Ok(Redirect::to("/admin"))
        }
    }
}

/// Delete a product.
#[instrument(skip(_admin, state, session))]
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    AdminService::new(state.pool(), state.images())
        .delete_product(id)
        .await?;
    flash(&session, "Product deleted.").await?;

    Ok(Redirect::to("/admin"))
}

// =============================================================================
// Helpers
// =============================================================================

/// Flash validation and storage failures; a missing product is a 404.
async fn report_failure(session: &Session, error: AdminError) -> Result<()> {
    match error {
        AdminError::Invalid(e) => flash(session, e.to_string()).await?,
        AdminError::Upload(_) | AdminError::Repository(_) => {
            let event_id = sentry::capture_error(&error);
            tracing::error!(error = %error, sentry_event_id = %event_id, "Failed to save product");
            flash(session, SAVE_FAILED).await?;
        }
        AdminError::ProductNotFound(_) | AdminError::OrderNotFound(_) => {
            return Err(error.into());
        }
    }
    Ok(())
}

/// Collect the product form fields from a multipart body.
///
/// Unknown fields are ignored. An `image_file` part without a filename
/// (an empty file input) is kept and later treated as no upload.
async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "image_file" => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                form.image_file = Some(UploadedImage {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            "name" => form.name = field.text().await.map_err(bad_multipart)?,
            "price" => form.price = field.text().await.map_err(bad_multipart)?,
            "description" => form.description = field.text().await.map_err(bad_multipart)?,
            "image" => form.image = field.text().await.map_err(bad_multipart)?,
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

fn bad_multipart(e: MultipartError) -> AppError {
    AppError::BadRequest(e.body_text())
}

fn allowed_extensions() -> String {
    ALLOWED_IMAGE_EXTENSIONS.join(", ")
}

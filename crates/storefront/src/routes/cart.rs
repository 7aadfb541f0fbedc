//! Cart route handlers.
//!
//! Every cart change answers with a redirect; input problems become flash
//! messages on the cart page rather than error responses.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::{HeaderMap, header},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{Price, ProductId};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{PageContext, flash};
use crate::services::cart::{CartLine, CartManager, CartUpdate};
use crate::services::catalog::CatalogService;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Cart update form data. Fields are validated by [`CartUpdate::parse`].
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub pid: Option<String>,
    pub action: Option<String>,
    pub qty: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub lines: Vec<CartLine>,
    pub total: Price,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart.
#[instrument(skip(state, session, page))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
) -> Result<CartTemplate> {
    let snapshot = CartManager::new(&session, CatalogService::new(state.pool()))
        .snapshot()
        .await?;

    Ok(CartTemplate {
        page,
        lines: snapshot.lines,
        total: snapshot.total,
    })
}

/// Add one unit of a product and go back to the previous page.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    CartManager::new(&session, CatalogService::new(state.pool()))
        .add(id)
        .await?;
    add_breadcrumb("cart", "Added product", Some(&[("product_id", &id.to_string())]));
    flash(&session, "Item added to cart").await?;

    Ok(Redirect::to(&back_to(&headers, &state.config().base_url)))
}

/// Drop a product from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    CartManager::new(&session, CatalogService::new(state.pool()))
        .remove(id)
        .await?;
    flash(&session, "Item removed from cart").await?;

    Ok(Redirect::to("/cart"))
}

/// Apply an `inc`, `dec`, `set` or `remove` action from the cart page.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    match CartUpdate::parse(
        form.pid.as_deref(),
        form.action.as_deref(),
        form.qty.as_deref(),
    ) {
        Ok(update) => {
            CartManager::new(&session, CatalogService::new(state.pool()))
                .update(update)
                .await?;
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected cart update");
            flash(&session, e.to_string()).await?;
        }
    }

    Ok(Redirect::to("/cart"))
}

// =============================================================================
// Helpers
// =============================================================================

/// Same-site path from the `Referer` header, or `/`.
fn back_to(headers: &HeaderMap, base_url: &str) -> String {
    let Some(referer) = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
    else {
        return "/".to_owned();
    };

    let path = referer
        .strip_prefix(base_url.trim_end_matches('/'))
        .unwrap_or(referer);

    // `//host` and `/\host` are both read by browsers as another origin.
    match path.as_bytes() {
        [b'/', b'/' | b'\\', ..] => "/".to_owned(),
        [b'/', ..] => path.to_owned(),
        _ => "/".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn with_referer(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_back_to_same_site() {
        let base = "http://localhost:3000";
        assert_eq!(
            back_to(&with_referer("http://localhost:3000/product/2"), base),
            "/product/2"
        );
        assert_eq!(back_to(&with_referer("/cart"), base), "/cart");
    }

    #[test]
    fn test_back_to_rejects_other_sites() {
        let base = "http://localhost:3000";
        assert_eq!(back_to(&with_referer("https://evil.test/phish"), base), "/");
        assert_eq!(back_to(&with_referer("//evil.test/phish"), base), "/");
        assert_eq!(back_to(&with_referer("/\\evil.test/phish"), base), "/");
        assert_eq!(
            back_to(&with_referer("http://localhost:3000/\\evil.test"), base),
            "/"
        );
        assert_eq!(back_to(&HeaderMap::new(), base), "/");
    }
}

//! Checkout route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalUser, PageContext, flash};
use crate::models::{OrderWithItems, session_keys};
use crate::services::cart::CartManager;
use crate::services::catalog::CatalogService;
use crate::services::checkout::{CheckoutError, CheckoutReview, CheckoutWorkflow, CustomerDetails};
use crate::state::AppState;

/// Checkout form data.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Checkout review page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub review: CheckoutReview,
    pub form: CheckoutForm,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "order_success.html")]
pub struct OrderSuccessTemplate {
    pub page: PageContext,
    pub order: OrderWithItems,
}

/// Show the cart for confirmation with the delivery form.
#[instrument(skip(state, session, page))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
) -> Result<Response> {
    let cart = CartManager::new(&session, CatalogService::new(state.pool()));
    let workflow = CheckoutWorkflow::new(&cart, OrderRepository::new(state.pool()));

    match workflow.review().await {
        Ok(review) => Ok(CheckoutTemplate {
            page,
            review,
            form: CheckoutForm::default(),
        }
        .into_response()),
        Err(e) => leave_checkout(&session, e).await,
    }
}

/// Place the order.
#[instrument(skip(state, session, page, user, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    page: PageContext,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let cart = CartManager::new(&session, CatalogService::new(state.pool()));
    let workflow = CheckoutWorkflow::new(&cart, OrderRepository::new(state.pool()));

    let review = match workflow.review().await {
        Ok(review) => review,
        Err(e) => return leave_checkout(&session, e).await,
    };

    let details = match CustomerDetails::parse(
        form.name.as_deref(),
        form.address.as_deref(),
        form.phone.as_deref(),
    ) {
        Ok(details) => details,
        Err(e) => {
            return Ok(CheckoutTemplate {
                page: page.with_flash(e.to_string()),
                review,
                form,
            }
            .into_response());
        }
    };

    let user_id = user.map(|u| u.id);
    match workflow.submit(review.clone(), details, user_id).await {
        Ok(placed) => {
            add_breadcrumb(
                "checkout",
                "Order placed",
                Some(&[("order_id", &placed.order.id.to_string())]),
            );
            remember_order(&session, placed.order.id).await?;
            Ok(Redirect::to(&format!("/order-success/{}", placed.order.id)).into_response())
        }
        Err(CheckoutError::Repository(e)) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Checkout failed");
            Ok(CheckoutTemplate {
                page: page.with_flash("Could not place your order. Please try again."),
                review,
                form,
            }
            .into_response())
        }
        Err(e) => leave_checkout(&session, e).await,
    }
}

/// Confirmation page for an order placed from this session.
///
/// Other visitors get a 404 for the same URL.
#[instrument(skip(state, session, page))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
    page: PageContext,
) -> Result<OrderSuccessTemplate> {
    if !placed_orders(&session).await?.contains(&id) {
        return Err(AppError::NotFound(format!("order {id}")));
    }

    let order = OrderRepository::new(state.pool())
        .get_with_items(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(OrderSuccessTemplate { page, order })
}

/// How many placed orders a session can revisit.
const PLACED_ORDERS_KEPT: usize = 10;

async fn placed_orders(session: &Session) -> Result<Vec<OrderId>> {
    Ok(session
        .get(session_keys::PLACED_ORDERS)
        .await?
        .unwrap_or_default())
}

async fn remember_order(session: &Session, id: OrderId) -> Result<()> {
    let mut orders = placed_orders(session).await?;
    orders.push(id);
    if orders.len() > PLACED_ORDERS_KEPT {
        orders.drain(..orders.len() - PLACED_ORDERS_KEPT);
    }
    session.insert(session_keys::PLACED_ORDERS, orders).await?;
    Ok(())
}

/// Send the customer back to the catalog when there is nothing to check out.
async fn leave_checkout(session: &Session, error: CheckoutError) -> Result<Response> {
    match error {
        CheckoutError::EmptyCart => {
            flash(session, error.to_string()).await?;
            Ok(Redirect::to("/").into_response())
        }
        CheckoutError::Cart(e) => Err(e.into()),
        CheckoutError::Repository(e) => Err(e.into()),
        CheckoutError::MissingField(_) => Err(AppError::BadRequest(error.to_string())),
    }
}

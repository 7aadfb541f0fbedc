//! Admin order review.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use shopfront_core::OrderId;

use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin};
use crate::models::{Order, OrderWithItems};
use crate::services::admin::AdminService;
use crate::state::AppState;

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<Order>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/order.html")]
pub struct OrderTemplate {
    pub page: PageContext,
    pub order: OrderWithItems,
}

/// All orders, newest first.
#[instrument(skip(_admin, state, page))]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    page: PageContext,
) -> Result<OrdersTemplate> {
    let orders = AdminService::new(state.pool(), state.images())
        .list_orders()
        .await?;

    Ok(OrdersTemplate { page, orders })
}

/// One order and its lines.
#[instrument(skip(_admin, state, page))]
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    page: PageContext,
) -> Result<OrderTemplate> {
    let order = AdminService::new(state.pool(), state.images())
        .get_order(id)
        .await?;

    Ok(OrderTemplate { page, order })
}

//! Order route handlers: history, detail with the progress line,
//! cancellation, and invoice download.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tamarind_core::{Milestone, OrderId, OrderStatus};

use crate::api::{ApiError, Order, OrderItem};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::products::{format_inr, NotFoundTemplate};
use crate::routes::PageContext;
use crate::services::SessionError;
use crate::state::AppState;

/// One milestone on the rendered progress line.
#[derive(Clone)]
pub struct MilestoneView {
    pub label: &'static str,
    pub reached: bool,
}

/// Build the progress line for a status.
///
/// Cancelled orders bypass the projection entirely and are rendered as a
/// terminal state instead of a point on the line.
#[must_use]
pub fn timeline(status: OrderStatus) -> Vec<MilestoneView> {
    Milestone::ALL
        .iter()
        .map(|milestone| MilestoneView {
            label: milestone.label(),
            reached: status.reaches(*milestone),
        })
        .collect()
}

/// Order line display data.
#[derive(Clone)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub subtotal: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.product.name.clone(),
            quantity: item.quantity.get(),
            price: format_inr(item.price),
            subtotal: format_inr(item.subtotal()),
        }
    }
}

/// Order display data.
#[derive(Clone)]
pub struct OrderView {
    pub id: i64,
    pub placed_on: String,
    pub status: &'static str,
    pub cancelled: bool,
    pub cancellable: bool,
    pub total: String,
    pub shipping_address: String,
    pub phone: String,
    pub items: Vec<OrderItemView>,
    pub milestones: Vec<MilestoneView>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i64(),
            placed_on: order.created_at.format("%d %b %Y, %H:%M").to_string(),
            status: order.status.label(),
            cancelled: order.status == OrderStatus::Cancelled,
            cancellable: order.status.is_cancellable(),
            total: format_inr(order.total_amount),
            shipping_address: order.shipping_address.clone(),
            phone: order.phone.clone().unwrap_or_default(),
            items: order.items.iter().map(OrderItemView::from).collect(),
            milestones: timeline(order.status),
        }
    }
}

/// Query parameters for flash display on the detail page.
#[derive(Debug, Deserialize)]
pub struct OrderPageQuery {
    pub placed: Option<u8>,
    pub error: Option<String>,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub ctx: PageContext,
    pub orders: Vec<OrderView>,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub ctx: PageContext,
    pub order: OrderView,
    pub just_placed: bool,
    pub error: Option<String>,
}

/// Display order history, newest first.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
) -> Result<impl IntoResponse> {
    let ctx = PageContext::load(&state, &session).await;

    let orders = state
        .sessions()
        .with_token(&session, |token| {
            let api = state.api();
            async move { api.list_orders(&token).await }
        })
        .await?;

    Ok(OrdersIndexTemplate {
        ctx,
        orders: orders.iter().map(OrderView::from).collect(),
    })
}

/// Display one order with its progress line.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<i64>,
    Query(query): Query<OrderPageQuery>,
) -> Result<Response> {
    let ctx = PageContext::load(&state, &session).await;

    let Some(order) = fetch_order(&state, &session, OrderId::new(id)).await? else {
        return Ok((StatusCode::NOT_FOUND, NotFoundTemplate { ctx }).into_response());
    };

    Ok(OrderShowTemplate {
        ctx,
        order: OrderView::from(&order),
        just_placed: query.placed == Some(1),
        error: query.error,
    }
    .into_response())
}

/// Request cancellation of an order.
///
/// Gated locally on the projection (`is_cancellable`) so a delivered order
/// never produces a request; the backend enforces the same rule and its
/// rejection comes back as the same flash message. Either way the
/// displayed status is whatever the re-fetch reports.
#[instrument(skip(state, session))]
pub async fn cancel(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Response> {
    let order_id = OrderId::new(id);

    let Some(order) = fetch_order(&state, &session, order_id).await? else {
        let ctx = PageContext::load(&state, &session).await;
        return Ok((StatusCode::NOT_FOUND, NotFoundTemplate { ctx }).into_response());
    };

    if !order.status.is_cancellable() {
        return Ok(order_error(order_id, "Order cannot be cancelled"));
    }

    match state
        .sessions()
        .with_token(&session, |token| {
            let api = state.api();
            async move { api.cancel_order(&token, order_id).await }
        })
        .await
    {
        Ok(()) => Ok(Redirect::to(&format!("/orders/{order_id}")).into_response()),
        Err(SessionError::Api(ApiError::Validation(message))) => {
            Ok(order_error(order_id, &message))
        }
        Err(e) => Err(e.into()),
    }
}

/// Stream the order's invoice PDF.
#[instrument(skip(state, session))]
pub async fn invoice(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Response> {
    let order_id = OrderId::new(id);

    let bytes = state
        .sessions()
        .with_token(&session, |token| {
            let api = state.api();
            async move { api.download_invoice(&token, order_id).await }
        })
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"invoice_{order_id}.pdf\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

// =============================================================================
// Helpers
// =============================================================================

/// Fetch an order; `Ok(None)` means the backend reported it missing (or
/// owned by someone else, which it deliberately does not distinguish).
async fn fetch_order(
    state: &AppState,
    session: &Session,
    order_id: OrderId,
) -> Result<Option<Order>> {
    match state
        .sessions()
        .with_token(session, |token| async move {
            state.api().get_order(&token, order_id).await
        })
        .await
    {
        Ok(order) => Ok(Some(order)),
        Err(SessionError::Api(ApiError::NotFound(_))) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn order_error(order_id: OrderId, message: &str) -> Response {
    Redirect::to(&format!(
        "/orders/{order_id}?error={}",
        urlencoding::encode(message)
    ))
    .into_response()
}

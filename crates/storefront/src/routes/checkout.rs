//! Checkout route handlers.
//!
//! The storefront computes display totals only; the backend recomputes the
//! authoritative order total from its own price snapshots when the order
//! is created.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{ApiError, OrderDraft, OrderItemDraft};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::cart::CartView;
use crate::routes::PageContext;
use crate::services::SessionError;
use crate::state::AppState;

/// Shipping details form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub shipping_address: String,
    pub phone: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    pub error: Option<String>,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub cart: CartView,
    pub error: Option<String>,
}

/// Display the checkout page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
    Query(query): Query<CheckoutQuery>,
) -> Result<Response> {
    let ctx = PageContext::load(&state, &session).await;

    let snapshot = state.cart().fetch(&session).await?;
    if snapshot.is_empty() {
        // Nothing to check out; back to the cart's empty view.
        return Ok(Redirect::to("/cart").into_response());
    }

    Ok(CheckoutTemplate {
        ctx,
        cart: CartView::from(&snapshot),
        error: query.error,
    }
    .into_response())
}

/// Place the order from the current cart contents.
///
/// Client-side gates mirror the original flow: the address must be
/// non-empty and the phone must be exactly ten digits; neither reaches the
/// backend when malformed. Stock is the backend's call - an insufficient-
/// stock rejection comes back as a validation message.
#[instrument(skip(state, session, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let address = form.shipping_address.trim().to_owned();
    let phone = form.phone.trim().to_owned();

    if address.is_empty() {
        return Ok(checkout_error("Please enter a shipping address"));
    }
    if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Ok(checkout_error("Please enter a valid 10-digit phone number"));
    }

    let snapshot = state.cart().fetch(&session).await?;
    if snapshot.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let draft = OrderDraft {
        shipping_address: address,
        phone,
        items_write: snapshot
            .items
            .iter()
            .map(|item| OrderItemDraft {
                product_id: item.product.id,
                quantity: item.quantity,
            })
            .collect(),
    };

    let order = match state
        .sessions()
        .with_token(&session, |token| {
            let api = state.api();
            let draft = &draft;
            async move { api.create_order(&token, draft).await }
        })
        .await
    {
        Ok(order) => order,
        Err(SessionError::Api(ApiError::Validation(message))) => {
            return Ok(checkout_error(&message));
        }
        Err(e) => return Err(e.into()),
    };

    // The backend moved the items into the order; clear the mirrored cart
    // and settle on its (now empty) state.
    if let Err(e) = state.cart().clear(&session).await {
        tracing::warn!(error = %e, "cart clear after order placement failed");
    }

    Ok(Redirect::to(&format!("/orders/{}?placed=1", order.id)).into_response())
}

fn checkout_error(message: &str) -> Response {
    Redirect::to(&format!(
        "/checkout?error={}",
        urlencoding::encode(message)
    ))
    .into_response()
}

//! Cart route handlers.
//!
//! Every mutation posts a form, runs the mutate-then-refetch cycle in the
//! cart service, and redirects back to the cart page (or the page named in
//! the form's `next` field). Validation failures travel back as an `error`
//! query parameter instead of an error page.

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

use tamarind_core::{CartItemId, ProductId, Quantity};

use crate::api::{ApiError, CartItem};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::products::format_inr;
use crate::routes::PageContext;
use crate::services::cart::{CartError, CartSnapshot};
use crate::services::SessionError;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
    pub image: Option<String>,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.as_i64(),
            product_id: item.product.id.as_i64(),
            name: item.product.name.clone(),
            quantity: item.quantity.get(),
            price: format_inr(item.product.price),
            line_total: format_inr(item.line_total()),
            image: item.product.image.clone(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub subtotal: String,
    pub shipping: String,
    pub free_shipping: bool,
    pub tax: String,
    pub grand_total: String,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self::from(&CartSnapshot::default())
    }
}

impl From<&CartSnapshot> for CartView {
    fn from(snapshot: &CartSnapshot) -> Self {
        let totals = snapshot.totals();
        Self {
            items: snapshot.items.iter().map(CartItemView::from).collect(),
            item_count: snapshot.item_count(),
            subtotal: format_inr(totals.subtotal),
            shipping: format_inr(totals.shipping),
            free_shipping: totals.free_shipping(),
            tax: format_inr(totals.tax),
            grand_total: format_inr(totals.grand_total),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i64,
    pub quantity: Option<u32>,
    pub next: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: i64,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: i64,
}

/// Query parameters for error display on the cart page.
#[derive(Debug, Deserialize)]
pub struct CartPageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub ctx: PageContext,
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
    Query(query): Query<CartPageQuery>,
) -> Result<Response> {
    let ctx = PageContext::load(&state, &session).await;

    // A transport failure renders the empty view; the page itself should
    // not become an error banner.
    let cart = match state.cart().fetch(&session).await {
        Ok(snapshot) => CartView::from(&snapshot),
        Err(CartError::Session(SessionError::NotAuthenticated)) => {
            return Ok(Redirect::to("/auth/login").into_response());
        }
        Err(e) => {
            tracing::warn!(error = %e, "cart fetch failed");
            CartView::empty()
        }
    };

    Ok(CartShowTemplate {
        ctx,
        cart,
        error: query.error,
    }
    .into_response())
}

/// Add a product to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity =
        Quantity::new(form.quantity.unwrap_or(1)).map_err(|_| CartError::QuantityBelowMinimum)?;
    let next = form.next.unwrap_or_else(|| "/cart".to_string());

    match state
        .cart()
        .add(&session, ProductId::new(form.product_id), quantity)
        .await
    {
        Ok(_) => Ok(Redirect::to(&next).into_response()),
        Err(e) => validation_redirect(e, &next),
    }
}

/// Change a cart line's quantity.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    match state
        .cart()
        .update_quantity(&session, CartItemId::new(form.item_id), form.quantity)
        .await
    {
        Ok(_) => Ok(Redirect::to("/cart").into_response()),
        Err(e) => validation_redirect(e, "/cart"),
    }
}

/// Remove a cart line.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    state
        .cart()
        .remove(&session, CartItemId::new(form.item_id))
        .await?;
    Ok(Redirect::to("/cart").into_response())
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Response> {
    state.cart().clear(&session).await?;
    Ok(Redirect::to("/cart").into_response())
}

/// Cart count badge fragment.
#[instrument(skip(state, session))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
) -> Result<impl IntoResponse> {
    let count = match state.cart().fetch(&session).await {
        Ok(snapshot) => snapshot.item_count(),
        Err(e) => {
            tracing::warn!(error = %e, "cart count fetch failed");
            0
        }
    };

    Ok(CartCountTemplate { count })
}

/// Map a cart failure onto a redirect-with-message where the user can act
/// on it; everything else propagates to the unified error handler.
fn validation_redirect(error: CartError, next: &str) -> Result<Response> {
    match &error {
        CartError::QuantityBelowMinimum => Ok(redirect_with_error(next, "Quantity must be at least 1")),
        CartError::Session(SessionError::Api(ApiError::Validation(message))) => {
            Ok(redirect_with_error(next, message))
        }
        _ => Err(error.into()),
    }
}

fn redirect_with_error(next: &str, message: &str) -> Response {
    let separator = if next.contains('?') { '&' } else { '?' };
    Redirect::to(&format!(
        "{next}{separator}error={}",
        urlencoding::encode(message)
    ))
    .into_response()
}

//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tamarind_core::ProductId;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::products::ProductView;
use crate::routes::PageContext;
use crate::state::AppState;

/// Toggle form data. `next` names the page to return to, so listing pages
/// and the detail page can all share the one endpoint.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: i64,
    pub next: Option<String>,
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistShowTemplate {
    pub ctx: PageContext,
    pub products: Vec<ProductView>,
}

/// Wishlist count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_count.html")]
pub struct WishlistCountTemplate {
    pub count: u32,
}

/// Display the wishlist page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
) -> Result<impl IntoResponse> {
    let ctx = PageContext::load(&state, &session).await;

    let items = state.wishlist().fetch(&session).await?;

    Ok(WishlistShowTemplate {
        ctx,
        products: items
            .iter()
            .map(|item| ProductView::from(&item.product))
            .collect(),
    })
}

/// Toggle a product's membership in the wishlist.
///
/// Membership is resolved by fetching the set and scanning it; the toggle
/// then issues the matching add or remove, and the service broadcasts the
/// change so badges elsewhere refresh.
#[instrument(skip(state, session))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
    Form(form): Form<ToggleForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);

    if state.wishlist().is_member(&session, product_id).await? {
        state.wishlist().remove(&session, product_id).await?;
    } else {
        state.wishlist().add(&session, product_id).await?;
    }

    let next = form.next.unwrap_or_else(|| "/wishlist".to_string());
    Ok(Redirect::to(&next).into_response())
}

/// Wishlist count badge fragment.
#[instrument(skip(state, session))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
) -> Result<impl IntoResponse> {
    let count = match state.wishlist().count(&session).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(error = %e, "wishlist count fetch failed");
            0
        }
    };

    Ok(WishlistCountTemplate { count })
}

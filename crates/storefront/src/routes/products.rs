//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tamarind_core::{CurrencyCode, Price, ProductId};

use crate::api::{ApiError, Product, ProductQuery};
use crate::error::Result;
use crate::filters;
use crate::routes::PageContext;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub in_stock: bool,
    pub featured: bool,
    pub trending: bool,
}

/// Format a backend decimal amount for display.
pub fn format_inr(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::INR).display()
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: format_inr(product.price),
            image: product.image.clone(),
            category: product.category.as_ref().map(|c| c.name.clone()),
            in_stock: product.in_stock(),
            featured: product.featured,
            trending: product.trending,
        }
    }
}

/// Listing filter parameters, forwarded to the backend.
///
/// Price bounds arrive as raw strings because empty form fields submit as
/// `min_price=`; anything that does not parse is simply not forwarded.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub ctx: PageContext,
    pub products: Vec<ProductView>,
    pub search: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub ctx: PageContext,
    pub product: ProductView,
    pub wishlisted: bool,
}

/// Explicit not-found view (used instead of an error banner).
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub ctx: PageContext,
}

/// Display product listing page with search and filters.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListingQuery>,
) -> Result<Response> {
    let ctx = PageContext::load(&state, &session).await;

    let backend_query = ProductQuery {
        search: query.search.clone().filter(|s| !s.trim().is_empty()),
        category: query.category.clone().filter(|s| !s.is_empty()),
        min_price: query.min_price.as_deref().and_then(|s| s.parse().ok()),
        max_price: query.max_price.as_deref().and_then(|s| s.parse().ok()),
        ..ProductQuery::default()
    };

    let products = state.api().list_products(&backend_query).await?;

    Ok(ProductsIndexTemplate {
        ctx,
        products: products.iter().map(ProductView::from).collect(),
        search: query.search.unwrap_or_default(),
    }
    .into_response())
}

/// Display product detail page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response> {
    let ctx = PageContext::load(&state, &session).await;

    let product = match state.api().get_product(ProductId::new(id)).await {
        Ok(product) => product,
        Err(ApiError::NotFound(_)) => {
            return Ok((StatusCode::NOT_FOUND, NotFoundTemplate { ctx }).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    // Membership drives the wishlist toggle state; anonymous visitors just
    // see the unfilled icon.
    let wishlisted = if ctx.user.is_some() {
        state
            .wishlist()
            .is_member(&session, product.id)
            .await
            .unwrap_or(false)
    } else {
        false
    };

    Ok(ProductShowTemplate {
        ctx,
        product: ProductView::from(&product),
        wishlisted,
    }
    .into_response())
}

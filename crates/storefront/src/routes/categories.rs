//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{ApiError, Category};
use crate::error::Result;
use crate::filters;
use crate::routes::products::{NotFoundTemplate, ProductView};
use crate::routes::PageContext;
use crate::state::AppState;

/// Category display data for templates.
#[derive(Clone)]
pub struct CategoryView {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub product_count: u32,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            image: category.image.clone(),
            product_count: category.product_count.unwrap_or(0),
        }
    }
}

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub ctx: PageContext,
    pub categories: Vec<CategoryView>,
}

/// Category products page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub ctx: PageContext,
    pub slug: String,
    pub products: Vec<ProductView>,
}

/// Display the category listing.
#[instrument(skip(state, session))]
pub async fn index(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let ctx = PageContext::load(&state, &session).await;
    let categories = state.api().list_categories().await?;

    Ok(CategoriesIndexTemplate {
        ctx,
        categories: categories.iter().map(CategoryView::from).collect(),
    })
}

/// Display the products belonging to a category.
#[instrument(skip(state, session), fields(slug = %slug))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Response> {
    let ctx = PageContext::load(&state, &session).await;

    let products = match state.api().list_category_products(&slug).await {
        Ok(products) => products,
        Err(ApiError::NotFound(_)) => {
            return Ok((StatusCode::NOT_FOUND, NotFoundTemplate { ctx }).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    Ok(CategoryShowTemplate {
        ctx,
        slug,
        products: products.iter().map(ProductView::from).collect(),
    }
    .into_response())
}

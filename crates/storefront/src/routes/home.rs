//! Home page: featured and trending product rails.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ProductQuery;
use crate::error::Result;
use crate::filters;
use crate::routes::products::ProductView;
use crate::routes::PageContext;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub featured: Vec<ProductView>,
    pub trending: Vec<ProductView>,
}

/// Display the home page.
///
/// A failed rail fetch renders as an empty rail rather than an error page;
/// the home page should survive a flaky backend.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let ctx = PageContext::load(&state, &session).await;

    let featured = match state.api().list_products(&ProductQuery::featured()).await {
        Ok(products) => products.iter().map(ProductView::from).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "featured rail fetch failed");
            Vec::new()
        }
    };

    let trending = match state.api().list_products(&ProductQuery::trending()).await {
        Ok(products) => products.iter().map(ProductView::from).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "trending rail fetch failed");
            Vec::new()
        }
    };

    Ok(HomeTemplate {
        ctx,
        featured,
        trending,
    })
}

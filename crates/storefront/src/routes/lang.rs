//! Language preference route.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::i18n::Lang;
use crate::models::session_keys;
use crate::state::AppState;

/// Query parameters for the post-switch redirect target.
#[derive(Debug, Deserialize)]
pub struct LangQuery {
    pub next: Option<String>,
}

/// Persist the visitor's language preference and bounce back.
///
/// The code lives under its own session key, separate from the credential
/// keys, and survives logout. An unknown code falls back to the configured
/// default rather than erroring.
#[instrument(skip(state, session))]
pub async fn set_language(
    State(state): State<AppState>,
    session: Session,
    Path(code): Path<String>,
    Query(query): Query<LangQuery>,
) -> Result<Response> {
    let lang = code
        .parse::<Lang>()
        .unwrap_or(state.config().default_language);

    session
        .insert(session_keys::LANGUAGE, lang)
        .await
        .map_err(crate::services::SessionError::from)?;

    let next = query.next.unwrap_or_else(|| "/".to_string());
    Ok(Redirect::to(&next).into_response())
}

//! Authentication route handlers.
//!
//! The storefront never sees password hashes: credentials are exchanged at
//! the backend's token endpoint for a bearer pair, which the session
//! service persists. Logout is local-only.

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

use tamarind_core::Email;

use crate::api::ApiError;
use crate::error::{clear_sentry_user, set_sentry_user, Result};
use crate::filters;
use crate::routes::PageContext;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
#[instrument(skip(state, session))]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let ctx = PageContext::load(&state, &session).await;
    Ok(LoginTemplate {
        ctx,
        error: query.error,
        success: query.success,
    })
}

/// Handle login form submission.
///
/// Wrong credentials come back as a flash message; an identity-fetch
/// failure after a successful token exchange fails open to anonymous, so
/// the visitor lands on the home page either way.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let tokens = match state
        .api()
        .obtain_tokens(&form.username, &form.password)
        .await
    {
        Ok(tokens) => tokens,
        Err(ApiError::Unauthorized) => {
            return Ok(login_error("Invalid username or password"));
        }
        Err(ApiError::Validation(message)) => return Ok(login_error(&message)),
        Err(e) => return Err(e.into()),
    };

    match state.sessions().login(&session, tokens).await? {
        Some(user) => {
            set_sentry_user(&user.id, Some(user.email.as_str()));
            tracing::info!(user_id = %user.id, "login");
        }
        None => tracing::warn!("login succeeded but identity fetch failed"),
    }

    Ok(Redirect::to("/").into_response())
}

/// Display the register page.
#[instrument(skip(state, session))]
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let ctx = PageContext::load(&state, &session).await;
    Ok(RegisterTemplate {
        ctx,
        error: query.error,
    })
}

/// Handle registration form submission.
#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    if form.password != form.password_confirm {
        return Ok(register_error("Passwords do not match"));
    }
    if let Err(e) = Email::parse(&form.email) {
        return Ok(register_error(&e.to_string()));
    }

    match state
        .api()
        .register(&form.username, &form.email, &form.password)
        .await
    {
        Ok(_) => Ok(Redirect::to(&format!(
            "/auth/login?success={}",
            urlencoding::encode("Account created, please log in")
        ))
        .into_response()),
        // Duplicate username/email and weak passwords arrive as
        // field-specific validation messages.
        Err(ApiError::Validation(message)) => Ok(register_error(&message)),
        Err(e) => Err(e.into()),
    }
}

/// Handle logout: clear persisted credentials and identity synchronously.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Response> {
    state.sessions().logout(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/").into_response())
}

fn login_error(message: &str) -> Response {
    Redirect::to(&format!(
        "/auth/login?error={}",
        urlencoding::encode(message)
    ))
    .into_response()
}

fn register_error(message: &str) -> Response {
    Redirect::to(&format!(
        "/auth/register?error={}",
        urlencoding::encode(message)
    ))
    .into_response()
}

//! Account route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::api::User;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::PageContext;
use crate::state::AppState;

/// Profile display data.
#[derive(Clone)]
pub struct ProfileView {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        let full_name = match (&user.first_name, &user.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => None,
        };

        Self {
            username: user.username.clone(),
            email: user.email.to_string(),
            full_name,
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub ctx: PageContext,
    pub profile: ProfileView,
}

/// Display the profile overview.
///
/// The profile is re-fetched rather than read from the session cache so
/// the page shows whatever the backend currently reports.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
) -> Result<impl IntoResponse> {
    let ctx = PageContext::load(&state, &session).await;

    let user = state
        .sessions()
        .with_token(&session, |token| {
            let api = state.api();
            async move { api.current_user(&token).await }
        })
        .await?;

    Ok(ProfileTemplate {
        ctx,
        profile: ProfileView::from(&user),
    })
}

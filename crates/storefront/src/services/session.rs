//! Session service: the authenticated identity and its credential pair.
//!
//! The session repository (tower-sessions' `SessionStore`) is the injected
//! storage seam; this service only decides *what* is stored under which
//! keys and when. Logout is synchronous and purely local - no network call.

use std::future::Future;

use tower_sessions::Session;
use tracing::instrument;

use tamarind_core::TokenPair;

use crate::api::{ApiClient, ApiError};
use crate::models::{session_keys, CurrentUser};
use crate::services::events::{EventBus, StorefrontEvent};

/// Errors from session-level operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No identity (or no usable credentials). Callers redirect to login.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A backend call failed for a non-authorization reason.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session record could not be read or written.
    #[error("session store error: {0}")]
    Store(#[from] tower_sessions::session::Error),
}

/// Maintains the current identity and the token pair that authorizes
/// backend requests.
#[derive(Clone)]
pub struct SessionService {
    api: ApiClient,
    events: EventBus,
}

impl SessionService {
    /// Create a new session service.
    #[must_use]
    pub const fn new(api: ApiClient, events: EventBus) -> Self {
        Self { api, events }
    }

    /// Persist a freshly obtained token pair, then fetch the identity it
    /// belongs to.
    ///
    /// Identity-fetch failure fails open to "anonymous": the tokens stay
    /// persisted, the identity stays unset, and the caller gets `Ok(None)`
    /// rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the session record itself cannot be
    /// written.
    #[instrument(skip(self, session, tokens))]
    pub async fn login(
        &self,
        session: &Session,
        tokens: TokenPair,
    ) -> Result<Option<CurrentUser>, SessionError> {
        session
            .insert(session_keys::ACCESS_TOKEN, &tokens.access)
            .await?;
        session
            .insert(session_keys::REFRESH_TOKEN, &tokens.refresh)
            .await?;

        match self.api.current_user(&tokens.access).await {
            Ok(user) => {
                let current = CurrentUser {
                    id: user.id,
                    username: user.username,
                    email: user.email,
                };
                session
                    .insert(session_keys::CURRENT_USER, &current)
                    .await?;
                self.events.publish(StorefrontEvent::IdentityChanged);
                Ok(Some(current))
            }
            Err(e) => {
                tracing::warn!(error = %e, "identity fetch after login failed, staying anonymous");
                Ok(None)
            }
        }
    }

    /// Clear persisted credentials and the cached identity.
    ///
    /// Purely local and idempotent; the language preference is left in
    /// place.
    ///
    /// # Errors
    ///
    /// Returns an error if the session record cannot be written.
    #[instrument(skip(self, session))]
    pub async fn logout(&self, session: &Session) -> Result<(), SessionError> {
        session
            .remove::<String>(session_keys::ACCESS_TOKEN)
            .await?;
        session
            .remove::<String>(session_keys::REFRESH_TOKEN)
            .await?;
        session
            .remove::<CurrentUser>(session_keys::CURRENT_USER)
            .await?;
        self.events.publish(StorefrontEvent::IdentityChanged);
        Ok(())
    }

    /// The cached identity, or `None` when unauthenticated.
    pub async fn current_user(&self, session: &Session) -> Option<CurrentUser> {
        session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
    }

    /// The persisted access token.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] if no token is stored.
    pub async fn access_token(&self, session: &Session) -> Result<String, SessionError> {
        session
            .get::<String>(session_keys::ACCESS_TOKEN)
            .await?
            .ok_or(SessionError::NotAuthenticated)
    }

    /// Run an authenticated backend call with refresh-on-401.
    ///
    /// A 401 triggers exactly one refresh-token exchange and one retry.
    /// If the refresh itself is rejected, the stored credentials and
    /// identity are cleared and the caller gets `NotAuthenticated` - the
    /// explicit re-authenticate path, instead of silently treating an
    /// expired token like a generic failure.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` when there is no usable credential; `Api` for
    /// every other backend failure, preserving the transport/validation
    /// distinction.
    pub async fn with_token<T, F, Fut>(
        &self,
        session: &Session,
        operation: F,
    ) -> Result<T, SessionError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let token = self.access_token(session).await?;

        match operation(token).await {
            Ok(value) => Ok(value),
            Err(ApiError::Unauthorized) => {
                let fresh = self.refresh(session).await?;
                match operation(fresh).await {
                    Ok(value) => Ok(value),
                    Err(ApiError::Unauthorized) => {
                        self.clear_credentials(session).await?;
                        Err(SessionError::NotAuthenticated)
                    }
                    Err(e) => Err(SessionError::Api(e)),
                }
            }
            Err(e) => Err(SessionError::Api(e)),
        }
    }

    /// Exchange the refresh token for a fresh access token and persist it.
    #[instrument(skip(self, session))]
    async fn refresh(&self, session: &Session) -> Result<String, SessionError> {
        let Some(refresh_token) = session
            .get::<String>(session_keys::REFRESH_TOKEN)
            .await?
        else {
            self.clear_credentials(session).await?;
            return Err(SessionError::NotAuthenticated);
        };

        match self.api.refresh_access_token(&refresh_token).await {
            Ok(access) => {
                session
                    .insert(session_keys::ACCESS_TOKEN, &access)
                    .await?;
                Ok(access)
            }
            Err(ApiError::Unauthorized) => {
                tracing::info!("refresh token rejected, clearing session identity");
                self.clear_credentials(session).await?;
                Err(SessionError::NotAuthenticated)
            }
            Err(e) => Err(SessionError::Api(e)),
        }
    }

    /// Drop credentials and identity without touching the language key.
    async fn clear_credentials(&self, session: &Session) -> Result<(), SessionError> {
        session
            .remove::<String>(session_keys::ACCESS_TOKEN)
            .await?;
        session
            .remove::<String>(session_keys::REFRESH_TOKEN)
            .await?;
        session
            .remove::<CurrentUser>(session_keys::CURRENT_USER)
            .await?;
        self.events.publish(StorefrontEvent::IdentityChanged);
        Ok(())
    }
}

//! Identity endpoints: token exchange, registration, current user.

use reqwest::Method;
use tracing::instrument;

use tamarind_core::TokenPair;

use super::client::ApiClient;
use super::types::{CredentialsRequest, RefreshRequest, RefreshResponse, RegisterRequest, User};
use super::ApiError;

impl ApiClient {
    /// Exchange username/password credentials for a bearer token pair.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] on wrong credentials, or a
    /// transport error if the backend is unreachable.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn obtain_tokens(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenPair, ApiError> {
        let request = self
            .request(Method::POST, "api/token/")
            .json(&CredentialsRequest { username, password });

        self.execute(request).await
    }

    /// Exchange a refresh token for a fresh access token.
    ///
    /// The refresh token itself stays valid; the backend only rotates the
    /// access half of the pair.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the refresh token is expired
    /// or revoked.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ApiError> {
        let request = self
            .request(Method::POST, "api/token/refresh/")
            .json(&RefreshRequest {
                refresh: refresh_token,
            });

        let response: RefreshResponse = self.execute(request).await?;
        Ok(response.access)
    }

    /// Register a new user account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] with field-specific messages for
    /// duplicate usernames, malformed emails, and weak passwords.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let request = self
            .request(Method::POST, "users/register/")
            .json(&RegisterRequest {
                username,
                email,
                password,
            });

        self.execute(request).await
    }

    /// Fetch the profile of the user the access token belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the token is expired or
    /// invalid.
    #[instrument(skip(self, access_token))]
    pub async fn current_user(&self, access_token: &str) -> Result<User, ApiError> {
        let request = self.authed(Method::GET, "users/me/", access_token);
        self.execute(request).await
    }
}

//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Propagation policy: each service converts its own backend failures into
//! typed errors; nothing bubbles to a global handler. The mapping here is
//! the last mile from typed error to HTTP response:
//! - missing identity redirects to the login page
//! - validation failures answer 400 with the backend's message
//! - not-found renders as 404 (routes usually show a dedicated empty view
//!   instead of returning this)
//! - transport and server-side failures answer with a generic message and
//!   are captured to Sentry

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::services::{CartError, SessionError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session or authenticated-call failure.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Cart operation failed.
    #[error("cart error: {0}")]
    Cart(#[from] CartError),

    /// Unauthenticated backend call failed.
    #[error("backend error: {0}")]
    Api(#[from] ApiError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error should redirect the visitor to the login page.
    fn wants_login(&self) -> bool {
        matches!(
            self,
            Self::Session(SessionError::NotAuthenticated)
                | Self::Cart(CartError::Session(SessionError::NotAuthenticated))
        )
    }

    /// The API error buried inside, if any.
    fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e)
            | Self::Session(SessionError::Api(e))
            | Self::Cart(CartError::Session(SessionError::Api(e))) => Some(e),
            _ => None,
        }
    }

    fn is_server_side(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Session(SessionError::Store(_)) => true,
            _ => matches!(
                self.api_error(),
                Some(ApiError::Transport(_) | ApiError::Status { .. } | ApiError::Decode(_))
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Missing identity is a navigation concern, not an error page.
        if self.wants_login() {
            return Redirect::to("/auth/login").into_response();
        }

        // Capture server-side errors to Sentry
        if self.is_server_side() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match (&self, self.api_error()) {
            (_, Some(ApiError::Validation(_))) => StatusCode::BAD_REQUEST,
            (_, Some(ApiError::NotFound(_))) => StatusCode::NOT_FOUND,
            (_, Some(ApiError::Unauthorized)) => StatusCode::UNAUTHORIZED,
            (_, Some(_)) => StatusCode::BAD_GATEWAY,
            (Self::NotFound(_), _) => StatusCode::NOT_FOUND,
            (Self::BadRequest(_) | Self::Cart(CartError::QuantityBelowMinimum), _) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match (&self, self.api_error()) {
            (_, Some(ApiError::Validation(m) | ApiError::NotFound(m))) => m.clone(),
            (_, Some(_)) => "Something went wrong. Please try again.".to_string(),
            (Self::NotFound(m), _) => format!("Not found: {m}"),
            (Self::BadRequest(m), _) => m.clone(),
            (Self::Cart(CartError::QuantityBelowMinimum), _) => {
                "Quantity must be at least 1".to_string()
            }
            _ => "Internal server error".to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_not_authenticated_redirects_to_login() {
        let response =
            AppError::Session(SessionError::NotAuthenticated).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/auth/login")
        );
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = AppError::Session(SessionError::Api(ApiError::Validation(
            "Not enough stock".to_string(),
        )));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_quantity_below_minimum_maps_to_bad_request() {
        assert_eq!(
            status_of(AppError::Cart(CartError::QuantityBelowMinimum)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(
            status_of(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Api(ApiError::NotFound("order".to_string()))),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_internal_maps_to_500() {
        assert_eq!(
            status_of(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

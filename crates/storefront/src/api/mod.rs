//! REST backend API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local sync, direct API calls
//! - `reqwest` with per-request timeouts; bearer-token authorization on
//!   authenticated endpoints
//! - No response caching: every read is a fetch, every mutation is followed
//!   by a full re-fetch of the affected collection
//!
//! # Resource groups
//!
//! - [`identity`] - token pair exchange, registration, current user
//! - [`catalog`] - products, categories (public, unauthenticated)
//! - [`cart`] - the authenticated user's cart lines
//! - [`wishlist`] - the authenticated user's saved-items set
//! - [`orders`] - order creation, history, cancellation, invoice download
//!
//! # Example
//!
//! ```rust,ignore
//! use tamarind_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config.backend)?;
//!
//! // Public catalog read
//! let products = api.list_products(&ProductQuery::default()).await?;
//!
//! // Authenticated cart mutation followed by re-fetch
//! api.add_to_cart(token, product.id, Quantity::MIN).await?;
//! let cart = api.list_cart(token).await?;
//! ```

mod cart;
mod catalog;
mod client;
mod identity;
mod orders;
mod wishlist;
pub mod types;

pub use client::ApiClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: network unreachable, connection reset, timeout.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The bearer token was missing, expired, or invalid (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// The resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend rejected the request as invalid (HTTP 4xx with a
    /// message, e.g. insufficient stock or a malformed phone number).
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other non-success status.
    #[error("backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the caller should re-authenticate before retrying.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("order 7".to_string());
        assert_eq!(err.to_string(), "not found: order 7");

        let err = ApiError::Validation("insufficient stock".to_string());
        assert_eq!(err.to_string(), "validation error: insufficient stock");
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(!ApiError::NotFound(String::new()).is_unauthorized());
    }
}

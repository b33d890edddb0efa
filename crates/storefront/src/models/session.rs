//! Session-related types.
//!
//! Types stored in the session for authentication state. The session record
//! is the storefront's only durable client-side state: the bearer token
//! pair, the cached identity derived from it, and the language preference.

use serde::{Deserialize, Serialize};

use tamarind_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data cached in the session to identify the logged-in user.
/// Cleared on logout; refreshed from `/users/me/` on login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    /// User's backend ID.
    pub id: UserId,
    /// Username shown in the account menu.
    pub username: String,
    /// User's email address.
    pub email: Email,
}

/// Session keys for persisted state.
pub mod keys {
    /// Key for the short-lived bearer access token.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Key for the long-lived refresh token.
    pub const REFRESH_TOKEN: &str = "refresh_token";

    /// Key for the cached identity of the logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the language preference. Deliberately separate from the
    /// credential keys: it survives logout.
    pub const LANGUAGE: &str = "language";
}

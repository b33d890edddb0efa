//! Session middleware configuration.
//!
//! Sets up signed-cookie sessions using tower-sessions. The store is the
//! session-repository seam: it defaults to the in-memory store (all durable
//! state lives in the backend), and swapping the medium means passing a
//! different `SessionStore` here - nothing else changes.

use secrecy::ExposeSecret;
use tower_sessions::{cookie::Key, Expiry, MemoryStore, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "tamarind_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with the in-memory store.
///
/// # Arguments
///
/// * `config` - Storefront configuration (for the signing secret and the
///   HTTPS detection that controls the `Secure` cookie flag)
#[must_use]
pub fn create_session_layer(
    config: &StorefrontConfig,
) -> SessionManagerLayer<MemoryStore, tower_sessions::service::SignedCookie> {
    let store = MemoryStore::default();

    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");

    // Config validated the secret to be at least 32 bytes, which is what
    // Key::derive_from requires.
    let key = Key::derive_from(config.session_secret.expose_secret().as_bytes());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}

//! Bearer token pair issued by the backend's token endpoint.

use serde::{Deserialize, Serialize};

/// The access/refresh token pair that authorizes backend requests.
///
/// The pair is persisted in the session repository under fixed keys and is
/// the only durable client-side credential state. Tokens are opaque strings
/// to the storefront; expiry is discovered through 401 responses, not by
/// decoding.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived bearer token attached to authenticated requests.
    pub access: String,
    /// Long-lived token exchanged for a fresh access token on 401.
    pub refresh: String,
}

impl TokenPair {
    /// Create a new token pair.
    #[must_use]
    pub const fn new(access: String, refresh: String) -> Self {
        Self { access, refresh }
    }
}

// Tokens must not leak into logs.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_tokens() {
        let pair = TokenPair::new("secret-access".into(), "secret-refresh".into());
        let debug = format!("{pair:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let pair = TokenPair::new("a".into(), "r".into());
        let json = serde_json::to_string(&pair).unwrap();
        let parsed: TokenPair = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, pair);
    }
}

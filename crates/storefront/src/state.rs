//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::services::{CartService, EventBus, SessionService, WishlistService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend API client, the storefront services, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    events: EventBus,
    sessions: SessionService,
    cart: CartService,
    wishlist: WishlistService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.backend)?;
        let events = EventBus::new();
        let sessions = SessionService::new(api.clone(), events.clone());
        let cart = CartService::new(api.clone(), sessions.clone(), events.clone());
        let wishlist = WishlistService::new(api.clone(), sessions.clone(), events.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                events,
                sessions,
                cart,
                wishlist,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the storefront event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Get a reference to the session service.
    #[must_use]
    pub fn sessions(&self) -> &SessionService {
        &self.inner.sessions
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }

    /// Get a reference to the wishlist service.
    #[must_use]
    pub fn wishlist(&self) -> &WishlistService {
        &self.inner.wishlist
    }
}

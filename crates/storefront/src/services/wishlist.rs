//! Wishlist membership service.
//!
//! A membership set over products: the only semantics are presence and
//! absence. Membership checks fetch the full set and scan it - O(n) per
//! check, acceptable because wishlists are small and the call infrequent.
//! Every successful mutation publishes a typed event so independent UI
//! regions (the navigation badge, listing pages) can refresh their own
//! queries without a shared store.

use tower_sessions::Session;
use tracing::instrument;

use tamarind_core::ProductId;

use crate::api::{ApiClient, WishlistItem};
use crate::services::events::{EventBus, StorefrontEvent};
use crate::services::session::{SessionError, SessionService};

/// Tracks and toggles per-product membership in the user's saved-items set.
#[derive(Clone)]
pub struct WishlistService {
    api: ApiClient,
    sessions: SessionService,
    events: EventBus,
}

impl WishlistService {
    /// Create a new wishlist service.
    #[must_use]
    pub const fn new(api: ApiClient, sessions: SessionService, events: EventBus) -> Self {
        Self {
            api,
            sessions,
            events,
        }
    }

    /// Fetch the full wishlist.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] when there is no
    /// identity.
    #[instrument(skip(self, session))]
    pub async fn fetch(&self, session: &Session) -> Result<Vec<WishlistItem>, SessionError> {
        self.sessions
            .with_token(session, |token| async move {
                self.api.list_wishlist(&token).await
            })
            .await
    }

    /// Add a product to the set.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; a duplicate add is a
    /// backend-side no-op, not an error.
    #[instrument(skip(self, session), fields(product_id = %product_id))]
    pub async fn add(&self, session: &Session, product_id: ProductId) -> Result<(), SessionError> {
        self.sessions
            .with_token(session, |token| async move {
                self.api.add_to_wishlist(&token, product_id).await
            })
            .await?;

        self.broadcast_count(session).await;
        Ok(())
    }

    /// Remove a product from the set.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, session), fields(product_id = %product_id))]
    pub async fn remove(
        &self,
        session: &Session,
        product_id: ProductId,
    ) -> Result<(), SessionError> {
        self.sessions
            .with_token(session, |token| async move {
                self.api.remove_from_wishlist(&token, product_id).await
            })
            .await?;

        self.broadcast_count(session).await;
        Ok(())
    }

    /// Whether `product_id` is in the set, resolved by fetching the full
    /// set and scanning it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, session), fields(product_id = %product_id))]
    pub async fn is_member(
        &self,
        session: &Session,
        product_id: ProductId,
    ) -> Result<bool, SessionError> {
        let items = self.fetch(session).await?;
        Ok(items.iter().any(|item| item.product.id == product_id))
    }

    /// Number of entries in the set.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, session))]
    pub async fn count(&self, session: &Session) -> Result<u32, SessionError> {
        self.sessions
            .with_token(session, |token| async move {
                self.api.wishlist_count(&token).await
            })
            .await
    }

    /// Publish the post-mutation count. Failure to read the count only
    /// costs a badge update, so it is logged and swallowed.
    async fn broadcast_count(&self, session: &Session) {
        match self.count(session).await {
            Ok(count) => self
                .events
                .publish(StorefrontEvent::WishlistChanged { count }),
            Err(e) => tracing::warn!(error = %e, "wishlist count refresh failed"),
        }
    }
}

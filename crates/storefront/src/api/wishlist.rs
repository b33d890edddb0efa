//! Wishlist endpoints. All scoped to the authenticated identity.

use reqwest::Method;
use tracing::instrument;

use tamarind_core::ProductId;

use super::client::ApiClient;
use super::types::{WishlistAddRequest, WishlistCountResponse, WishlistItem};
use super::ApiError;

impl ApiClient {
    /// Fetch the full wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token))]
    pub async fn list_wishlist(&self, access_token: &str) -> Result<Vec<WishlistItem>, ApiError> {
        let request = self.authed(Method::GET, "wishlist/", access_token);
        self.execute(request).await
    }

    /// Add a product to the wishlist. Adding an existing member is a no-op
    /// on the backend, so the call is idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(product_id = %product_id))]
    pub async fn add_to_wishlist(
        &self,
        access_token: &str,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        let request = self
            .authed(Method::POST, "wishlist/add/", access_token)
            .json(&WishlistAddRequest { product_id });

        self.execute_empty(request).await
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(
        &self,
        access_token: &str,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        let request = self.authed(
            Method::DELETE,
            &format!("wishlist/remove/{product_id}/"),
            access_token,
        );

        self.execute_empty(request).await
    }

    /// Count wishlist entries without fetching them.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token))]
    pub async fn wishlist_count(&self, access_token: &str) -> Result<u32, ApiError> {
        let request = self.authed(Method::GET, "wishlist/count/", access_token);
        let response: WishlistCountResponse = self.execute(request).await?;
        Ok(response.count)
    }
}

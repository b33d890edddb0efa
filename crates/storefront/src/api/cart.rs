//! Cart endpoints. All scoped to the authenticated identity.
//!
//! These are the raw wire calls; the mutate-then-refetch discipline and the
//! per-session serialization live in [`crate::services::cart`].

use reqwest::Method;
use tracing::instrument;

use tamarind_core::{CartItemId, ProductId, Quantity};

use super::client::ApiClient;
use super::types::{CartAddRequest, CartItem, CartUpdateRequest};
use super::ApiError;

impl ApiClient {
    /// Fetch the full cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token))]
    pub async fn list_cart(&self, access_token: &str) -> Result<Vec<CartItem>, ApiError> {
        let request = self.authed(Method::GET, "cart/", access_token);
        self.execute(request).await
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if the backend rejects the line,
    /// e.g. because the product is out of stock.
    #[instrument(skip(self, access_token), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        access_token: &str,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<(), ApiError> {
        let request = self
            .authed(Method::POST, "cart/add/", access_token)
            .json(&CartAddRequest {
                product_id,
                quantity,
            });

        self.execute_empty(request).await
    }

    /// Change the quantity of an existing cart line.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the line does not exist.
    #[instrument(skip(self, access_token), fields(item_id = %item_id))]
    pub async fn update_cart_item(
        &self,
        access_token: &str,
        item_id: CartItemId,
        quantity: Quantity,
    ) -> Result<(), ApiError> {
        let request = self
            .authed(Method::PUT, &format!("cart/update/{item_id}/"), access_token)
            .json(&CartUpdateRequest { quantity });

        self.execute_empty(request).await
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(item_id = %item_id))]
    pub async fn remove_cart_item(
        &self,
        access_token: &str,
        item_id: CartItemId,
    ) -> Result<(), ApiError> {
        let request = self.authed(
            Method::DELETE,
            &format!("cart/remove/{item_id}/"),
            access_token,
        );

        self.execute_empty(request).await
    }

    /// Remove every line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token))]
    pub async fn clear_cart(&self, access_token: &str) -> Result<(), ApiError> {
        let request = self.authed(Method::POST, "cart/clear/", access_token);
        self.execute_empty(request).await
    }
}

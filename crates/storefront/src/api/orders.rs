//! Order endpoints: create, list, fetch, cancel, invoice download.

use reqwest::Method;
use tracing::instrument;

use tamarind_core::OrderId;

use super::client::ApiClient;
use super::types::{Order, OrderDraft};
use super::ApiError;

impl ApiClient {
    /// Place an order from the given draft.
    ///
    /// The backend snapshots each product's price into the order lines and
    /// decrements stock; it answers with the stored order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for insufficient stock or a
    /// malformed shipping address/phone.
    #[instrument(skip(self, access_token, draft))]
    pub async fn create_order(
        &self,
        access_token: &str,
        draft: &OrderDraft,
    ) -> Result<Order, ApiError> {
        let request = self.authed(Method::POST, "orders/", access_token).json(draft);
        self.execute(request).await
    }

    /// List the authenticated user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token))]
    pub async fn list_orders(&self, access_token: &str) -> Result<Vec<Order>, ApiError> {
        let request = self.authed(Method::GET, "orders/", access_token);
        self.execute(request).await
    }

    /// Fetch a single order. The backend scopes lookups to the token's
    /// owner, so another user's order is a 404, not a 403.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the order does not exist or
    /// belongs to someone else.
    #[instrument(skip(self, access_token), fields(order_id = %order_id))]
    pub async fn get_order(&self, access_token: &str, order_id: OrderId) -> Result<Order, ApiError> {
        let request = self.authed(Method::GET, &format!("orders/{order_id}/"), access_token);
        self.execute(request).await
    }

    /// Request cancellation of an order.
    ///
    /// The transition is server-authoritative: the backend accepts the
    /// request only while the order has not shipped and answers 400
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if the order can no longer be
    /// cancelled.
    #[instrument(skip(self, access_token), fields(order_id = %order_id))]
    pub async fn cancel_order(&self, access_token: &str, order_id: OrderId) -> Result<(), ApiError> {
        let request = self.authed(
            Method::POST,
            &format!("orders/{order_id}/cancel/"),
            access_token,
        );

        self.execute_empty(request).await
    }

    /// Download the order's invoice document (PDF bytes).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(order_id = %order_id))]
    pub async fn download_invoice(
        &self,
        access_token: &str,
        order_id: OrderId,
    ) -> Result<Vec<u8>, ApiError> {
        let request = self.authed(
            Method::GET,
            &format!("orders/{order_id}/invoice/"),
            access_token,
        );

        self.execute_bytes(request).await
    }
}

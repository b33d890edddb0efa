//! Cart synchronization service.
//!
//! Every mutation follows the same discipline: send the write, then
//! unconditionally re-fetch the full cart. The snapshot handed back IS the
//! backend's cart at that moment - there is no optimistic local mutation
//! and no merge logic. Mutations are serialized per user through an async
//! lock, so two concurrent writes cannot interleave their re-fetches.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::instrument;

use tamarind_core::{CartItemId, ProductId, Quantity, UserId};

use crate::api::{ApiClient, CartItem};
use crate::services::events::{EventBus, StorefrontEvent};
use crate::services::session::{SessionError, SessionService};

/// Orders above this subtotal ship free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(999, 0, 0, false, 0);

/// Flat shipping charge below the threshold.
pub const SHIPPING_FLAT: Decimal = Decimal::from_parts(99, 0, 0, false, 0);

/// Tax rate applied to the subtotal (18% GST).
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Errors from cart operations.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// A quantity below one was requested; rejected before any request is
    /// issued.
    #[error("quantity must be at least 1")]
    QuantityBelowMinimum,

    /// Authentication or backend failure; see [`SessionError`] for the
    /// transport/validation split.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// The backend's cart as of the last re-fetch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
}

impl CartSnapshot {
    /// Number of line items (not unit quantities).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        u32::try_from(self.items.len()).unwrap_or(u32::MAX)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Display totals, recomputed from the current lines on every call.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::from_subtotal(
            self.items
                .iter()
                .map(CartItem::line_total)
                .sum::<Decimal>(),
        )
    }
}

/// Totals derived from a cart snapshot for display and order placement.
///
/// Never stored; the backend recomputes the authoritative amount when the
/// order is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub grand_total: Decimal,
}

impl CartTotals {
    /// Apply the shipping threshold and tax rate to a subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            SHIPPING_FLAT
        };
        let tax = (subtotal * TAX_RATE).round_dp(2);

        Self {
            subtotal,
            shipping,
            tax,
            grand_total: subtotal + shipping + tax,
        }
    }

    /// Whether the order qualifies for free shipping.
    #[must_use]
    pub fn free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

/// Keeps the local view of the authenticated user's cart consistent with
/// the backend after every mutation.
#[derive(Clone)]
pub struct CartService {
    api: ApiClient,
    sessions: SessionService,
    events: EventBus,
    /// Per-user mutation locks. Entries are tiny and never removed; the
    /// map is bounded by the number of distinct users seen by this
    /// process.
    locks: Arc<Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>>,
}

impl CartService {
    /// Create a new cart service.
    #[must_use]
    pub fn new(api: ApiClient, sessions: SessionService, events: EventBus) -> Self {
        Self {
            api,
            sessions,
            events,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Fetch the current cart without mutating it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] (wrapped) when there is
    /// no identity.
    #[instrument(skip(self, session))]
    pub async fn fetch(&self, session: &Session) -> Result<CartSnapshot, CartError> {
        self.require_identity(session).await?;
        let snapshot = self.refetch(session).await?;
        Ok(snapshot)
    }

    /// Add a product to the cart, then re-fetch.
    ///
    /// # Errors
    ///
    /// `Session(NotAuthenticated)` signals "redirect to login" - the write
    /// is never attempted anonymously. Backend validation failures (e.g.
    /// out of stock) surface as `Session(Api(Validation))`, distinct from
    /// transport errors.
    #[instrument(skip(self, session), fields(product_id = %product_id))]
    pub async fn add(
        &self,
        session: &Session,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<CartSnapshot, CartError> {
        let user_id = self.require_identity(session).await?;
        let _guard = self.lock_for(user_id).lock_owned().await;

        self.sessions
            .with_token(session, |token| async move {
                self.api.add_to_cart(&token, product_id, quantity).await
            })
            .await?;

        self.settle(session).await
    }

    /// Change a line's quantity, then re-fetch.
    ///
    /// A requested quantity below one is rejected locally; no request is
    /// issued and the backend never sees it.
    ///
    /// # Errors
    ///
    /// [`CartError::QuantityBelowMinimum`] for a zero quantity; otherwise
    /// as for [`add`](Self::add).
    #[instrument(skip(self, session), fields(item_id = %item_id, quantity))]
    pub async fn update_quantity(
        &self,
        session: &Session,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartSnapshot, CartError> {
        let quantity = Quantity::new(quantity).map_err(|_| CartError::QuantityBelowMinimum)?;

        let user_id = self.require_identity(session).await?;
        let _guard = self.lock_for(user_id).lock_owned().await;

        self.sessions
            .with_token(session, |token| async move {
                self.api.update_cart_item(&token, item_id, quantity).await
            })
            .await?;

        self.settle(session).await
    }

    /// Remove a line, then re-fetch.
    ///
    /// # Errors
    ///
    /// As for [`add`](Self::add).
    #[instrument(skip(self, session), fields(item_id = %item_id))]
    pub async fn remove(
        &self,
        session: &Session,
        item_id: CartItemId,
    ) -> Result<CartSnapshot, CartError> {
        let user_id = self.require_identity(session).await?;
        let _guard = self.lock_for(user_id).lock_owned().await;

        self.sessions
            .with_token(session, |token| async move {
                self.api.remove_cart_item(&token, item_id).await
            })
            .await?;

        self.settle(session).await
    }

    /// Remove every line, then re-fetch.
    ///
    /// # Errors
    ///
    /// As for [`add`](Self::add).
    #[instrument(skip(self, session))]
    pub async fn clear(&self, session: &Session) -> Result<CartSnapshot, CartError> {
        let user_id = self.require_identity(session).await?;
        let _guard = self.lock_for(user_id).lock_owned().await;

        self.sessions
            .with_token(session, |token| async move {
                self.api.clear_cart(&token).await
            })
            .await?;

        self.settle(session).await
    }

    /// Identity gate shared by every operation.
    async fn require_identity(&self, session: &Session) -> Result<UserId, CartError> {
        self.sessions
            .current_user(session)
            .await
            .map(|user| user.id)
            .ok_or(CartError::Session(SessionError::NotAuthenticated))
    }

    /// The per-user mutation lock.
    fn lock_for(&self, user_id: UserId) -> Arc<tokio::sync::Mutex<()>> {
        #[allow(clippy::unwrap_used)] // lock poisoning is unrecoverable here
        let mut locks = self.locks.lock().unwrap();
        locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Unconditional full re-fetch after a mutation, plus badge event.
    async fn settle(&self, session: &Session) -> Result<CartSnapshot, CartError> {
        let snapshot = self.refetch(session).await?;
        self.events.publish(StorefrontEvent::CartChanged {
            count: snapshot.item_count(),
        });
        Ok(snapshot)
    }

    async fn refetch(&self, session: &Session) -> Result<CartSnapshot, CartError> {
        let items = self
            .sessions
            .with_token(session, |token| async move {
                self.api.list_cart(&token).await
            })
            .await?;
        Ok(CartSnapshot { items })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_totals_free_shipping_above_threshold() {
        // Concrete scenario: one line {price 500, quantity 2}.
        let totals = CartTotals::from_subtotal(Decimal::from_str("1000").unwrap());
        assert_eq!(totals.subtotal, Decimal::from_str("1000").unwrap());
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert!(totals.free_shipping());
        assert_eq!(totals.tax, Decimal::from_str("180.00").unwrap());
        assert_eq!(totals.grand_total, Decimal::from_str("1180.00").unwrap());
    }

    #[test]
    fn test_totals_flat_shipping_at_or_below_threshold() {
        // Exactly at the threshold still pays shipping: "above ₹999" is strict.
        let totals = CartTotals::from_subtotal(Decimal::from_str("999").unwrap());
        assert_eq!(totals.shipping, SHIPPING_FLAT);
        assert!(!totals.free_shipping());

        let totals = CartTotals::from_subtotal(Decimal::from_str("500").unwrap());
        assert_eq!(totals.shipping, SHIPPING_FLAT);
        assert_eq!(totals.tax, Decimal::from_str("90.00").unwrap());
        assert_eq!(totals.grand_total, Decimal::from_str("689.00").unwrap());
    }

    #[test]
    fn test_totals_tax_rounds_to_paise() {
        let totals = CartTotals::from_subtotal(Decimal::from_str("333.33").unwrap());
        assert_eq!(totals.tax, Decimal::from_str("60.00").unwrap());
    }

    #[test]
    fn test_constants_match_decimal_literals() {
        assert_eq!(FREE_SHIPPING_THRESHOLD, Decimal::from_str("999").unwrap());
        assert_eq!(SHIPPING_FLAT, Decimal::from_str("99").unwrap());
        assert_eq!(TAX_RATE, Decimal::from_str("0.18").unwrap());
    }
}

//! Typed storefront event bus.
//!
//! Cross-component invalidation without a shared store: when a mutation
//! succeeds, the owning service publishes a typed event and independent UI
//! regions (navigation badges, listing pages) re-run their own queries on
//! receipt. The payload carries the fresh count so simple subscribers can
//! render without a follow-up fetch.

use tokio::sync::broadcast;

/// Channel capacity. Badge updates are tiny and lossy-tolerant; a lagging
/// subscriber just re-queries on its next event.
const EVENT_CAPACITY: usize = 64;

/// Events published by storefront services after successful mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorefrontEvent {
    /// The authenticated user's wishlist changed; `count` is the new size.
    WishlistChanged { count: u32 },
    /// The authenticated user's cart changed; `count` is the new number of
    /// line items.
    CartChanged { count: u32 },
    /// The session identity changed (login or logout).
    IdentityChanged,
}

/// Process-wide broadcast bus for [`StorefrontEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StorefrontEvent>,
}

impl EventBus {
    /// Create a new bus.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Publish an event. Succeeds even with no subscribers.
    pub fn publish(&self, event: StorefrontEvent) {
        // A send error only means nobody is listening right now.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StorefrontEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(StorefrontEvent::WishlistChanged { count: 3 });

        assert_eq!(
            first.recv().await.unwrap(),
            StorefrontEvent::WishlistChanged { count: 3 }
        );
        assert_eq!(
            second.recv().await.unwrap(),
            StorefrontEvent::WishlistChanged { count: 3 }
        );
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(StorefrontEvent::IdentityChanged);
    }
}

//! Storefront services: session identity, cart synchronization, wishlist
//! membership, and the event bus that ties their badges together.

pub mod cart;
pub mod events;
pub mod session;
pub mod wishlist;

pub use cart::{CartError, CartService, CartSnapshot, CartTotals};
pub use events::{EventBus, StorefrontEvent};
pub use session::{SessionError, SessionService};
pub use wishlist::WishlistService;

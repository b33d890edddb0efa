//! Wishlist membership properties and the typed badge-invalidation events.

#![allow(clippy::unwrap_used)]

use tamarind_core::ProductId;
use tamarind_integration_tests::TestContext;
use tamarind_storefront::services::StorefrontEvent;

#[tokio::test]
async fn membership_follows_add_and_remove() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let wishlist = ctx.state.wishlist();
    let product = ProductId::new(42);

    assert!(!wishlist.is_member(&ctx.session, product).await.unwrap());

    wishlist.add(&ctx.session, product).await.unwrap();
    assert!(wishlist.is_member(&ctx.session, product).await.unwrap());
    assert_eq!(wishlist.count(&ctx.session).await.unwrap(), 1);

    wishlist.remove(&ctx.session, product).await.unwrap();
    assert!(!wishlist.is_member(&ctx.session, product).await.unwrap());
    assert_eq!(wishlist.count(&ctx.session).await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_add_is_idempotent() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let wishlist = ctx.state.wishlist();
    let product = ProductId::new(1);

    wishlist.add(&ctx.session, product).await.unwrap();
    wishlist.add(&ctx.session, product).await.unwrap();

    assert_eq!(wishlist.count(&ctx.session).await.unwrap(), 1);
    assert_eq!(ctx.backend().wishlist.len(), 1);
}

#[tokio::test]
async fn mutations_broadcast_the_fresh_count() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let mut events = ctx.state.events().subscribe();
    let wishlist = ctx.state.wishlist();

    wishlist.add(&ctx.session, ProductId::new(42)).await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        StorefrontEvent::WishlistChanged { count: 1 }
    );

    wishlist
        .remove(&ctx.session, ProductId::new(42))
        .await
        .unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        StorefrontEvent::WishlistChanged { count: 0 }
    );
}

#[tokio::test]
async fn membership_scan_reads_the_full_set() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let wishlist = ctx.state.wishlist();
    wishlist.add(&ctx.session, ProductId::new(1)).await.unwrap();
    wishlist.add(&ctx.session, ProductId::new(42)).await.unwrap();

    let before = ctx.backend().hits("wishlist_list");
    assert!(wishlist
        .is_member(&ctx.session, ProductId::new(42))
        .await
        .unwrap());
    // One list fetch per membership check - no cached set.
    assert_eq!(ctx.backend().hits("wishlist_list"), before + 1);
}

//! Cart synchronization properties: the quantity floor, the no-drift
//! guarantee of mutate-then-refetch, and the transport/validation split.

#![allow(clippy::unwrap_used)]

use tamarind_core::{CartItemId, ProductId, Quantity};
use tamarind_integration_tests::TestContext;
use tamarind_storefront::api::ApiError;
use tamarind_storefront::services::cart::CartError;
use tamarind_storefront::services::SessionError;

#[tokio::test]
async fn update_below_one_is_rejected_without_a_network_call() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let snapshot = ctx
        .state
        .cart()
        .add(&ctx.session, ProductId::new(1), Quantity::MIN)
        .await
        .unwrap();
    let item_id = snapshot.items.first().unwrap().id;

    let before = ctx.backend().total_hits();

    let result = ctx
        .state
        .cart()
        .update_quantity(&ctx.session, item_id, 0)
        .await;

    assert!(matches!(result, Err(CartError::QuantityBelowMinimum)));
    // The rejection happened before any request was issued.
    assert_eq!(ctx.backend().total_hits(), before);
    assert_eq!(ctx.backend().hits("cart_update"), 0);
}

#[tokio::test]
async fn snapshot_equals_backend_cart_after_each_mutation() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let cart = ctx.state.cart();

    let snapshot = cart
        .add(&ctx.session, ProductId::new(1), Quantity::new(2).unwrap())
        .await
        .unwrap();
    assert_eq!(snapshot.items, ctx.backend().cart);

    let snapshot = cart
        .add(&ctx.session, ProductId::new(42), Quantity::MIN)
        .await
        .unwrap();
    assert_eq!(snapshot.items, ctx.backend().cart);
    assert_eq!(snapshot.item_count(), 2);

    let first_line = snapshot.items.first().unwrap().id;
    let snapshot = cart
        .update_quantity(&ctx.session, first_line, 3)
        .await
        .unwrap();
    assert_eq!(snapshot.items, ctx.backend().cart);

    let snapshot = cart.remove(&ctx.session, first_line).await.unwrap();
    assert_eq!(snapshot.items, ctx.backend().cart);
    assert_eq!(snapshot.item_count(), 1);

    let snapshot = cart.clear(&ctx.session).await.unwrap();
    assert!(snapshot.is_empty());
    assert!(ctx.backend().cart.is_empty());
}

#[tokio::test]
async fn anonymous_add_signals_login_without_touching_the_backend() {
    let ctx = TestContext::start().await;

    let result = ctx
        .state
        .cart()
        .add(&ctx.session, ProductId::new(1), Quantity::MIN)
        .await;

    assert!(matches!(
        result,
        Err(CartError::Session(SessionError::NotAuthenticated))
    ));
    assert_eq!(ctx.backend().hits("cart_add"), 0);
}

#[tokio::test]
async fn out_of_stock_surfaces_as_validation_not_transport() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    // Product 7 is seeded with zero stock.
    let result = ctx
        .state
        .cart()
        .add(&ctx.session, ProductId::new(7), Quantity::MIN)
        .await;

    match result {
        Err(CartError::Session(SessionError::Api(ApiError::Validation(message)))) => {
            assert!(message.contains("Not enough stock"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_line_update_is_a_not_found_error() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let result = ctx
        .state
        .cart()
        .update_quantity(&ctx.session, CartItemId::new(9999), 2)
        .await;

    assert!(matches!(
        result,
        Err(CartError::Session(SessionError::Api(ApiError::NotFound(_))))
    ));
}

#[tokio::test]
async fn concurrent_mutations_serialize_and_both_land() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let cart = ctx.state.cart();
    let (first, second) = tokio::join!(
        cart.add(&ctx.session, ProductId::new(1), Quantity::MIN),
        cart.add(&ctx.session, ProductId::new(42), Quantity::MIN),
    );

    first.unwrap();
    second.unwrap();

    // Whatever the interleaving, the settled view is the backend's cart.
    let snapshot = cart.fetch(&ctx.session).await.unwrap();
    assert_eq!(snapshot.item_count(), 2);
    assert_eq!(snapshot.items, ctx.backend().cart);
}

#[tokio::test]
async fn totals_recompute_from_the_snapshot() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    // {price 500, quantity 2} -> subtotal 1000, free shipping, 18% tax.
    let snapshot = ctx
        .state
        .cart()
        .add(&ctx.session, ProductId::new(1), Quantity::new(2).unwrap())
        .await
        .unwrap();

    let totals = snapshot.totals();
    assert_eq!(totals.subtotal.to_string(), "1000.00");
    assert!(totals.free_shipping());
    assert_eq!(totals.tax.to_string(), "180.00");
    assert_eq!(totals.grand_total.to_string(), "1180.00");
}

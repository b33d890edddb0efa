//! Order lifecycle properties: placement from the cart, the cancellation
//! gate, and the invoice download.

#![allow(clippy::unwrap_used)]

use tamarind_core::{OrderId, OrderStatus, ProductId, Quantity};
use tamarind_integration_tests::TestContext;
use tamarind_storefront::api::{ApiError, OrderDraft, OrderItemDraft};
use tamarind_storefront::services::SessionError;

/// Drive the order-placement flow the way the checkout handler does:
/// snapshot the cart, post the draft, clear the mirror.
async fn place_order_from_cart(ctx: &TestContext) -> OrderId {
    let snapshot = ctx.state.cart().fetch(&ctx.session).await.unwrap();
    let draft = OrderDraft {
        shipping_address: "42 MG Road, Bengaluru".to_string(),
        phone: "9876543210".to_string(),
        items_write: snapshot
            .items
            .iter()
            .map(|item| OrderItemDraft {
                product_id: item.product.id,
                quantity: item.quantity,
            })
            .collect(),
    };

    let order = ctx
        .state
        .sessions()
        .with_token(&ctx.session, |token| {
            let draft = &draft;
            let state = &ctx.state;
            async move { state.api().create_order(&token, draft).await }
        })
        .await
        .unwrap();

    ctx.state.cart().clear(&ctx.session).await.unwrap();
    order.id
}

#[tokio::test]
async fn placing_an_order_snapshots_prices_and_empties_the_cart() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    ctx.state
        .cart()
        .add(&ctx.session, ProductId::new(1), Quantity::new(2).unwrap())
        .await
        .unwrap();

    let order_id = place_order_from_cart(&ctx).await;

    let backend = ctx.backend();
    let order = backend.orders.iter().find(|o| o.id == order_id).unwrap();
    assert_eq!(order.status, OrderStatus::Placed);
    // total_amount is the backend's own sum of price snapshots
    assert_eq!(order.total_amount.to_string(), "1000.00");
    assert_eq!(order.items.len(), 1);
    assert!(backend.cart.is_empty());
    // Stock was decremented at placement
    assert_eq!(
        backend
            .products
            .iter()
            .find(|p| p.id == ProductId::new(1))
            .unwrap()
            .stock,
        8
    );
}

#[tokio::test]
async fn placed_orders_can_be_cancelled() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let order_id = ctx.backend().seed_order(OrderStatus::Placed);
    assert!(OrderStatus::Placed.is_cancellable());

    ctx.state
        .sessions()
        .with_token(&ctx.session, |token| {
            let state = &ctx.state;
            async move { state.api().cancel_order(&token, order_id).await }
        })
        .await
        .unwrap();

    let backend = ctx.backend();
    let order = backend.orders.iter().find(|o| o.id == order_id).unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn delivered_orders_reject_cancellation_and_keep_their_status() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let order_id = ctx.backend().seed_order(OrderStatus::Delivered);

    // The local gate alone would stop the request...
    assert!(!OrderStatus::Delivered.is_cancellable());

    // ...and even a forced request is rejected by the backend with a
    // non-2xx validation response.
    let result = ctx
        .state
        .sessions()
        .with_token(&ctx.session, |token| {
            let state = &ctx.state;
            async move { state.api().cancel_order(&token, order_id).await }
        })
        .await;

    match result {
        Err(SessionError::Api(ApiError::Validation(message))) => {
            assert!(message.contains("cannot be cancelled"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    // The displayed status is unchanged.
    let backend = ctx.backend();
    let order = backend.orders.iter().find(|o| o.id == order_id).unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn order_history_lists_newest_first() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let first = ctx.backend().seed_order(OrderStatus::Delivered);
    let second = ctx.backend().seed_order(OrderStatus::Placed);

    let orders = ctx
        .state
        .sessions()
        .with_token(&ctx.session, |token| {
            let state = &ctx.state;
            async move { state.api().list_orders(&token).await }
        })
        .await
        .unwrap();

    assert_eq!(orders.first().unwrap().id, second);
    assert_eq!(orders.get(1).unwrap().id, first);
}

#[tokio::test]
async fn missing_orders_are_not_found_rather_than_errors() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let result = ctx
        .state
        .sessions()
        .with_token(&ctx.session, |token| {
            let state = &ctx.state;
            async move { state.api().get_order(&token, OrderId::new(777)).await }
        })
        .await;

    assert!(matches!(
        result,
        Err(SessionError::Api(ApiError::NotFound(_)))
    ));
}

#[tokio::test]
async fn invoice_download_returns_the_document_bytes() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let order_id = ctx.backend().seed_order(OrderStatus::Shipped);

    let bytes = ctx
        .state
        .sessions()
        .with_token(&ctx.session, |token| {
            let state = &ctx.state;
            async move { state.api().download_invoice(&token, order_id).await }
        })
        .await
        .unwrap();

    assert!(bytes.starts_with(b"%PDF"));
}

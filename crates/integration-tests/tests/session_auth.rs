//! Session store properties: idempotent logout cleanup, fail-open login,
//! and the refresh-or-reauthenticate path for expired tokens.

#![allow(clippy::unwrap_used)]

use tamarind_integration_tests::{TestContext, TEST_PASSWORD, TEST_USERNAME};
use tamarind_storefront::api::ApiError;
use tamarind_storefront::models::session_keys;
use tamarind_storefront::services::SessionError;

async fn session_string(ctx: &TestContext, key: &str) -> Option<String> {
    ctx.session.get::<String>(key).await.unwrap()
}

#[tokio::test]
async fn login_then_logout_leaves_no_credentials_and_no_identity() {
    let ctx = TestContext::start().await;

    let user = ctx.login().await;
    assert_eq!(user.username, TEST_USERNAME);
    assert!(session_string(&ctx, session_keys::ACCESS_TOKEN).await.is_some());
    assert!(session_string(&ctx, session_keys::REFRESH_TOKEN).await.is_some());

    ctx.state.sessions().logout(&ctx.session).await.unwrap();

    assert!(session_string(&ctx, session_keys::ACCESS_TOKEN).await.is_none());
    assert!(session_string(&ctx, session_keys::REFRESH_TOKEN).await.is_none());
    assert!(ctx.state.sessions().current_user(&ctx.session).await.is_none());

    // Logout is idempotent.
    ctx.state.sessions().logout(&ctx.session).await.unwrap();
    assert!(ctx.state.sessions().current_user(&ctx.session).await.is_none());
}

#[tokio::test]
async fn wrong_credentials_are_rejected_at_the_token_exchange() {
    let ctx = TestContext::start().await;

    let result = ctx
        .state
        .api()
        .obtain_tokens(TEST_USERNAME, "wrong-password")
        .await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn identity_fetch_failure_fails_open_to_anonymous() {
    let ctx = TestContext::start().await;
    ctx.backend().fail_current_user = true;

    let tokens = ctx
        .state
        .api()
        .obtain_tokens(TEST_USERNAME, TEST_PASSWORD)
        .await
        .unwrap();
    let outcome = ctx
        .state
        .sessions()
        .login(&ctx.session, tokens)
        .await
        .unwrap();

    // No identity, but the pair stays persisted - same as the browser
    // keeping its stored tokens when /users/me/ errors.
    assert!(outcome.is_none());
    assert!(ctx.state.sessions().current_user(&ctx.session).await.is_none());
    assert!(session_string(&ctx, session_keys::ACCESS_TOKEN).await.is_some());
}

#[tokio::test]
async fn expired_access_token_is_refreshed_once_and_the_call_retried() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    let stale = session_string(&ctx, session_keys::ACCESS_TOKEN).await.unwrap();
    ctx.expire_access_tokens();

    // The wishlist count is an authenticated call; it should succeed via
    // one refresh exchange, not error.
    let count = ctx.state.wishlist().count(&ctx.session).await.unwrap();
    assert_eq!(count, 0);

    let fresh = session_string(&ctx, session_keys::ACCESS_TOKEN).await.unwrap();
    assert_ne!(stale, fresh);
    assert_eq!(ctx.backend().hits("refresh"), 1);
}

#[tokio::test]
async fn rejected_refresh_clears_the_session_and_demands_reauthentication() {
    let ctx = TestContext::start().await;
    ctx.login().await;
    ctx.revoke_all_tokens();

    let result = ctx.state.wishlist().count(&ctx.session).await;

    assert!(matches!(result, Err(SessionError::NotAuthenticated)));
    assert!(session_string(&ctx, session_keys::ACCESS_TOKEN).await.is_none());
    assert!(session_string(&ctx, session_keys::REFRESH_TOKEN).await.is_none());
    assert!(ctx.state.sessions().current_user(&ctx.session).await.is_none());
}

#[tokio::test]
async fn language_preference_survives_logout() {
    let ctx = TestContext::start().await;
    ctx.login().await;

    ctx.session
        .insert(session_keys::LANGUAGE, tamarind_storefront::i18n::Lang::Hi)
        .await
        .unwrap();

    ctx.state.sessions().logout(&ctx.session).await.unwrap();

    let lang: Option<tamarind_storefront::i18n::Lang> =
        ctx.session.get(session_keys::LANGUAGE).await.unwrap();
    assert_eq!(lang, Some(tamarind_storefront::i18n::Lang::Hi));
}

#[tokio::test]
async fn registration_rejects_duplicate_usernames_with_a_field_message() {
    let ctx = TestContext::start().await;

    let result = ctx
        .state
        .api()
        .register(TEST_USERNAME, "dup@example.com", "some-password-1")
        .await;

    match result {
        Err(ApiError::Validation(message)) => {
            assert!(message.contains("username"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let created = ctx
        .state
        .api()
        .register("ravi", "ravi@example.com", "some-password-1")
        .await
        .unwrap();
    assert_eq!(created.username, "ravi");
}

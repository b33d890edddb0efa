//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /products               - Product listing (search + filters)
//! GET  /products/{id}          - Product detail
//! GET  /categories             - Category listing
//! GET  /categories/{slug}      - Products in a category
//!
//! # Cart (requires auth)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add a product, then re-fetch
//! POST /cart/update            - Change a line's quantity, then re-fetch
//! POST /cart/remove            - Remove a line, then re-fetch
//! POST /cart/clear             - Empty the cart, then re-fetch
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Shipping details + totals
//! POST /checkout               - Place the order
//!
//! # Orders (requires auth)
//! GET  /orders                 - Order history
//! GET  /orders/{id}            - Order detail with progress line
//! POST /orders/{id}/cancel     - Request cancellation
//! GET  /orders/{id}/invoice    - Invoice PDF download
//!
//! # Wishlist (requires auth)
//! GET  /wishlist               - Wishlist page
//! POST /wishlist/toggle        - Toggle membership for a product
//!
//! # Badge fragments (answer 401 instead of redirecting)
//! GET  /fragments/cart/count
//! GET  /fragments/wishlist/count
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Profile overview
//!
//! # Localization
//! GET  /lang/{code}            - Persist language preference
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod home;
pub mod lang;
pub mod orders;
pub mod products;
pub mod wishlist;

use axum::{
    routing::{get, post},
    Router,
};
use tower_sessions::Session;

use crate::i18n::Lang;
use crate::models::{session_keys, CurrentUser};
use crate::state::AppState;

/// Per-page context shared by every template: the active string table and
/// the current identity for the navbar.
#[derive(Clone)]
pub struct PageContext {
    pub lang: Lang,
    pub t: &'static crate::i18n::Catalog,
    pub user: Option<CurrentUser>,
}

impl PageContext {
    /// Build the context from the session's language preference and cached
    /// identity.
    pub async fn load(state: &AppState, session: &Session) -> Self {
        let lang = session
            .get::<Lang>(session_keys::LANGUAGE)
            .await
            .ok()
            .flatten()
            .unwrap_or(state.config().default_language);

        let user = state.sessions().current_user(session).await;

        Self {
            lang,
            t: lang.catalog(),
            user,
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{slug}", get(categories::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", post(orders::cancel))
        .route("/{id}/invoice", get(orders::invoice))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
}

/// Create the badge fragment router.
pub fn fragment_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/count", get(cart::count))
        .route("/wishlist/count", get(wishlist::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        // Cart
        .nest("/cart", cart_routes())
        // Checkout
        .route("/checkout", get(checkout::show).post(checkout::place_order))
        // Orders
        .nest("/orders", order_routes())
        // Wishlist
        .nest("/wishlist", wishlist_routes())
        // Badge fragments
        .nest("/fragments", fragment_routes())
        // Account
        .route("/account", get(account::index))
        // Auth
        .nest("/auth", auth_routes())
        // Localization
        .route("/lang/{code}", get(lang::set_language))
}

//! Integration test harness for the Tamarind storefront.
//!
//! Spins up an in-process mock of the REST backend (an axum router on an
//! ephemeral port, speaking the same wire shapes as the real one) and
//! builds the real `AppState` against it. Tests drive the storefront
//! services exactly the way route handlers do, with a real session over
//! the in-memory session store.
//!
//! The mock counts every request it serves, so tests can assert not just
//! on state but on the *absence* of calls (e.g. a rejected quantity must
//! never reach the wire).

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;

use tamarind_core::{
    CartItemId, CategoryId, Email, OrderId, OrderItemId, OrderStatus, ProductId, Quantity,
    TokenPair, UserId, WishlistItemId,
};
use tamarind_storefront::api::types::{
    CartItem, Category, Order, OrderItem, Product, User, WishlistItem,
};
use tamarind_storefront::config::{BackendConfig, StorefrontConfig};
use tamarind_storefront::i18n::Lang;
use tamarind_storefront::models::CurrentUser;
use tamarind_storefront::state::AppState;
use tower_sessions::{MemoryStore, Session};

/// The seeded test account.
pub const TEST_USERNAME: &str = "asha";
/// The seeded test account's password.
pub const TEST_PASSWORD: &str = "orange-kite-42";

type Shared = Arc<Mutex<BackendState>>;

// =============================================================================
// Backend state
// =============================================================================

/// Mutable state behind the mock backend.
pub struct BackendState {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub cart: Vec<CartItem>,
    pub wishlist: Vec<WishlistItem>,
    pub orders: Vec<Order>,
    /// username -> (password, profile)
    pub users: HashMap<String, (String, User)>,
    pub valid_access: HashSet<String>,
    pub valid_refresh: HashSet<String>,
    /// When set, `/users/me/` answers 503 - simulates the identity fetch
    /// failing after a successful token exchange.
    pub fail_current_user: bool,
    hits: HashMap<&'static str, usize>,
    next_id: i64,
    token_counter: i64,
}

impl BackendState {
    /// Seed products, a category, and one user account.
    #[must_use]
    pub fn seed() -> Self {
        let kitchen = Category {
            id: CategoryId::new(1),
            name: "Kitchen".to_string(),
            slug: "kitchen".to_string(),
            description: Some("Everyday kitchenware".to_string()),
            image: None,
            product_count: Some(2),
        };

        let products = vec![
            product(1, "Steel Bottle", "500.00", 10, Some(&kitchen), true, false),
            product(42, "Clay Tea Set", "799.00", 5, Some(&kitchen), false, true),
            product(7, "Cast Iron Pan", "1499.00", 0, None, false, false),
        ];

        let user = User {
            id: UserId::new(1),
            username: TEST_USERNAME.to_string(),
            email: Email::parse("asha@example.com").unwrap(),
            first_name: Some("Asha".to_string()),
            last_name: None,
        };

        let mut users = HashMap::new();
        users.insert(
            TEST_USERNAME.to_string(),
            (TEST_PASSWORD.to_string(), user),
        );

        Self {
            products,
            categories: vec![kitchen],
            cart: Vec::new(),
            wishlist: Vec::new(),
            orders: Vec::new(),
            users,
            valid_access: HashSet::new(),
            valid_refresh: HashSet::new(),
            fail_current_user: false,
            hits: HashMap::new(),
            next_id: 100,
            token_counter: 0,
        }
    }

    fn hit(&mut self, tag: &'static str) {
        *self.hits.entry(tag).or_insert(0) += 1;
    }

    /// Requests served for one endpoint tag.
    #[must_use]
    pub fn hits(&self, tag: &'static str) -> usize {
        self.hits.get(tag).copied().unwrap_or(0)
    }

    /// Requests served in total.
    #[must_use]
    pub fn total_hits(&self) -> usize {
        self.hits.values().sum()
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn issue_tokens(&mut self) -> TokenPair {
        self.token_counter += 1;
        let access = format!("access-{}", self.token_counter);
        let refresh = format!("refresh-{}", self.token_counter);
        self.valid_access.insert(access.clone());
        self.valid_refresh.insert(refresh.clone());
        TokenPair::new(access, refresh)
    }

    fn product_by_id(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Insert an order directly, bypassing the create endpoint. Used to
    /// seed terminal states like `Delivered`.
    pub fn seed_order(&mut self, status: OrderStatus) -> OrderId {
        let id = self.next_id();
        let product = self.products.first().unwrap().clone();
        let order = Order {
            id: OrderId::new(id),
            created_at: Utc::now(),
            items: vec![OrderItem {
                id: OrderItemId::new(self.next_id()),
                price: product.price,
                product,
                quantity: Quantity::MIN,
            }],
            total_amount: Decimal::from(500),
            shipping_address: "42 MG Road, Bengaluru".to_string(),
            phone: Some("9876543210".to_string()),
            status,
        };
        self.orders.push(order);
        OrderId::new(id)
    }
}

fn product(
    id: i64,
    name: &str,
    price: &str,
    stock: u32,
    category: Option<&Category>,
    featured: bool,
    trending: bool,
) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: format!("{name} from the Tamarind catalog"),
        price: price.parse().unwrap(),
        stock,
        image: None,
        category: category.cloned(),
        featured,
        trending,
    }
}

// =============================================================================
// Test context
// =============================================================================

/// Everything a test needs: the mock backend, the real app state pointed
/// at it, and a session over the in-memory store.
pub struct TestContext {
    pub backend: Shared,
    pub state: AppState,
    pub session: Session,
}

impl TestContext {
    /// Start the mock backend and build the storefront state against it.
    pub async fn start() -> Self {
        let backend: Shared = Arc::new(Mutex::new(BackendState::seed()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = backend_router(backend.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("fJ8#kQ2m!xW9@rT4z&bN6^vC1*yH3(dL".to_string()),
            backend: BackendConfig {
                base_url: format!("http://{addr}/").parse().unwrap(),
                request_timeout: Duration::from_secs(5),
            },
            default_language: Lang::En,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let state = AppState::new(config).unwrap();
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        Self {
            backend,
            state,
            session,
        }
    }

    /// Log the seeded account in through the real token + session flow.
    pub async fn login(&self) -> CurrentUser {
        let tokens = self
            .state
            .api()
            .obtain_tokens(TEST_USERNAME, TEST_PASSWORD)
            .await
            .unwrap();
        self.state
            .sessions()
            .login(&self.session, tokens)
            .await
            .unwrap()
            .expect("seeded identity fetch should succeed")
    }

    /// Lock the mock backend's state.
    pub fn backend(&self) -> MutexGuard<'_, BackendState> {
        self.backend.lock().unwrap()
    }

    /// Invalidate every issued access token (refresh tokens stay valid).
    pub fn expire_access_tokens(&self) {
        self.backend().valid_access.clear();
    }

    /// Invalidate every issued refresh token as well.
    pub fn revoke_all_tokens(&self) {
        let mut backend = self.backend();
        backend.valid_access.clear();
        backend.valid_refresh.clear();
    }
}

// =============================================================================
// Router
// =============================================================================

/// The mock backend's router; wire shapes mirror the real backend.
#[must_use]
pub fn backend_router(state: Shared) -> Router {
    Router::new()
        // identity
        .route("/api/token/", post(obtain_token))
        .route("/api/token/refresh/", post(refresh_token))
        .route("/users/register/", post(register))
        .route("/users/me/", get(current_user))
        // catalog
        .route("/products/", get(list_products))
        .route("/products/{id}/", get(get_product))
        .route("/products/categories/", get(list_categories))
        .route("/products/category/{slug}/", get(category_products))
        // cart
        .route("/cart/", get(list_cart))
        .route("/cart/add/", post(cart_add))
        .route("/cart/update/{id}/", put(cart_update))
        .route("/cart/remove/{id}/", delete(cart_remove))
        .route("/cart/clear/", post(cart_clear))
        // wishlist
        .route("/wishlist/", get(wishlist_list))
        .route("/wishlist/add/", post(wishlist_add))
        .route("/wishlist/remove/{product_id}/", delete(wishlist_remove))
        .route("/wishlist/count/", get(wishlist_count))
        // orders
        .route("/orders/", get(orders_list).post(orders_create))
        .route("/orders/{id}/", get(orders_detail))
        .route("/orders/{id}/cancel/", post(orders_cancel))
        .route("/orders/{id}/invoice/", get(orders_invoice))
        .with_state(state)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Given token not valid for any token type"})),
    )
        .into_response()
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"detail": format!("{what} not found")})),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"detail": message}))).into_response()
}

fn authorize(state: &BackendState, headers: &HeaderMap) -> Result<(), Response> {
    let valid = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| state.valid_access.contains(token));

    if valid { Ok(()) } else { Err(unauthorized()) }
}

// =============================================================================
// Identity handlers
// =============================================================================

#[derive(Deserialize)]
struct TokenBody {
    username: String,
    password: String,
}

async fn obtain_token(State(shared): State<Shared>, Json(body): Json<TokenBody>) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("token");

    let matches = state
        .users
        .get(&body.username)
        .is_some_and(|(password, _)| password == &body.password);
    if !matches {
        return unauthorized();
    }

    let tokens = state.issue_tokens();
    Json(json!({"access": tokens.access, "refresh": tokens.refresh})).into_response()
}

#[derive(Deserialize)]
struct RefreshBody {
    refresh: String,
}

async fn refresh_token(State(shared): State<Shared>, Json(body): Json<RefreshBody>) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("refresh");

    if !state.valid_refresh.contains(&body.refresh) {
        return unauthorized();
    }

    state.token_counter += 1;
    let access = format!("access-{}", state.token_counter);
    state.valid_access.insert(access.clone());
    Json(json!({"access": access})).into_response()
}

#[derive(Deserialize)]
struct RegisterBody {
    username: String,
    email: String,
    password: String,
}

async fn register(State(shared): State<Shared>, Json(body): Json<RegisterBody>) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("register");

    if state.users.contains_key(&body.username) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"username": ["A user with that username already exists."]})),
        )
            .into_response();
    }

    let id = state.next_id();
    let user = User {
        id: UserId::new(id),
        username: body.username.clone(),
        email: Email::parse(&body.email).unwrap(),
        first_name: None,
        last_name: None,
    };
    state
        .users
        .insert(body.username, (body.password, user.clone()));

    (StatusCode::CREATED, Json(user)).into_response()
}

async fn current_user(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("me");

    if state.fail_current_user {
        return (StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response();
    }
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let (_, user) = state.users.get(TEST_USERNAME).unwrap();
    Json(user.clone()).into_response()
}

// =============================================================================
// Catalog handlers
// =============================================================================

async fn list_products(
    State(shared): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("products");

    let mut products: Vec<_> = state.products.clone();

    if let Some(search) = params.get("search") {
        let needle = search.to_lowercase();
        products.retain(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
        });
    }
    if let Some(slug) = params.get("category") {
        products.retain(|p| p.category.as_ref().is_some_and(|c| &c.slug == slug));
    }
    if let Some(min) = params.get("min_price").and_then(|v| v.parse::<Decimal>().ok()) {
        products.retain(|p| p.price >= min);
    }
    if let Some(max) = params.get("max_price").and_then(|v| v.parse::<Decimal>().ok()) {
        products.retain(|p| p.price <= max);
    }
    if params.get("featured").map(String::as_str) == Some("true") {
        products.retain(|p| p.featured);
    }
    if params.get("trending").map(String::as_str) == Some("true") {
        products.retain(|p| p.trending);
    }

    Json(products).into_response()
}

async fn get_product(State(shared): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("product_detail");

    match state.product_by_id(ProductId::new(id)) {
        Some(product) => Json(product.clone()).into_response(),
        None => not_found("Product"),
    }
}

async fn list_categories(State(shared): State<Shared>) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("categories");
    Json(state.categories.clone()).into_response()
}

async fn category_products(State(shared): State<Shared>, Path(slug): Path<String>) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("category_products");

    let products: Vec<_> = state
        .products
        .iter()
        .filter(|p| p.category.as_ref().is_some_and(|c| c.slug == slug))
        .cloned()
        .collect();
    Json(products).into_response()
}

// =============================================================================
// Cart handlers
// =============================================================================

async fn list_cart(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("cart_list");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    Json(state.cart.clone()).into_response()
}

#[derive(Deserialize)]
struct CartAddBody {
    product_id: i64,
    quantity: u32,
}

async fn cart_add(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CartAddBody>,
) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("cart_add");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let Some(product) = state.product_by_id(ProductId::new(body.product_id)).cloned() else {
        return not_found("Product");
    };
    let Ok(quantity) = Quantity::new(body.quantity) else {
        return bad_request("quantity must be at least 1");
    };
    if product.stock < body.quantity {
        return bad_request(&format!("Not enough stock for {}", product.name));
    }

    if let Some(line) = state
        .cart
        .iter_mut()
        .find(|item| item.product.id == product.id)
    {
        let merged = Quantity::new(line.quantity.get() + quantity.get()).unwrap();
        line.quantity = merged;
        let line = line.clone();
        return (StatusCode::CREATED, Json(line)).into_response();
    }

    let id = state.next_id();
    let item = CartItem {
        id: CartItemId::new(id),
        product,
        quantity,
    };
    state.cart.push(item.clone());
    (StatusCode::CREATED, Json(item)).into_response()
}

#[derive(Deserialize)]
struct CartUpdateBody {
    quantity: u32,
}

async fn cart_update(
    State(shared): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<CartUpdateBody>,
) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("cart_update");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let Ok(quantity) = Quantity::new(body.quantity) else {
        return bad_request("quantity must be at least 1");
    };
    match state
        .cart
        .iter_mut()
        .find(|item| item.id == CartItemId::new(id))
    {
        Some(item) => {
            item.quantity = quantity;
            let item = item.clone();
            Json(item).into_response()
        }
        None => not_found("Cart item"),
    }
}

async fn cart_remove(
    State(shared): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("cart_remove");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    state.cart.retain(|item| item.id != CartItemId::new(id));
    Json(json!({"message": "Removed from cart"})).into_response()
}

async fn cart_clear(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("cart_clear");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    state.cart.clear();
    Json(json!({"message": "Cart cleared"})).into_response()
}

// =============================================================================
// Wishlist handlers
// =============================================================================

async fn wishlist_list(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("wishlist_list");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    Json(state.wishlist.clone()).into_response()
}

#[derive(Deserialize)]
struct WishlistAddBody {
    product_id: i64,
}

async fn wishlist_add(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<WishlistAddBody>,
) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("wishlist_add");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let product_id = ProductId::new(body.product_id);
    let Some(product) = state.product_by_id(product_id).cloned() else {
        return not_found("Product");
    };

    // get_or_create semantics: adding an existing member is a no-op
    if !state
        .wishlist
        .iter()
        .any(|item| item.product.id == product_id)
    {
        let id = state.next_id();
        state.wishlist.push(WishlistItem {
            id: WishlistItemId::new(id),
            product,
            created_at: Some(Utc::now()),
        });
    }

    StatusCode::CREATED.into_response()
}

async fn wishlist_remove(
    State(shared): State<Shared>,
    Path(product_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("wishlist_remove");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    state
        .wishlist
        .retain(|item| item.product.id != ProductId::new(product_id));
    Json(json!({"message": "Removed from wishlist"})).into_response()
}

async fn wishlist_count(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("wishlist_count");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    Json(json!({"count": state.wishlist.len()})).into_response()
}

// =============================================================================
// Order handlers
// =============================================================================

#[derive(Deserialize)]
struct OrderItemWrite {
    product_id: i64,
    quantity: u32,
}

#[derive(Deserialize)]
struct OrderCreateBody {
    shipping_address: String,
    phone: String,
    items_write: Vec<OrderItemWrite>,
}

async fn orders_create(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<OrderCreateBody>,
) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("orders_create");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let mut items = Vec::new();
    let mut total = Decimal::ZERO;
    for line in &body.items_write {
        let Some(product) = state.product_by_id(ProductId::new(line.product_id)).cloned() else {
            return not_found("Product");
        };
        if product.stock < line.quantity {
            return bad_request(&format!("Not enough stock for {}", product.name));
        }
        let Ok(quantity) = Quantity::new(line.quantity) else {
            return bad_request("quantity must be at least 1");
        };

        total += product.price * Decimal::from(line.quantity);
        let id = state.next_id();
        items.push(OrderItem {
            id: OrderItemId::new(id),
            price: product.price,
            product,
            quantity,
        });
    }

    // Decrement stock once the whole draft validated
    for line in &body.items_write {
        if let Some(product) = state
            .products
            .iter_mut()
            .find(|p| p.id == ProductId::new(line.product_id))
        {
            product.stock -= line.quantity;
        }
    }

    let id = state.next_id();
    let order = Order {
        id: OrderId::new(id),
        created_at: Utc::now(),
        items,
        total_amount: total,
        shipping_address: body.shipping_address,
        phone: Some(body.phone),
        status: OrderStatus::Placed,
    };
    state.orders.push(order.clone());

    (StatusCode::CREATED, Json(order)).into_response()
}

async fn orders_list(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("orders_list");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let mut orders = state.orders.clone();
    orders.reverse(); // newest first
    Json(orders).into_response()
}

async fn orders_detail(
    State(shared): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("orders_detail");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    match state.orders.iter().find(|o| o.id == OrderId::new(id)) {
        Some(order) => Json(order.clone()).into_response(),
        None => not_found("Order"),
    }
}

async fn orders_cancel(
    State(shared): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("orders_cancel");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let Some(order) = state.orders.iter_mut().find(|o| o.id == OrderId::new(id)) else {
        return not_found("Order");
    };

    if !order.status.is_cancellable() {
        return bad_request("Order cannot be cancelled");
    }

    order.status = OrderStatus::Cancelled;
    Json(json!({"detail": "Order cancelled successfully"})).into_response()
}

async fn orders_invoice(
    State(shared): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = shared.lock().unwrap();
    state.hit("orders_invoice");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    if !state.orders.iter().any(|o| o.id == OrderId::new(id)) {
        return not_found("Order");
    }

    (
        [(header::CONTENT_TYPE, "application/pdf")],
        format!("%PDF-1.4 mock invoice for order {id}").into_bytes(),
    )
        .into_response()
}

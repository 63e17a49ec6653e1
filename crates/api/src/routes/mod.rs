//! HTTP route handlers for the store API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness probe
//! GET  /health/ready                - Readiness probe (checks database)
//!
//! # Auth (per-IP rate limited)
//! POST /api/auth/send-otp           - Email a sign-in code
//! POST /api/auth/verify-otp         - Exchange code for a user account
//!
//! # Products
//! GET    /api/products              - Catalog listing (?category=&gender=)
//! GET    /api/products/search       - Keyword search (?query=)
//! GET    /api/products/{id}         - Product detail
//! POST   /api/products              - Create product
//! PUT    /api/products/{id}         - Partial update
//! DELETE /api/products/{id}         - Delete product
//!
//! # Cart
//! GET  /api/cart/{userId}           - Fetch (or lazily create) the cart
//! POST /api/cart/{userId}/add       - Add item, merging quantities
//! POST /api/cart/{userId}/update    - Set line quantity
//! POST /api/cart/{userId}/remove    - Remove a line
//! POST /api/cart/{userId}/clear     - Empty the cart
//!
//! # Checkout
//! POST /api/checkout/{userId}/create - Place an order from the cart
//! GET  /api/checkout/{userId}/orders - Order history, newest first
//!
//! # Contact
//! POST /api/contact/submit          - Relay a contact form message
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/send-otp", post(auth::send_otp))
        .route("/verify-otp", post(auth::verify_otp))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/search", get(products::search))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(cart::show))
        .route("/{user_id}/add", post(cart::add))
        .route("/{user_id}/update", post(cart::update))
        .route("/{user_id}/remove", post(cart::remove))
        .route("/{user_id}/clear", post(cart::clear))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/{user_id}/create", post(checkout::create_order))
        .route("/{user_id}/orders", get(checkout::list_orders))
}

/// Create the contact routes router.
pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/submit", post(contact::submit))
}

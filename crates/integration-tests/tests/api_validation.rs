//! Request validation tests against the real router.
//!
//! These run entirely in-process: the pool is lazy and never connects, so
//! every assertion here covers a path that fails before database I/O.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use meridian_api::config::ApiConfig;
use meridian_api::db;
use meridian_api::services::email::EmailService;
use meridian_api::state::AppState;

fn app() -> Router {
    let config = ApiConfig {
        database_url: SecretString::from("postgres://postgres@127.0.0.1:1/meridian_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 5000,
        email: None,
        sentry_dsn: None,
        sentry_environment: None,
    };
    let pool = db::create_lazy_pool(&config.database_url);
    let email = EmailService::new(None).unwrap();
    meridian_api::router(AppState::new(config, pool, email))
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        // The auth rate limiter keys on the client IP from proxy headers.
        .header("x-forwarded-for", "127.0.0.1")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn send_otp_rejects_invalid_email() {
    let response = app()
        .oneshot(post_json(
            "/api/auth/send-otp",
            &json!({ "email": "not-an-email" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], "Please enter a valid email address");
}

#[tokio::test]
async fn send_otp_rejects_missing_email() {
    let response = app()
        .oneshot(post_json("/api/auth/send-otp", &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Please enter a valid email address");
}

#[tokio::test]
async fn verify_otp_requires_email_and_code() {
    let response = app()
        .oneshot(post_json(
            "/api/auth/verify-otp",
            &json!({ "email": "shopper@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Email and OTP are required");
}

#[tokio::test]
async fn verify_otp_requires_name() {
    let response = app()
        .oneshot(post_json(
            "/api/auth/verify-otp",
            &json!({ "email": "shopper@example.com", "otp": "123456", "name": "   " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Name is required");
}

#[tokio::test]
async fn auth_rate_limiter_kicks_in_after_burst() {
    let app = app();

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(post_json("/api/auth/send-otp", &json!({ "email": "x" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .oneshot(post_json("/api/auth/send-otp", &json!({ "email": "x" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn product_search_with_empty_query_returns_empty_list() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/products/search?query=%20%20")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn product_show_with_malformed_id_is_not_found() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/products/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn product_create_rejects_blank_name() {
    let response = app()
        .oneshot(post_json(
            "/api/products",
            &json!({
                "name": "   ",
                "description": "d",
                "price": "10.00",
                "image": "i",
                "category": "watch",
                "gender": "men"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Product name is required");
}

#[tokio::test]
async fn product_create_rejects_unknown_gender() {
    let response = app()
        .oneshot(post_json(
            "/api/products",
            &json!({
                "name": "Test Watch",
                "description": "d",
                "price": "10.00",
                "image": "i",
                "category": "watch",
                "gender": "kids"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Gender must be one of: men, women, unisex");
}

#[tokio::test]
async fn product_create_rejects_negative_price() {
    let response = app()
        .oneshot(post_json(
            "/api/products",
            &json!({
                "name": "Test Watch",
                "description": "d",
                "price": "-1.00",
                "image": "i",
                "category": "watch",
                "gender": "men"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Price must not be negative");
}

#[tokio::test]
async fn cart_add_rejects_zero_quantity() {
    let response = app()
        .oneshot(post_json(
            "/api/cart/guest-1/add",
            &json!({ "productId": "4f9d94f7-6a86-4d9e-8a94-0a1b2c3d4e5f", "quantity": 0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Quantity must be at least 1");
}

#[tokio::test]
async fn cart_update_rejects_zero_quantity() {
    let response = app()
        .oneshot(post_json(
            "/api/cart/guest-1/update",
            &json!({ "productId": "4f9d94f7-6a86-4d9e-8a94-0a1b2c3d4e5f", "quantity": 0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Quantity must be at least 1");
}

#[tokio::test]
async fn cart_add_with_malformed_product_id_is_not_found() {
    let response = app()
        .oneshot(post_json(
            "/api/cart/guest-1/add",
            &json!({ "productId": "nope", "quantity": 2 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn checkout_requires_complete_shipping_info() {
    let response = app()
        .oneshot(post_json(
            "/api/checkout/guest-1/create",
            &json!({
                "shippingInfo": {
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "email": "ada@example.com",
                    "phone": "",
                    "address": "12 Crescent Rd",
                    "city": "London",
                    "zipCode": "N1 9GU",
                    "country": "UK"
                },
                "paymentMethod": "credit_card"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "All shipping information fields are required");
}

#[tokio::test]
async fn checkout_requires_shipping_info_at_all() {
    let response = app()
        .oneshot(post_json("/api/checkout/guest-1/create", &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "All shipping information fields are required");
}

#[tokio::test]
async fn contact_requires_all_fields() {
    let response = app()
        .oneshot(post_json(
            "/api/contact/submit",
            &json!({ "name": "Ada", "email": "ada@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], "All fields are required");
}

#[tokio::test]
async fn contact_rejects_invalid_email() {
    let response = app()
        .oneshot(post_json(
            "/api/contact/submit",
            &json!({
                "name": "Ada",
                "email": "not-an-email",
                "subject": "Hello",
                "message": "Just saying hi."
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Please enter a valid email address");
}

#[tokio::test]
async fn contact_submits_in_log_only_mode() {
    let response = app()
        .oneshot(post_json(
            "/api/contact/submit",
            &json!({
                "name": "Ada",
                "email": "ada@example.com",
                "subject": "Hello",
                "message": "Just saying hi."
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], "Your message was sent successfully. Thank you!");
}

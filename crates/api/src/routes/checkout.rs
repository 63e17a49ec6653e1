//! Checkout handlers.
//!
//! Placing an order snapshots the cart (including unit prices) into an
//! immutable order, clears the cart, and sends a confirmation email. The
//! order stands even if the confirmation email fails to send.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use meridian_core::PaymentMethod;

use crate::db::carts::CartRepository;
use crate::db::orders::{NewOrder, NewOrderLine, OrderRepository};
use crate::error::{AppError, Result};
use crate::models::{Order, ShippingInfo};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    shipping_info: Option<ShippingInfo>,
    #[serde(default)]
    payment_method: Option<PaymentMethod>,
}

/// POST /api/checkout/{user_id}/create
pub async fn create_order(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let shipping_info = body
        .shipping_info
        .filter(ShippingInfo::is_complete)
        .ok_or_else(|| {
            AppError::BadRequest("All shipping information fields are required".into())
        })?;

    let carts = CartRepository::new(state.pool());
    let cart = carts.get_populated(&user_id).await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let subtotal: Decimal = cart
        .items
        .iter()
        .map(|line| line.product.price * Decimal::from(line.quantity))
        .sum();
    let shipping = Decimal::ZERO; // Free shipping for now
    let total = subtotal + shipping;

    let lines = cart
        .items
        .iter()
        .map(|line| NewOrderLine {
            product_id: line.product.id,
            quantity: line.quantity,
            price: line.product.price,
        })
        .collect();

    let order = OrderRepository::new(state.pool())
        .create(NewOrder {
            user_id,
            cart_id: cart.id,
            lines,
            shipping_info: shipping_info.clone(),
            payment_method: body.payment_method.unwrap_or(PaymentMethod::CashOnDelivery),
            subtotal,
            shipping,
            total,
        })
        .await?;

    if let Err(e) = state
        .email()
        .send_order_confirmation(&shipping_info.email, &order)
        .await
    {
        tracing::warn!(
            order_number = %order.order_number,
            error = %e,
            "Failed to send order confirmation email"
        );
    }

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/checkout/{user_id}/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(&user_id)
        .await?;
    Ok(Json(orders))
}

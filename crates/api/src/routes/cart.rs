//! Cart handlers.
//!
//! Carts are keyed by an opaque client-supplied user id, so guests get a
//! cart as soon as they touch one of these endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use meridian_core::ProductId;

use crate::db::RepositoryError;
use crate::db::carts::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::Cart;
use crate::state::AppState;

const fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    #[serde(default)]
    product_id: Option<String>,
    #[serde(default = "default_quantity")]
    quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[serde(default)]
    product_id: Option<String>,
    quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    #[serde(default)]
    product_id: Option<String>,
}

/// GET /api/cart/{user_id}
pub async fn show(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Cart>> {
    let cart = CartRepository::new(state.pool())
        .get_populated(&user_id)
        .await?;
    Ok(Json(cart))
}

/// POST /api/cart/{user_id}/add
pub async fn add(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<Cart>> {
    if body.quantity < 1 {
        return Err(AppError::BadRequest("Quantity must be at least 1".into()));
    }

    let product_id = body
        .product_id
        .as_deref()
        .and_then(|raw| ProductId::parse_str(raw).ok())
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let carts = CartRepository::new(state.pool());
    ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let cart_id = carts.ensure(&user_id).await?;
    carts.add_item(cart_id, product_id, body.quantity).await?;

    Ok(Json(carts.get_populated(&user_id).await?))
}

/// POST /api/cart/{user_id}/update
pub async fn update(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<Cart>> {
    if body.quantity < 1 {
        return Err(AppError::BadRequest("Quantity must be at least 1".into()));
    }

    let product_id = body
        .product_id
        .as_deref()
        .and_then(|raw| ProductId::parse_str(raw).ok())
        .ok_or_else(|| AppError::NotFound("Item not found in cart".into()))?;

    let carts = CartRepository::new(state.pool());
    let cart_id = carts.ensure(&user_id).await?;
    carts
        .set_quantity(cart_id, product_id, body.quantity)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Item not found in cart".into()),
            other => AppError::Database(other),
        })?;

    Ok(Json(carts.get_populated(&user_id).await?))
}

/// POST /api/cart/{user_id}/remove
pub async fn remove(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<RemoveItemRequest>,
) -> Result<Json<Cart>> {
    let carts = CartRepository::new(state.pool());
    let cart_id = carts.ensure(&user_id).await?;

    // An id that doesn't parse can't be in the cart; removing it is a no-op.
    if let Some(product_id) = body
        .product_id
        .as_deref()
        .and_then(|raw| ProductId::parse_str(raw).ok())
    {
        carts.remove_item(cart_id, product_id).await?;
    }

    Ok(Json(carts.get_populated(&user_id).await?))
}

/// POST /api/cart/{user_id}/clear
pub async fn clear(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Cart>> {
    let carts = CartRepository::new(state.pool());
    let cart_id = carts.ensure(&user_id).await?;
    carts.clear(cart_id).await?;

    Ok(Json(carts.get_populated(&user_id).await?))
}

//! Product catalog handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use meridian_core::{Gender, ProductId};

use crate::db::products::{NewProduct, ProductPatch, ProductRepository, search_patterns};
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    category: Option<String>,
    gender: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    query: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    name: String,
    description: String,
    price: Decimal,
    image: String,
    category: String,
    gender: String,
    #[serde(default)]
    specs: String,
    #[serde(rename = "type", default)]
    product_type: String,
    #[serde(default)]
    flavor_notes: String,
    #[serde(default)]
    position: i32,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    image: Option<String>,
    category: Option<String>,
    gender: Option<String>,
    specs: Option<String>,
    #[serde(rename = "type")]
    product_type: Option<String>,
    flavor_notes: Option<String>,
    position: Option<i32>,
}

/// GET /api/products
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Product>>> {
    // A gender filter that isn't a known value can't match anything.
    let gender = match params.gender.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<Gender>() {
            Ok(g) => Some(g),
            Err(_) => return Ok(Json(Vec::new())),
        },
    };

    let products = ProductRepository::new(state.pool())
        .list(params.category.as_deref(), gender)
        .await?;
    Ok(Json(products))
}

/// GET /api/products/search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Product>>> {
    let patterns = search_patterns(params.query.as_deref().unwrap_or(""));
    if patterns.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let products = ProductRepository::new(state.pool()).search(&patterns).await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id = parse_product_id(&id)?;
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    Ok(Json(product))
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Product name is required".into()));
    }
    if body.price < Decimal::ZERO {
        return Err(AppError::BadRequest("Price must not be negative".into()));
    }
    let gender = parse_gender(&body.gender)?;

    let product = ProductRepository::new(state.pool())
        .create(NewProduct {
            name,
            description: body.description,
            price: body.price,
            image: body.image,
            category: body.category,
            gender,
            specs: body.specs,
            product_type: body.product_type,
            flavor_notes: body.flavor_notes,
            position: body.position,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let id = parse_product_id(&id)?;
    let gender = body.gender.as_deref().map(parse_gender).transpose()?;
    let product = ProductRepository::new(state.pool())
        .update(
            id,
            ProductPatch {
                name: body.name,
                description: body.description,
                price: body.price,
                image: body.image,
                category: body.category,
                gender,
                specs: body.specs,
                product_type: body.product_type,
                flavor_notes: body.flavor_notes,
                position: body.position,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    Ok(Json(product))
}

/// DELETE /api/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_product_id(&id)?;
    let deleted = ProductRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Product not found".into()));
    }
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

/// A malformed id can't refer to any product.
fn parse_product_id(raw: &str) -> Result<ProductId> {
    ProductId::parse_str(raw).map_err(|_| AppError::NotFound("Product not found".into()))
}

fn parse_gender(raw: &str) -> Result<Gender> {
    raw.parse::<Gender>()
        .map_err(|_| AppError::BadRequest("Gender must be one of: men, women, unisex".into()))
}

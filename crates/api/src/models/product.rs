//! Catalog product model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use meridian_core::{Gender, ProductId};

/// A catalog product.
///
/// Read-mostly; written only through the administrative CRUD surface.
/// `position` provides manual ordering ahead of recency in every listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,
    /// Display name; the only field search matches against.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price; never negative.
    pub price: Decimal,
    /// Image URL.
    pub image: String,
    /// Catalog category (e.g. "watch").
    pub category: String,
    /// Target audience.
    pub gender: Gender,
    /// Technical specifications blurb.
    pub specs: String,
    /// Product subtype within the category.
    #[serde(rename = "type")]
    pub product_type: String,
    /// Scent/flavor notes for non-watch lines.
    pub flavor_notes: String,
    /// Manual sort position; lower sorts first.
    pub position: i32,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last modified.
    pub updated_at: DateTime<Utc>,
}

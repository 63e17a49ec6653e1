//! Order snapshot model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use meridian_core::{OrderId, OrderStatus, PaymentMethod};

use super::Product;

/// One line of an order: the product reference, quantity, and the unit
/// price captured at order-creation time.
///
/// The price is a snapshot; later catalog changes never affect it. The
/// product reference is resolved for responses and becomes `null` if the
/// product was deleted after the order was placed.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    /// The resolved product, if it still exists.
    #[serde(rename = "productId")]
    pub product: Option<Product>,
    /// How many units were ordered.
    pub quantity: i32,
    /// Unit price at order time.
    pub price: Decimal,
}

/// Shipping details captured at checkout.
///
/// All fields are required; checkout rejects partial submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

impl ShippingInfo {
    /// Whether every field is present after trimming.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.address,
            &self.city,
            &self.zip_code,
            &self.country,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

/// An immutable guest order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique identifier.
    pub id: OrderId,
    /// Human-facing unique order number (`MRD-<millis>-<seq>`).
    pub order_number: String,
    /// Opaque client-supplied owner id.
    pub user_id: String,
    /// Snapshot line items.
    pub items: Vec<OrderLine>,
    /// Shipping details captured at checkout.
    pub shipping_info: ShippingInfo,
    /// How the customer pays.
    pub payment_method: PaymentMethod,
    /// Sum of line price x quantity.
    pub subtotal: Decimal,
    /// Shipping cost (currently always zero).
    pub shipping: Decimal,
    /// subtotal + shipping.
    pub total: Decimal,
    /// Fulfillment status; starts as `pending`.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the order was last modified.
    pub updated_at: DateTime<Utc>,
}

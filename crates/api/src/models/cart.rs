//! Shopping cart model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use meridian_core::CartId;

use super::Product;

/// One line of a cart: a product and how many of it.
///
/// Carts are always returned populated, so the line carries the full
/// product document. It serializes under the `productId` key, the shape
/// the frontend already consumes.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    /// The resolved product.
    #[serde(rename = "productId")]
    pub product: Product,
    /// How many units; always >= 1.
    pub quantity: i32,
}

/// A user's cart.
///
/// One per `user_id`, created lazily on first access. The same product never
/// appears on two lines; adding an existing product merges quantities.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Unique identifier.
    pub id: CartId,
    /// Opaque client-supplied owner id.
    pub user_id: String,
    /// Populated line items.
    pub items: Vec<CartLine>,
    /// When the cart was created.
    pub created_at: DateTime<Utc>,
    /// When the cart was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::super::product::tests::sample;
    use super::*;

    #[test]
    fn test_populated_wire_shape() {
        let cart = Cart {
            id: CartId::generate(),
            user_id: "session-abc".to_string(),
            items: vec![CartLine {
                product: sample("Golden Classic", Decimal::new(500, 0)),
                quantity: 2,
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["userId"], "session-abc");
        // the line item exposes the full product under "productId"
        assert_eq!(json["items"][0]["productId"]["name"], "Golden Classic");
        assert_eq!(json["items"][0]["quantity"], 2);
    }
}

//! Order repository.
//!
//! Orders are immutable snapshots: each line stores the unit price the
//! customer saw at checkout, and a later product deletion only nulls the
//! product reference. Order numbers come from `store.order_counter`, a
//! single-row counter bumped atomically inside the checkout transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use meridian_core::{CartId, Gender, OrderId, OrderStatus, PaymentMethod, ProductId};

use super::RepositoryError;
use crate::models::{Order, OrderLine, Product, ShippingInfo};

const ORDER_COLUMNS: &str = "id, order_number, user_id, \
     shipping_first_name, shipping_last_name, shipping_email, shipping_phone, \
     shipping_address, shipping_city, shipping_zip_code, shipping_country, \
     payment_method, subtotal, shipping, total, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    user_id: String,
    shipping_first_name: String,
    shipping_last_name: String,
    shipping_email: String,
    shipping_phone: String,
    shipping_address: String,
    shipping_city: String,
    shipping_zip_code: String,
    shipping_country: String,
    payment_method: String,
    subtotal: Decimal,
    shipping: Decimal,
    total: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderLine>) -> Result<Order, RepositoryError> {
        let payment_method = self.payment_method.parse::<PaymentMethod>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment method in database: {e}"))
        })?;
        let status = self.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            order_number: self.order_number,
            user_id: self.user_id,
            items,
            shipping_info: ShippingInfo {
                first_name: self.shipping_first_name,
                last_name: self.shipping_last_name,
                email: self.shipping_email,
                phone: self.shipping_phone,
                address: self.shipping_address,
                city: self.shipping_city,
                zip_code: self.shipping_zip_code,
                country: self.shipping_country,
            },
            payment_method,
            subtotal: self.subtotal,
            shipping: self.shipping,
            total: self.total,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Line row with the product left-joined in. Every product column is
/// nullable because the product may have been deleted since the order
/// was placed.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    quantity: i32,
    price: Decimal,
    product_id: Option<Uuid>,
    product_name: Option<String>,
    product_description: Option<String>,
    product_price: Option<Decimal>,
    product_image: Option<String>,
    product_category: Option<String>,
    product_gender: Option<String>,
    product_specs: Option<String>,
    product_type: Option<String>,
    product_flavor_notes: Option<String>,
    product_position: Option<i32>,
    product_created_at: Option<DateTime<Utc>>,
    product_updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        let product = match row.product_id {
            None => None,
            Some(id) => {
                let missing = |column: &str| {
                    RepositoryError::DataCorruption(format!(
                        "order line product {id} is missing {column}"
                    ))
                };
                let gender = row
                    .product_gender
                    .ok_or_else(|| missing("gender"))?
                    .parse::<Gender>()
                    .map_err(|e| {
                        RepositoryError::DataCorruption(format!(
                            "invalid gender in database: {e}"
                        ))
                    })?;

                Some(Product {
                    id: ProductId::new(id),
                    name: row.product_name.ok_or_else(|| missing("name"))?,
                    description: row.product_description.ok_or_else(|| missing("description"))?,
                    price: row.product_price.ok_or_else(|| missing("price"))?,
                    image: row.product_image.ok_or_else(|| missing("image"))?,
                    category: row.product_category.ok_or_else(|| missing("category"))?,
                    gender,
                    specs: row.product_specs.ok_or_else(|| missing("specs"))?,
                    product_type: row.product_type.ok_or_else(|| missing("product_type"))?,
                    flavor_notes: row.product_flavor_notes.ok_or_else(|| missing("flavor_notes"))?,
                    position: row.product_position.ok_or_else(|| missing("position"))?,
                    created_at: row.product_created_at.ok_or_else(|| missing("created_at"))?,
                    updated_at: row.product_updated_at.ok_or_else(|| missing("updated_at"))?,
                })
            }
        };

        Ok(Self {
            product,
            quantity: row.quantity,
            price: row.price,
        })
    }
}

/// Snapshot of one cart line at checkout time.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Fields for placing an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: String,
    pub cart_id: CartId,
    pub lines: Vec<NewOrderLine>,
    pub shipping_info: ShippingInfo,
    pub payment_method: PaymentMethod,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order: bump the order counter, write the order and its
    /// line snapshots, and empty the cart, all in one transaction. Either
    /// everything lands or nothing does.
    ///
    /// Returns the stored order with product documents populated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_number = next_order_number(&mut tx).await?;

        let order_id: Uuid = sqlx::query_scalar(
            "INSERT INTO store.orders \
             (order_number, user_id, \
              shipping_first_name, shipping_last_name, shipping_email, shipping_phone, \
              shipping_address, shipping_city, shipping_zip_code, shipping_country, \
              payment_method, subtotal, shipping, total, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING id",
        )
        .bind(&order_number)
        .bind(&order.user_id)
        .bind(&order.shipping_info.first_name)
        .bind(&order.shipping_info.last_name)
        .bind(&order.shipping_info.email)
        .bind(&order.shipping_info.phone)
        .bind(&order.shipping_info.address)
        .bind(&order.shipping_info.city)
        .bind(&order.shipping_info.zip_code)
        .bind(&order.shipping_info.country)
        .bind(order.payment_method.to_string())
        .bind(order.subtotal)
        .bind(order.shipping)
        .bind(order.total)
        .bind(OrderStatus::Pending.to_string())
        .fetch_one(&mut *tx)
        .await?;

        for line in &order.lines {
            sqlx::query(
                "INSERT INTO store.order_items (order_id, product_id, quantity, price) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order_id)
            .bind(line.product_id.as_uuid())
            .bind(line.quantity)
            .bind(line.price)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM store.cart_items WHERE cart_id = $1")
            .bind(order.cart_id.as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE store.carts SET updated_at = now() WHERE id = $1")
            .bind(order.cart_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get(OrderId::new(order_id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Get an order by id with product documents populated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM store.orders WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        match row {
            None => Ok(None),
            Some(row) => {
                let items = self.items_for(id).await?;
                row.into_order(items).map(Some)
            }
        }
    }

    /// List a user's orders, newest first, with product documents populated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM store.orders \
             WHERE user_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.items_for(OrderId::new(row.id)).await?;
            orders.push(row.into_order(items)?);
        }

        Ok(orders)
    }

    async fn items_for(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            "SELECT oi.quantity, oi.price, \
                 p.id AS product_id, \
                 p.name AS product_name, \
                 p.description AS product_description, \
                 p.price AS product_price, \
                 p.image AS product_image, \
                 p.category AS product_category, \
                 p.gender AS product_gender, \
                 p.specs AS product_specs, \
                 p.product_type AS product_type, \
                 p.flavor_notes AS product_flavor_notes, \
                 p.position AS product_position, \
                 p.created_at AS product_created_at, \
                 p.updated_at AS product_updated_at \
             FROM store.order_items oi \
             LEFT JOIN store.products p ON p.id = oi.product_id \
             WHERE oi.order_id = $1 \
             ORDER BY oi.id ASC",
        )
        .bind(order_id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

/// Bump the single-row order counter and format the next order number.
///
/// `INSERT ... ON CONFLICT DO UPDATE ... RETURNING` makes the increment
/// atomic under concurrent checkouts, so two orders placed in the same
/// millisecond still get distinct numbers.
async fn next_order_number(
    tx: &mut Transaction<'_, Postgres>,
) -> Result<String, RepositoryError> {
    let seq: i64 = sqlx::query_scalar(
        "INSERT INTO store.order_counter (id, seq) VALUES (TRUE, 1) \
         ON CONFLICT (id) DO UPDATE SET seq = store.order_counter.seq + 1 \
         RETURNING seq",
    )
    .fetch_one(&mut **tx)
    .await?;

    Ok(format!("MRD-{}-{seq:04}", Utc::now().timestamp_millis()))
}

#[cfg(all(test, feature = "pg-tests"))]
#[allow(clippy::unwrap_used)]
mod pg_tests {
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    use meridian_core::{CartId, Gender, PaymentMethod};

    use super::{NewOrder, NewOrderLine, OrderRepository};
    use crate::db::carts::CartRepository;
    use crate::db::products::{NewProduct, ProductRepository};
    use crate::models::{Product, ShippingInfo};

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Analytical Way".to_string(),
            city: "London".to_string(),
            zip_code: "N1 9GU".to_string(),
            country: "GB".to_string(),
        }
    }

    fn order_for(cart_id: CartId, product: &Product) -> NewOrder {
        NewOrder {
            user_id: "buyer-1".to_string(),
            cart_id,
            lines: vec![NewOrderLine {
                product_id: product.id,
                quantity: 1,
                price: product.price,
            }],
            shipping_info: shipping(),
            payment_method: PaymentMethod::CashOnDelivery,
            subtotal: product.price,
            shipping: Decimal::ZERO,
            total: product.price,
        }
    }

    fn counter_value(order_number: &str) -> i64 {
        order_number.rsplit('-').next().unwrap().parse().unwrap()
    }

    #[sqlx::test]
    async fn test_order_numbers_are_strictly_increasing(pool: PgPool) {
        let product = ProductRepository::new(&pool)
            .create(NewProduct {
                name: "Counter Watch".to_string(),
                description: String::new(),
                price: Decimal::new(19_900, 2),
                image: String::new(),
                category: "watch".to_string(),
                gender: Gender::Men,
                specs: String::new(),
                product_type: String::new(),
                flavor_notes: String::new(),
                position: 1,
            })
            .await
            .unwrap();
        let cart_id = CartRepository::new(&pool).ensure("buyer-1").await.unwrap();
        let orders = OrderRepository::new(&pool);

        let first = orders.create(order_for(cart_id, &product)).await.unwrap();
        let second = orders.create(order_for(cart_id, &product)).await.unwrap();
        let third = orders.create(order_for(cart_id, &product)).await.unwrap();

        assert_eq!(counter_value(&first.order_number), 1);
        assert_eq!(counter_value(&second.order_number), 2);
        assert_eq!(counter_value(&third.order_number), 3);
        assert_ne!(first.order_number, second.order_number);
    }

    #[sqlx::test]
    async fn test_placing_an_order_empties_the_cart(pool: PgPool) {
        let product = ProductRepository::new(&pool)
            .create(NewProduct {
                name: "Checkout Watch".to_string(),
                description: String::new(),
                price: Decimal::new(19_900, 2),
                image: String::new(),
                category: "watch".to_string(),
                gender: Gender::Men,
                specs: String::new(),
                product_type: String::new(),
                flavor_notes: String::new(),
                position: 1,
            })
            .await
            .unwrap();
        let carts = CartRepository::new(&pool);
        let cart_id = carts.ensure("buyer-1").await.unwrap();
        carts.add_item(cart_id, product.id, 2).await.unwrap();

        let order = OrderRepository::new(&pool)
            .create(order_for(cart_id, &product))
            .await
            .unwrap();

        assert_eq!(order.items.len(), 1);
        let cart = carts.get_populated("buyer-1").await.unwrap();
        assert!(cart.is_empty());
    }
}

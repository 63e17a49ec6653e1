//! Cart repository.
//!
//! Each client-supplied user key owns at most one cart (`store.carts` has a
//! unique index on `user_id`); lines live in `store.cart_items` with one row
//! per product. All reads return the cart with its product documents joined
//! in, matching the wire shape the frontend renders from.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use meridian_core::{CartId, ProductId};

use super::RepositoryError;
use super::products::ProductRow;
use crate::models::{Cart, CartLine};

/// Product columns prefixed for the cart-line join.
const JOINED_PRODUCT_COLUMNS: &str =
    "p.id, p.name, p.description, p.price, p.image, p.category, p.gender, \
     p.specs, p.product_type, p.flavor_notes, p.position, p.created_at, p.updated_at";

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    #[sqlx(flatten)]
    product: ProductRow,
    quantity: i32,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product: row.product.try_into()?,
            quantity: row.quantity,
        })
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the cart for a user key, creating an empty one if none exists.
    ///
    /// The upsert touches nothing on conflict, so concurrent callers for
    /// the same key always land on the same row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn ensure(&self, user_id: &str) -> Result<CartId, RepositoryError> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO store.carts (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING id",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(CartId::new(id))
    }

    /// Load a user's cart with product documents populated, creating the
    /// cart first if needed. Lines appear in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_populated(&self, user_id: &str) -> Result<Cart, RepositoryError> {
        let cart_id = self.ensure(user_id).await?;

        let header = sqlx::query(
            "SELECT created_at, updated_at FROM store.carts WHERE id = $1",
        )
        .bind(cart_id.as_uuid())
        .fetch_one(self.pool)
        .await?;
        let created_at: DateTime<Utc> = header.try_get("created_at")?;
        let updated_at: DateTime<Utc> = header.try_get("updated_at")?;

        let rows = sqlx::query_as::<_, CartLineRow>(&format!(
            "SELECT {JOINED_PRODUCT_COLUMNS}, ci.quantity \
             FROM store.cart_items ci \
             JOIN store.products p ON p.id = ci.product_id \
             WHERE ci.cart_id = $1 \
             ORDER BY ci.added_at ASC",
        ))
        .bind(cart_id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<CartLine>, _>>()?;

        Ok(Cart {
            id: cart_id,
            user_id: user_id.to_owned(),
            items,
            created_at,
            updated_at,
        })
    }

    /// Add a quantity of a product to a cart. If the product is already in
    /// the cart the quantities merge in a single upsert, so concurrent adds
    /// never lose an increment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO store.cart_items (cart_id, product_id, quantity) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (cart_id, product_id) DO UPDATE SET \
                 quantity = store.cart_items.quantity + EXCLUDED.quantity",
        )
        .bind(cart_id.as_uuid())
        .bind(product_id.as_uuid())
        .bind(quantity)
        .execute(self.pool)
        .await?;

        self.touch(cart_id).await
    }

    /// Set the quantity of an existing cart line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    pub async fn set_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE store.cart_items SET quantity = $3 \
             WHERE cart_id = $1 AND product_id = $2",
        )
        .bind(cart_id.as_uuid())
        .bind(product_id.as_uuid())
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.touch(cart_id).await
    }

    /// Remove a product from a cart. Removing a product that isn't in the
    /// cart is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM store.cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id.as_uuid())
            .bind(product_id.as_uuid())
            .execute(self.pool)
            .await?;

        self.touch(cart_id).await
    }

    /// Remove every line from a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM store.cart_items WHERE cart_id = $1")
            .bind(cart_id.as_uuid())
            .execute(self.pool)
            .await?;

        self.touch(cart_id).await
    }

    async fn touch(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE store.carts SET updated_at = now() WHERE id = $1")
            .bind(cart_id.as_uuid())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(all(test, feature = "pg-tests"))]
#[allow(clippy::unwrap_used)]
mod pg_tests {
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    use meridian_core::Gender;

    use super::CartRepository;
    use crate::db::products::{NewProduct, ProductRepository};

    fn watch(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: String::new(),
            price: Decimal::new(9_900, 2),
            image: String::new(),
            category: "watch".to_string(),
            gender: Gender::Men,
            specs: String::new(),
            product_type: String::new(),
            flavor_notes: String::new(),
            position: 1,
        }
    }

    #[sqlx::test]
    async fn test_adding_same_product_merges_quantities(pool: PgPool) {
        let product = ProductRepository::new(&pool)
            .create(watch("Merge Candidate"))
            .await
            .unwrap();
        let carts = CartRepository::new(&pool);

        let cart_id = carts.ensure("user-1").await.unwrap();
        carts.add_item(cart_id, product.id, 2).await.unwrap();
        carts.add_item(cart_id, product.id, 3).await.unwrap();

        let cart = carts.get_populated("user-1").await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.items[0].product.id, product.id);
    }

    #[sqlx::test]
    async fn test_distinct_products_get_distinct_lines(pool: PgPool) {
        let products = ProductRepository::new(&pool);
        let first = products.create(watch("First")).await.unwrap();
        let second = products.create(watch("Second")).await.unwrap();
        let carts = CartRepository::new(&pool);

        let cart_id = carts.ensure("user-2").await.unwrap();
        carts.add_item(cart_id, first.id, 1).await.unwrap();
        carts.add_item(cart_id, second.id, 4).await.unwrap();

        let cart = carts.get_populated("user-2").await.unwrap();
        assert_eq!(cart.items.len(), 2);
    }
}

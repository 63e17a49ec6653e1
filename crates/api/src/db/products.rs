//! Product repository for catalog database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use meridian_core::{Gender, ProductId};

use super::RepositoryError;
use crate::models::Product;

/// Column list shared by every product query.
const PRODUCT_COLUMNS: &str = "id, name, description, price, image, category, gender, \
     specs, product_type, flavor_notes, position, created_at, updated_at";

/// Maximum rows returned by a search.
const SEARCH_LIMIT: i64 = 20;

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    image: String,
    category: String,
    gender: String,
    specs: String,
    product_type: String,
    flavor_notes: String,
    position: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let gender = row.gender.parse::<Gender>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid gender in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            image: row.image,
            category: row.category,
            gender,
            specs: row.specs,
            product_type: row.product_type,
            flavor_notes: row.flavor_notes,
            position: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Fields for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: String,
    pub category: String,
    pub gender: Gender,
    pub specs: String,
    pub product_type: String,
    pub flavor_notes: String,
    pub position: i32,
}

/// Partial update of a product; `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub gender: Option<Gender>,
    pub specs: Option<String>,
    pub product_type: Option<String>,
    pub flavor_notes: Option<String>,
    pub position: Option<i32>,
}

/// Turn a raw search query into `ILIKE` patterns, one per keyword.
///
/// The query is lowercased and whitespace-split; each keyword becomes a
/// `%keyword%` substring pattern with LIKE metacharacters escaped so user
/// input can't act as a wildcard. An empty or whitespace-only query yields
/// no patterns.
#[must_use]
pub fn search_patterns(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(|keyword| {
            let escaped: String = keyword
                .chars()
                .flat_map(|c| match c {
                    '%' | '_' | '\\' => vec!['\\', c],
                    _ => vec![c],
                })
                .collect();
            format!("%{escaped}%")
        })
        .collect()
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, optionally filtered by category and/or gender,
    /// ordered by manual position then recency.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        category: Option<&str>,
        gender: Option<Gender>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products WHERE TRUE"
        ));
        if let Some(category) = category {
            query.push(" AND category = ");
            query.push_bind(category.to_owned());
        }
        if let Some(gender) = gender {
            query.push(" AND gender = ");
            query.push_bind(gender.to_string());
        }
        query.push(" ORDER BY position ASC, created_at DESC");

        let rows: Vec<ProductRow> = query.build_query_as().fetch_all(self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Search products whose name matches any of the given patterns
    /// (case-insensitive), capped at 20 results.
    ///
    /// Callers build patterns with [`search_patterns`]; an empty slice
    /// returns no rows without touching the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, patterns: &[String]) -> Result<Vec<Product>, RepositoryError> {
        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products \
             WHERE name ILIKE ANY($1) \
             ORDER BY position ASC, created_at DESC \
             LIMIT $2"
        ))
        .bind(patterns)
        .bind(SEARCH_LIMIT)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO store.products \
             (name, description, price, image, category, gender, specs, product_type, flavor_notes, position) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product.name)
        .bind(product.description)
        .bind(product.price)
        .bind(product.image)
        .bind(product.category)
        .bind(product.gender.to_string())
        .bind(product.specs)
        .bind(product.product_type)
        .bind(product.flavor_notes)
        .bind(product.position)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Apply a partial update to a product.
    ///
    /// Returns `None` if the product doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE store.products SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 price = COALESCE($4, price), \
                 image = COALESCE($5, image), \
                 category = COALESCE($6, category), \
                 gender = COALESCE($7, gender), \
                 specs = COALESCE($8, specs), \
                 product_type = COALESCE($9, product_type), \
                 flavor_notes = COALESCE($10, flavor_notes), \
                 position = COALESCE($11, position), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.price)
        .bind(patch.image)
        .bind(patch.category)
        .bind(patch.gender.map(|g| g.to_string()))
        .bind(patch.specs)
        .bind(patch.product_type)
        .bind(patch.flavor_notes)
        .bind(patch.position)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Delete a product.
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    /// Cart lines referencing it are removed by cascade; order lines keep
    /// their snapshot price with the reference nulled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM store.products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_patterns_splits_and_lowercases() {
        assert_eq!(
            search_patterns("Rolex  Dial"),
            vec!["%rolex%".to_string(), "%dial%".to_string()]
        );
    }

    #[test]
    fn test_search_patterns_empty_query() {
        assert!(search_patterns("").is_empty());
        assert!(search_patterns("   \t ").is_empty());
    }

    #[test]
    fn test_search_patterns_escapes_like_metacharacters() {
        assert_eq!(search_patterns("50%"), vec!["%50\\%%".to_string()]);
        assert_eq!(search_patterns("a_b"), vec!["%a\\_b%".to_string()]);
        assert_eq!(search_patterns("a\\b"), vec!["%a\\\\b%".to_string()]);
    }
}

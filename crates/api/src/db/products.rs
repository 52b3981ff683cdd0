//! Product repository and stock adjustments.
//!
//! Catalog reads and writes go through [`ProductRepository`]. The stock
//! functions take a `PgConnection` so they run inside the caller's
//! transaction; see `services::orders`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use salesdesk_core::ProductId;

use super::{RepositoryError, map_write_error};
use crate::models::{NewProduct, Product, ProductPatch};

const PRODUCT_COLUMNS: &str = "id, name, stock, price, created_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    stock: i32,
    price: Decimal,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            stock: row.stock,
            price: row.price,
            created_at: row.created_at,
        }
    }
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

    /// List every product, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Get several products at once (for batched loading).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Full-text search over product names, best matches first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, text: &str, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE to_tsvector('simple', name) @@ plainto_tsquery('simple', $1)
            ORDER BY ts_rank(to_tsvector('simple', name), plainto_tsquery('simple', $1)) DESC,
                     name
            LIMIT $2
            "
        ))
        .bind(text)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is already taken.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO products (name, stock, price)
            VALUES ($1, $2, $3)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&product.name)
        .bind(product.stock)
        .bind(product.price)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "product name already exists", "invalid reference"))?;

        Ok(row.into())
    }

    /// Apply a partial update. Returns `None` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new name is already taken.
    pub async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE products
            SET name = COALESCE($2, name),
                stock = COALESCE($3, stock),
                price = COALESCE($4, price)
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.stock)
        .bind(patch.price)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, "product name already exists", "invalid reference"))?;

        Ok(row.map(Product::from))
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if an order still references it.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                map_write_error(e, "invalid reference", "product is referenced by existing orders")
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Name and price of a product whose stock was just reserved.
#[derive(Debug, sqlx::FromRow)]
pub struct ReservedStock {
    pub name: String,
    pub price: Decimal,
}

/// Current stock and price of a product.
#[derive(Debug, sqlx::FromRow)]
pub struct StockLevel {
    pub name: String,
    pub stock: i32,
    pub price: Decimal,
}

/// Lock the stock rows of `ids` in id order until the transaction ends.
///
/// Writers that touch several products take this first, so every transaction
/// acquires product locks in the same order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_stock(
    conn: &mut PgConnection,
    ids: &[ProductId],
) -> Result<(), RepositoryError> {
    let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

    sqlx::query("SELECT id FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE")
        .bind(&ids)
        .fetch_all(conn)
        .await?;

    Ok(())
}

/// Decrement stock if at least `quantity` units are available.
///
/// The check and the write are a single statement, so concurrent callers
/// cannot both succeed against the same units. Returns `None` when the
/// product is missing or short on stock.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn take_stock(
    conn: &mut PgConnection,
    id: ProductId,
    quantity: i32,
) -> Result<Option<ReservedStock>, RepositoryError> {
    let row = sqlx::query_as::<_, ReservedStock>(
        r"
        UPDATE products
        SET stock = stock - $2
        WHERE id = $1 AND stock >= $2
        RETURNING name, price
        ",
    )
    .bind(id)
    .bind(quantity)
    .fetch_optional(conn)
    .await?;

    Ok(row)
}

/// Give `quantity` units back to a product.
///
/// Products that no longer exist are skipped.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn return_stock(
    conn: &mut PgConnection,
    id: ProductId,
    quantity: i32,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE products SET stock = stock + $2 WHERE id = $1")
        .bind(id)
        .bind(quantity)
        .execute(conn)
        .await?;

    Ok(())
}

/// Read the current stock and price of a product inside a transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn stock_level(
    conn: &mut PgConnection,
    id: ProductId,
) -> Result<Option<StockLevel>, RepositoryError> {
    let row = sqlx::query_as::<_, StockLevel>("SELECT name, stock, price FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(row)
}

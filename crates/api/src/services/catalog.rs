//! Product catalog.
//!
//! Products are shared by every seller: any signed-in caller may read or
//! change them.

use rust_decimal::Decimal;
use sqlx::PgPool;

use salesdesk_core::ProductId;

use super::{optional_text, required_text};
use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::{MAX_AMOUNT, NewProduct, Product, ProductPatch};

/// Maximum number of search results.
pub const SEARCH_LIMIT: i64 = 10;

/// Product CRUD and search.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// Every product, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>> {
        Ok(self.products.list().await?)
    }

    /// Get a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist.
    pub async fn get(&self, id: ProductId) -> Result<Product> {
        self.products
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a blank name or negative stock/price.
    /// Returns `AppError::Database` (code `CONFLICT`) if the name is taken.
    pub async fn create(&self, product: NewProduct) -> Result<Product> {
        let product = NewProduct {
            name: required_text(&product.name, "name")?,
            stock: validate_stock(product.stock)?,
            price: validate_price(product.price)?,
        };

        let created = self.products.create(&product).await?;
        tracing::info!(product_id = %created.id, name = %created.name, "Product created");
        Ok(created)
    }

    /// Change some fields of a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist.
    /// Returns `AppError::BadRequest` for invalid values.
    pub async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product> {
        let patch = ProductPatch {
            name: optional_text(patch.name.as_deref(), "name")?,
            stock: patch.stock.map(validate_stock).transpose()?,
            price: patch.price.map(validate_price).transpose()?,
        };

        let updated = self
            .products
            .update(id, &patch)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(product_id = %id, "Product updated");
        Ok(updated)
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist.
    /// Returns `AppError::Database` (code `CONFLICT`) if an order references it.
    pub async fn delete(&self, id: ProductId) -> Result<()> {
        self.products.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => not_found(id),
            other => other.into(),
        })?;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Full-text search over product names. Blank text matches nothing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn search(&self, text: &str) -> Result<Vec<Product>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.products.search(text, SEARCH_LIMIT).await?)
    }
}

fn not_found(id: ProductId) -> AppError {
    AppError::NotFound(format!("product {id} not found"))
}

fn validate_stock(stock: i32) -> Result<i32> {
    if stock < 0 {
        return Err(AppError::BadRequest(format!(
            "stock must not be negative (got {stock})"
        )));
    }
    Ok(stock)
}

fn validate_price(price: Decimal) -> Result<Decimal> {
    if price < Decimal::ZERO {
        return Err(AppError::BadRequest(format!(
            "price must not be negative (got {price})"
        )));
    }
    let price = price.round_dp(2);
    if price > MAX_AMOUNT {
        return Err(AppError::BadRequest(format!(
            "price must not exceed {MAX_AMOUNT} (got {price})"
        )));
    }
    Ok(price)
}

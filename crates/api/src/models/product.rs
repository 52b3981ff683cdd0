//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use salesdesk_core::ProductId;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    /// Unique, trimmed product name.
    pub name: String,
    /// Units available for new orders.
    pub stock: i32,
    /// Unit price.
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Data for a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub stock: i32,
    pub price: Decimal,
}

/// Partial update of a product. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub stock: Option<i32>,
    pub price: Option<Decimal>,
}

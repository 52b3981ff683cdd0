//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Seller registration, password sign-in, bearer tokens
//! - `access` - Ownership checks for clients and orders
//! - `catalog` - Product CRUD and search
//! - `clients` - Client CRUD scoped to the owning seller
//! - `orders` - Order placement, update and deletion with stock adjustment
//! - `reports` - Client and seller leaderboards

pub mod access;
pub mod auth;
pub mod catalog;
pub mod clients;
pub mod orders;
pub mod reports;

pub use access::ensure_owner;
pub use auth::AuthService;
pub use catalog::CatalogService;
pub use clients::ClientService;
pub use orders::OrderService;
pub use reports::ReportService;

use crate::error::{AppError, Result};

/// Trim a required text field, rejecting blank values.
pub(crate) fn required_text(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(value.to_owned())
}

/// Trim an optional text field; `None` stays `None`.
pub(crate) fn optional_text(value: Option<&str>, field: &str) -> Result<Option<String>> {
    value.map(|v| required_text(v, field)).transpose()
}

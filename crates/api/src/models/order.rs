//! Order domain types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use salesdesk_core::{ClientId, OrderId, OrderStatus, ProductId, UserId};

use super::MAX_AMOUNT;

/// An order placed by a seller for one of their clients.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    /// Seller who owns the order.
    pub seller_id: UserId,
    pub client_id: ClientId,
    /// Line items, ordered by product ID.
    pub items: Vec<LineItem>,
    /// Sum of `unit_price * quantity` over the items.
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A reserved line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: i32,
    /// Product price when the stock was reserved.
    pub unit_price: Decimal,
}

impl LineItem {
    /// Price of this line.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A requested (not yet reserved) line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItemRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

impl From<&LineItem> for LineItemRequest {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

/// Data for a new order. The seller is always the caller.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub client_id: ClientId,
    pub items: Vec<LineItemRequest>,
    /// Defaults to `PENDING`.
    pub status: Option<OrderStatus>,
}

/// Partial update of an order. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub client_id: Option<ClientId>,
    /// Replaces every line item when present.
    pub items: Option<Vec<LineItemRequest>>,
    pub status: Option<OrderStatus>,
}

/// Why a set of requested line items was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineItemError {
    #[error("an order needs at least one line item")]
    Empty,
    #[error("quantity for product {product_id} must be positive (got {quantity})")]
    NonPositiveQuantity { product_id: ProductId, quantity: i32 },
    #[error("quantity for product {0} is too large")]
    Overflow(ProductId),
    #[error("order total exceeds the maximum of {}", MAX_AMOUNT)]
    TotalTooLarge,
}

/// Validate requested line items and merge duplicates by product.
///
/// The result is sorted by product ID so stock rows are always locked in the
/// same order.
///
/// # Errors
///
/// Returns `LineItemError` for an empty list, a non-positive quantity, or a
/// merged quantity that overflows `i32`.
pub fn merge_line_items(requests: &[LineItemRequest]) -> Result<Vec<LineItemRequest>, LineItemError> {
    if requests.is_empty() {
        return Err(LineItemError::Empty);
    }

    let mut merged: BTreeMap<ProductId, i32> = BTreeMap::new();
    for request in requests {
        if request.quantity <= 0 {
            return Err(LineItemError::NonPositiveQuantity {
                product_id: request.product_id,
                quantity: request.quantity,
            });
        }
        let entry = merged.entry(request.product_id).or_insert(0);
        *entry = entry
            .checked_add(request.quantity)
            .ok_or(LineItemError::Overflow(request.product_id))?;
    }

    Ok(merged
        .into_iter()
        .map(|(product_id, quantity)| LineItemRequest {
            product_id,
            quantity,
        })
        .collect())
}

/// Total of a set of reserved line items.
///
/// # Errors
///
/// Returns `LineItemError::TotalTooLarge` if the total does not fit in
/// [`MAX_AMOUNT`].
pub fn order_total(items: &[LineItem]) -> Result<Decimal, LineItemError> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| {
            item.unit_price
                .checked_mul(Decimal::from(item.quantity))
                .and_then(|subtotal| total.checked_add(subtotal))
        })
        .filter(|total| *total <= MAX_AMOUNT)
        .ok_or(LineItemError::TotalTooLarge)
}

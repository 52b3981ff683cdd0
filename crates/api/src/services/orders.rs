//! Orders and the stock they hold.
//!
//! Every write runs in one transaction. Stock is taken with a conditional
//! decrement per product, in product-id order, so a failed reservation rolls
//! back every unit taken before it and concurrent orders cannot oversell.
//! An order holds stock unless it is `CANCELLED`.
//!
//! Lock order within a transaction is the order row, then the client row,
//! then product rows by ascending id.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use salesdesk_core::{ClientId, OrderId, OrderStatus, ProductId, UserId};

use super::clients::not_found as client_not_found;
use super::ensure_owner;
use crate::db::RepositoryError;
use crate::db::clients;
use crate::db::orders::{self, OrderRepository};
use crate::db::products;
use crate::error::{AppError, Result};
use crate::models::order::{merge_line_items, order_total};
use crate::models::{LineItem, LineItemRequest, NewOrder, Order, OrderPatch};

/// Order placement, update and deletion.
pub struct OrderService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every order of every seller.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>> {
        Ok(OrderRepository::new(self.pool).list_all().await?)
    }

    /// The orders owned by `seller`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_for_seller(&self, seller: UserId) -> Result<Vec<Order>> {
        Ok(OrderRepository::new(self.pool).list_by_seller(seller).await?)
    }

    /// The orders owned by `seller` in `status`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_by_status(&self, seller: UserId, status: OrderStatus) -> Result<Vec<Order>> {
        Ok(OrderRepository::new(self.pool)
            .list_by_seller_and_status(seller, status)
            .await?)
    }

    /// Get an order owned by `seller`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the order does not exist.
    /// Returns `AppError::Forbidden` if another seller owns it.
    pub async fn get(&self, seller: UserId, id: OrderId) -> Result<Order> {
        let order = OrderRepository::new(self.pool)
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        ensure_owner(order.seller_id, seller, "order")?;
        Ok(order)
    }

    /// Place an order for one of `seller`'s clients, reserving its stock.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for empty or non-positive line items.
    /// Returns `AppError::NotFound` if the client or a product does not exist.
    /// Returns `AppError::Forbidden` if another seller owns the client.
    /// Returns `AppError::InsufficientStock` if any product is short; no stock
    /// is taken in that case.
    pub async fn place(&self, seller: UserId, order: NewOrder) -> Result<Order> {
        let requested = merge_line_items(&order.items)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let status = order.status.unwrap_or_default();
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        ensure_client_owner(&mut tx, seller, order.client_id).await?;

        let items = if status.holds_stock() {
            reserve(&mut tx, &requested).await?
        } else {
            price_items(&mut tx, &requested).await?
        };
        let total = checked_total(&items)?;
        let placed = orders::insert(&mut tx, seller, order.client_id, status, &items, total).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            order_id = %placed.id,
            seller_id = %seller,
            client_id = %placed.client_id,
            total = %placed.total,
            "Order placed"
        );
        Ok(placed)
    }

    /// Update an order owned by `seller`.
    ///
    /// Stock held by the old line items is returned before the new ones are
    /// reserved, so replacing an item with a larger quantity of the same
    /// product only needs the difference to be in stock. Cancelling returns
    /// the stock; reactivating a cancelled order takes it again.
    ///
    /// # Errors
    ///
    /// Same as [`Self::place`], plus `AppError::NotFound`/`Forbidden` for the
    /// order itself.
    pub async fn update(&self, seller: UserId, id: OrderId, patch: OrderPatch) -> Result<Order> {
        let requested = patch
            .items
            .as_deref()
            .map(merge_line_items)
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let existing = orders::lock_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| not_found(id))?;
        ensure_owner(existing.seller_id, seller, "order")?;

        let client_id = match patch.client_id {
            Some(client_id) if client_id != existing.client_id => {
                ensure_client_owner(&mut tx, seller, client_id).await?;
                client_id
            }
            _ => existing.client_id,
        };

        let status = patch.status.unwrap_or(existing.status);
        let held_before = existing.status.holds_stock();
        let held_after = status.holds_stock();

        let mut touched: Vec<ProductId> = existing.items.iter().map(|i| i.product_id).collect();
        if let Some(requested) = &requested {
            touched.extend(requested.iter().map(|r| r.product_id));
        }
        touched.sort_unstable();
        touched.dedup();
        products::lock_stock(&mut tx, &touched).await?;

        if held_before && (requested.is_some() || !held_after) {
            release(&mut tx, &existing.items).await?;
        }

        let items = match (&requested, held_after) {
            (Some(requested), true) => reserve(&mut tx, requested).await?,
            (Some(requested), false) => price_items(&mut tx, requested).await?,
            (None, true) if !held_before => {
                let again: Vec<LineItemRequest> =
                    existing.items.iter().map(LineItemRequest::from).collect();
                reserve(&mut tx, &again).await?;
                existing.items.clone()
            }
            (None, _) => existing.items.clone(),
        };

        if requested.is_some() {
            orders::replace_items(&mut tx, id, &items).await?;
        }
        let total = checked_total(&items)?;
        let updated = orders::update_header(&mut tx, id, client_id, status, total).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            order_id = %id,
            seller_id = %seller,
            from = %existing.status,
            to = %status,
            "Order updated"
        );
        Ok(updated)
    }

    /// Delete an order owned by `seller`.
    ///
    /// A `PENDING` order gives its stock back; completed and cancelled
    /// orders do not.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` or `AppError::Forbidden` as for [`Self::get`].
    pub async fn delete(&self, seller: UserId, id: OrderId) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let existing = orders::lock_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| not_found(id))?;
        ensure_owner(existing.seller_id, seller, "order")?;

        if existing.status == OrderStatus::Pending {
            release(&mut tx, &existing.items).await?;
        }
        orders::delete(&mut tx, id).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(order_id = %id, seller_id = %seller, "Order deleted");
        Ok(())
    }
}

fn not_found(id: OrderId) -> AppError {
    AppError::NotFound(format!("order {id} not found"))
}

/// Check `seller` owns the client on the transaction's own connection.
async fn ensure_client_owner(
    conn: &mut PgConnection,
    seller: UserId,
    client_id: ClientId,
) -> Result<()> {
    let owner = clients::seller_of(conn, client_id)
        .await?
        .ok_or_else(|| client_not_found(client_id))?;
    ensure_owner(owner, seller, "client")
}

fn checked_total(items: &[LineItem]) -> Result<Decimal> {
    order_total(items).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Take stock for every requested item, capturing the unit price.
async fn reserve(conn: &mut PgConnection, requested: &[LineItemRequest]) -> Result<Vec<LineItem>> {
    let mut items = Vec::with_capacity(requested.len());

    for request in requested {
        let Some(reserved) = products::take_stock(conn, request.product_id, request.quantity).await?
        else {
            return Err(shortfall(conn, request).await?);
        };

        items.push(LineItem {
            product_id: request.product_id,
            quantity: request.quantity,
            unit_price: reserved.price,
        });
    }

    Ok(items)
}

/// Explain why a reservation failed.
async fn shortfall(conn: &mut PgConnection, request: &LineItemRequest) -> Result<AppError> {
    let level = products::stock_level(conn, request.product_id).await?;

    Ok(level.map_or_else(
        || AppError::NotFound(format!("product {} not found", request.product_id)),
        |level| {
            tracing::warn!(
                product_id = %request.product_id,
                requested = request.quantity,
                available = level.stock,
                "Insufficient stock"
            );
            AppError::InsufficientStock(format!(
                "product '{}' exceeds available quantity (requested {}, available {})",
                level.name, request.quantity, level.stock
            ))
        },
    ))
}

/// Price items without touching stock (for orders that hold none).
async fn price_items(
    conn: &mut PgConnection,
    requested: &[LineItemRequest],
) -> Result<Vec<LineItem>> {
    let mut items = Vec::with_capacity(requested.len());

    for request in requested {
        let level = products::stock_level(conn, request.product_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("product {} not found", request.product_id))
            })?;

        items.push(LineItem {
            product_id: request.product_id,
            quantity: request.quantity,
            unit_price: level.price,
        });
    }

    Ok(items)
}

/// Give the stock held by `items` back.
async fn release(conn: &mut PgConnection, items: &[LineItem]) -> Result<()> {
    for item in items {
        products::return_stock(conn, item.product_id, item.quantity).await?;
    }
    Ok(())
}

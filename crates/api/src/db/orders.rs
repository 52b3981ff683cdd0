//! Order repository for database operations.
//!
//! Reads go through [`OrderRepository`]. Writes are free functions over a
//! `PgConnection` because they always run inside the order service's
//! transaction together with stock adjustments.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use salesdesk_core::{ClientId, OrderId, OrderStatus, ProductId, UserId};

use super::{RepositoryError, map_write_error};
use crate::models::{LineItem, Order};

const ORDER_COLUMNS: &str = "id, seller_id, client_id, total, status, created_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    seller_id: UserId,
    client_id: ClientId,
    total: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct LineItemRow {
    order_id: OrderId,
    product_id: ProductId,
    quantity: i32,
    unit_price: Decimal,
}

impl OrderRow {
    fn into_order(self, items: Vec<LineItem>) -> Order {
        Order {
            id: self.id,
            seller_id: self.seller_id,
            client_id: self.client_id,
            items,
            total: self.total,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

impl From<LineItemRow> for LineItem {
    fn from(row: LineItemRow) -> Self {
        Self {
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

/// Repository for reading orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.with_items(rows).await
    }

    /// List the orders owned by one seller, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_seller(&self, seller_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE seller_id = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(seller_id)
        .fetch_all(self.pool)
        .await?;

        self.with_items(rows).await
    }

    /// List one seller's orders in a given status, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_seller_and_status(
        &self,
        seller_id: UserId,
        status: OrderStatus,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE seller_id = $1 AND status = $2
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(seller_id)
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        self.with_items(rows).await
    }

    /// Get an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.with_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Load the line items of all `rows` with one query.
    async fn with_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<OrderId> = rows.iter().map(|r| r.id).collect();
        let item_rows = sqlx::query_as::<_, LineItemRow>(
            r"
            SELECT order_id, product_id, quantity, unit_price
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, product_id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut items_by_order: HashMap<OrderId, Vec<LineItem>> = HashMap::new();
        for item in item_rows {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(item.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }
}

/// Load an order and lock its row until the transaction ends.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_for_update(
    conn: &mut PgConnection,
    id: OrderId,
) -> Result<Option<Order>, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, LineItemRow>(
        r"
        SELECT order_id, product_id, quantity, unit_price
        FROM order_items
        WHERE order_id = $1
        ORDER BY product_id
        ",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(
        row.into_order(items.into_iter().map(LineItem::from).collect()),
    ))
}

/// Insert an order and its line items.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the client or a product vanished.
pub async fn insert(
    conn: &mut PgConnection,
    seller_id: UserId,
    client_id: ClientId,
    status: OrderStatus,
    items: &[LineItem],
    total: Decimal,
) -> Result<Order, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        r"
        INSERT INTO orders (seller_id, client_id, total, status)
        VALUES ($1, $2, $3, $4)
        RETURNING {ORDER_COLUMNS}
        "
    ))
    .bind(seller_id)
    .bind(client_id)
    .bind(total)
    .bind(status)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "order already exists", "client no longer exists"))?;

    insert_items(conn, row.id, items).await?;

    Ok(row.into_order(items.to_vec()))
}

/// Replace every line item of an order.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if a product vanished.
pub async fn replace_items(
    conn: &mut PgConnection,
    order_id: OrderId,
    items: &[LineItem],
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;

    insert_items(conn, order_id, items).await
}

async fn insert_items(
    conn: &mut PgConnection,
    order_id: OrderId,
    items: &[LineItem],
) -> Result<(), RepositoryError> {
    let product_ids: Vec<ProductId> = items.iter().map(|i| i.product_id).collect();
    let quantities: Vec<i32> = items.iter().map(|i| i.quantity).collect();
    let prices: Vec<Decimal> = items.iter().map(|i| i.unit_price).collect();

    sqlx::query(
        r"
        INSERT INTO order_items (order_id, product_id, quantity, unit_price)
        SELECT $1, product_id, quantity, unit_price
        FROM UNNEST($2::int4[], $3::int4[], $4::numeric[])
             AS item(product_id, quantity, unit_price)
        ",
    )
    .bind(order_id)
    .bind(&product_ids)
    .bind(&quantities)
    .bind(&prices)
    .execute(conn)
    .await
    .map_err(|e| map_write_error(e, "duplicate line item", "product no longer exists"))?;

    Ok(())
}

/// Overwrite an order's client, status and total.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the client vanished.
pub async fn update_header(
    conn: &mut PgConnection,
    id: OrderId,
    client_id: ClientId,
    status: OrderStatus,
    total: Decimal,
) -> Result<Order, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        r"
        UPDATE orders
        SET client_id = $2, status = $3, total = $4
        WHERE id = $1
        RETURNING {ORDER_COLUMNS}
        "
    ))
    .bind(id)
    .bind(client_id)
    .bind(status)
    .bind(total)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "order already exists", "client no longer exists"))?
    .ok_or(RepositoryError::NotFound)?;

    let items = sqlx::query_as::<_, LineItemRow>(
        r"
        SELECT order_id, product_id, quantity, unit_price
        FROM order_items
        WHERE order_id = $1
        ORDER BY product_id
        ",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(row.into_order(items.into_iter().map(LineItem::from).collect()))
}

/// Delete an order (line items cascade).
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order does not exist.
pub async fn delete(conn: &mut PgConnection, id: OrderId) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

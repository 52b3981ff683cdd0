//! Leaderboard aggregations over completed orders.

use rust_decimal::Decimal;
use sqlx::PgPool;

use salesdesk_core::OrderStatus;

use super::RepositoryError;
use super::clients::{CLIENT_COLUMNS, ClientRow};
use super::users::{USER_COLUMNS, UserRow};
use crate::models::{Client, TopClient, TopSeller, User};

#[derive(sqlx::FromRow)]
struct TopClientRow {
    #[sqlx(flatten)]
    client: ClientRow,
    total: Decimal,
}

#[derive(sqlx::FromRow)]
struct TopSellerRow {
    #[sqlx(flatten)]
    seller: UserRow,
    total: Decimal,
}

/// Repository for reporting queries.
pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Clients ranked by the summed total of their completed orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_clients(&self, limit: i64) -> Result<Vec<TopClient>, RepositoryError> {
        let rows = sqlx::query_as::<_, TopClientRow>(&format!(
            r"
            WITH totals AS (
                SELECT client_id, SUM(total) AS total
                FROM orders
                WHERE status = $1
                GROUP BY client_id
            )
            SELECT {CLIENT_COLUMNS}, totals.total
            FROM totals
            JOIN clients ON clients.id = totals.client_id
            ORDER BY totals.total DESC, clients.id
            LIMIT $2
            "
        ))
        .bind(OrderStatus::Completed)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(TopClient {
                    client: Client::try_from(row.client)?,
                    total: row.total,
                })
            })
            .collect()
    }

    /// Sellers ranked by the summed total of their completed orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_sellers(&self, limit: i64) -> Result<Vec<TopSeller>, RepositoryError> {
        let rows = sqlx::query_as::<_, TopSellerRow>(&format!(
            r"
            WITH totals AS (
                SELECT seller_id, SUM(total) AS total
                FROM orders
                WHERE status = $1
                GROUP BY seller_id
            )
            SELECT {USER_COLUMNS}, totals.total
            FROM totals
            JOIN users ON users.id = totals.seller_id
            ORDER BY totals.total DESC, users.id
            LIMIT $2
            "
        ))
        .bind(OrderStatus::Completed)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(TopSeller {
                    seller: User::try_from(row.seller)?,
                    total: row.total,
                })
            })
            .collect()
    }
}

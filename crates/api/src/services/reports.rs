//! Leaderboards.

use sqlx::PgPool;

use crate::db::reports::ReportRepository;
use crate::error::Result;
use crate::models::{TopClient, TopSeller};

/// Number of clients on the client leaderboard.
pub const TOP_CLIENTS_LIMIT: i64 = 10;

/// Number of sellers on the seller leaderboard.
pub const TOP_SELLERS_LIMIT: i64 = 3;

/// Ranks clients and sellers by completed order totals.
pub struct ReportService<'a> {
    reports: ReportRepository<'a>,
}

impl<'a> ReportService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            reports: ReportRepository::new(pool),
        }
    }

    /// Clients with the highest completed order totals, highest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn top_clients(&self) -> Result<Vec<TopClient>> {
        Ok(self.reports.top_clients(TOP_CLIENTS_LIMIT).await?)
    }

    /// Sellers with the highest completed order totals, highest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn top_sellers(&self) -> Result<Vec<TopSeller>> {
        Ok(self.reports.top_sellers(TOP_SELLERS_LIMIT).await?)
    }
}

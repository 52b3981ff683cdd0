//! Leaderboard rows.

use rust_decimal::Decimal;

use super::{Client, User};

/// A client ranked by the total of their completed orders.
#[derive(Debug, Clone)]
pub struct TopClient {
    pub client: Client,
    pub total: Decimal,
}

/// A seller ranked by the total of their completed orders.
#[derive(Debug, Clone)]
pub struct TopSeller {
    pub seller: User,
    pub total: Decimal,
}

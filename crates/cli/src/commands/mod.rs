//! CLI command implementations.

pub mod migrate;
pub mod token;
pub mod user;

use salesdesk_api::config::ApiConfig;
use sqlx::PgPool;

/// Load the API configuration and connect to its database.
pub async fn connect() -> Result<(ApiConfig, PgPool), Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = salesdesk_api::db::create_pool(&config.database_url).await?;

    Ok((config, pool))
}

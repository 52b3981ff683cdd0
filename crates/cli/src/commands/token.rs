//! Bearer token commands.
//!
//! Issues a token without a password, for operators and local testing.
//! Requires the same `API_TOKEN_SECRET` as the running server.

use salesdesk_api::db::users::UserRepository;
use salesdesk_api::services::auth::issue_token;
use salesdesk_core::Email;
use thiserror::Error;

use super::connect;

#[derive(Debug, Error)]
pub enum TokenCommandError {
    #[error("No seller with email: {0}")]
    UnknownUser(String),
}

/// Issue a token for the seller with the given email.
pub async fn issue(email: &str) -> Result<String, Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let (config, pool) = connect().await?;

    let user = UserRepository::new(&pool)
        .get_by_email(&email)
        .await?
        .ok_or_else(|| TokenCommandError::UnknownUser(email.to_string()))?;

    let token = issue_token(&user, &config.token)?;
    tracing::info!("Issued token for seller {}", user.id);

    Ok(token)
}

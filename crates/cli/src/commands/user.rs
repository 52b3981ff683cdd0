//! Seller account commands.
//!
//! # Usage
//!
//! ```bash
//! sd-cli user create -e ana@example.com -n Ana -s Lopez --password 's3cret-pass'
//! SALESDESK_USER_PASSWORD='s3cret-pass' sd-cli user create -e ana@example.com -n Ana -s Lopez
//! ```

use salesdesk_api::models::NewUser;
use salesdesk_api::services::AuthService;
use salesdesk_core::UserId;

use super::connect;

/// Create a seller account with the same validation as `createUser`.
///
/// # Returns
///
/// The ID of the created seller.
pub async fn create(
    email: &str,
    name: &str,
    surname: &str,
    password: &str,
) -> Result<UserId, Box<dyn std::error::Error>> {
    let (config, pool) = connect().await?;

    tracing::info!("Creating seller: {}", email);

    let new_user = NewUser {
        name: name.to_owned(),
        surname: surname.to_owned(),
        email: email.to_owned(),
        password: password.to_owned(),
    };
    let user = AuthService::new(&pool, &config.token)
        .register(&new_user)
        .await?;

    tracing::info!("Seller created successfully! ID: {}, Email: {}", user.id, user.email);
    Ok(user.id)
}

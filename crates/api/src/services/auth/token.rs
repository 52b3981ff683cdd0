//! Signed bearer tokens (HS256 JWT).

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use salesdesk_core::UserId;

use crate::config::TokenConfig;
use crate::models::User;

/// Errors from issuing or verifying a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token was valid once but its `exp` has passed.
    #[error("token expired")]
    Expired,

    /// Bad signature, malformed token, or wrong algorithm.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

/// Identity embedded in a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub surname: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
}

/// Issue a token for `user` that expires after the configured TTL.
///
/// # Errors
///
/// Returns `TokenError::Encode` if signing fails.
pub fn issue_token(user: &User, config: &TokenConfig) -> Result<String, TokenError> {
    issue_token_at(user, config, Utc::now())
}

/// Issue a token as if the current time were `now`.
///
/// # Errors
///
/// Returns `TokenError::Encode` if signing fails.
pub fn issue_token_at(
    user: &User,
    config: &TokenConfig,
    now: DateTime<Utc>,
) -> Result<String, TokenError> {
    let iat = now.timestamp();
    let ttl = i64::try_from(config.ttl.as_secs()).unwrap_or(i64::MAX);

    let claims = Claims {
        id: user.id,
        email: user.email.as_str().to_owned(),
        name: user.name.clone(),
        surname: user.surname.clone(),
        iat,
        exp: iat.saturating_add(ttl),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.expose_secret().as_bytes()),
    )
    .map_err(TokenError::Encode)
}

/// Verify a token's signature and expiry and return its claims.
///
/// # Errors
///
/// Returns `TokenError::Expired` for an expired token and
/// `TokenError::Invalid` for anything else that fails validation.
pub fn verify_token(token: &str, secret: &SecretString) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(e),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use salesdesk_core::Email;

    use super::*;

    fn config(secret: &str) -> TokenConfig {
        TokenConfig {
            secret: SecretString::from(secret.to_owned()),
            ttl: Duration::from_secs(24 * 3600),
        }
    }

    fn user() -> User {
        User {
            id: UserId::new(7),
            name: "Ana".to_owned(),
            surname: "Lopez".to_owned(),
            email: Email::parse("ana@example.com").unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_round_trip_embeds_identity() {
        let config = config("k3y-for-unit-tests-0123456789-abcdef");
        let token = issue_token(&user(), &config).unwrap();

        let claims = verify_token(&token, &config.secret).unwrap();
        assert_eq!(claims.id, UserId::new(7));
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.name, "Ana");
        assert_eq!(claims.surname, "Lopez");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = issue_token(&user(), &config("k3y-for-unit-tests-0123456789-abcdef")).unwrap();
        let other = SecretString::from("another-k3y-for-unit-tests-98765432".to_owned());

        assert!(matches!(
            verify_token(&token, &other),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let config = config("k3y-for-unit-tests-0123456789-abcdef");
        let issued = Utc::now() - chrono::Duration::days(2);
        let token = issue_token_at(&user(), &config, issued).unwrap();

        assert!(matches!(
            verify_token(&token, &config.secret),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let config = config("k3y-for-unit-tests-0123456789-abcdef");
        let token = issue_token(&user(), &config).unwrap();

        // Swap the payload for one claiming a different user.
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = issue_token(
            &User {
                id: UserId::new(8),
                ..user()
            },
            &config,
        )
        .unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap().to_owned();
        parts[1] = &forged_payload;
        let tampered = parts.join(".");

        assert!(matches!(
            verify_token(&tampered, &config.secret),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let secret = SecretString::from("k3y-for-unit-tests-0123456789-abcdef".to_owned());
        assert!(matches!(
            verify_token("not-a-token", &secret),
            Err(TokenError::Invalid(_))
        ));
    }
}

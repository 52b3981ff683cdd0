//! Bearer token authentication.
//!
//! The GraphQL handler extracts an [`OptionalViewer`] and attaches the
//! viewer, if any, to the GraphQL request. A missing, malformed, expired or
//! forged token never fails the HTTP request; gated resolvers reject it
//! with `UNAUTHENTICATED` instead.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use secrecy::SecretString;

use salesdesk_core::UserId;

use crate::error::set_sentry_user;
use crate::services::auth::{Claims, verify_token};
use crate::state::AppState;

/// The signed-in seller making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub surname: String,
}

impl From<Claims> for Viewer {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
            name: claims.name,
            surname: claims.surname,
        }
    }
}

/// Pull the token out of an `Authorization` header value.
///
/// Accepts `Bearer <token>` with any casing of the scheme, and a bare token.
/// Any other scheme yields `None`.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();

    let token = match header.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return None,
        None => header,
    };

    (!token.is_empty()).then_some(token)
}

/// Resolve the viewer from request headers.
#[must_use]
pub fn viewer_from_headers(headers: &HeaderMap, secret: &SecretString) -> Option<Viewer> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)?;

    match verify_token(token, secret) {
        Ok(claims) => Some(claims.into()),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring bearer token");
            None
        }
    }
}

/// Extractor that optionally identifies the caller from its bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalViewer(viewer): OptionalViewer) -> impl IntoResponse {
///     match viewer {
///         Some(v) => format!("Hello, {}!", v.name),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalViewer(pub Option<Viewer>);

impl FromRequestParts<AppState> for OptionalViewer {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let viewer = viewer_from_headers(&parts.headers, &state.config().token.secret);

        if let Some(viewer) = &viewer {
            tracing::Span::current().record("user_id", viewer.id.as_i32());
            set_sentry_user(&viewer.id, Some(&viewer.email));
        }

        Ok(Self(viewer))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::http::HeaderValue;
    use chrono::Utc;

    use salesdesk_core::Email;

    use super::*;
    use crate::config::TokenConfig;
    use crate::models::User;
    use crate::services::auth::issue_token;
    use crate::services::auth::token::issue_token_at;

    fn tokens() -> TokenConfig {
        TokenConfig {
            secret: SecretString::from("k3y-for-unit-tests-0123456789-abcdef".to_owned()),
            ttl: Duration::from_secs(3600),
        }
    }

    fn user() -> User {
        User {
            id: UserId::new(5),
            name: "Ana".to_owned(),
            surname: "Lopez".to_owned(),
            email: Email::parse("ana@example.com").unwrap(),
            created_at: Utc::now(),
        }
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer   abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER abc"), Some("abc"));
        assert_eq!(bearer_token("abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("   "), None);
    }

    #[test]
    fn test_valid_token_yields_viewer() {
        let tokens = tokens();
        let token = issue_token(&user(), &tokens).unwrap();

        let viewer = viewer_from_headers(&headers(&format!("Bearer {token}")), &tokens.secret);
        assert_eq!(
            viewer,
            Some(Viewer {
                id: UserId::new(5),
                email: "ana@example.com".to_owned(),
                name: "Ana".to_owned(),
                surname: "Lopez".to_owned(),
            })
        );
    }

    #[test]
    fn test_bare_token_is_accepted() {
        let tokens = tokens();
        let token = issue_token(&user(), &tokens).unwrap();

        assert!(viewer_from_headers(&headers(&token), &tokens.secret).is_some());
    }

    #[test]
    fn test_bad_tokens_yield_no_viewer() {
        let tokens = tokens();
        let expired =
            issue_token_at(&user(), &tokens, Utc::now() - chrono::Duration::hours(2)).unwrap();
        let other_secret = SecretString::from("another-k3y-for-unit-tests-98765432".to_owned());

        assert!(viewer_from_headers(&headers(&format!("Bearer {expired}")), &tokens.secret).is_none());
        assert!(viewer_from_headers(&headers("Bearer nonsense"), &tokens.secret).is_none());
        assert!(viewer_from_headers(&HeaderMap::new(), &tokens.secret).is_none());

        let token = issue_token(&user(), &tokens).unwrap();
        assert!(viewer_from_headers(&headers(&token), &other_secret).is_none());
    }
}

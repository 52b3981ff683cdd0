//! Unified error handling with Sentry integration.
//!
//! Services return `AppError`. GraphQL resolvers convert it through
//! [`ErrorExtensions`], which attaches a machine-readable `code` extension
//! and captures server errors to Sentry before responding.

use async_graphql::ErrorExtensions;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::{AuthError, TokenError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is signed in but does not own the resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Write collides with existing data.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No valid bearer token on the request.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// A line item asks for more units than are in stock.
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable code sent as `extensions.code`.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Database(err) | Self::Auth(AuthError::Repository(err)) => match err {
                RepositoryError::NotFound => "NOT_FOUND",
                RepositoryError::Conflict(_) => "CONFLICT",
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    "INTERNAL_SERVER_ERROR"
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "UNAUTHORIZED",
                AuthError::UserAlreadyExists => "CONFLICT",
                AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_)
                | AuthError::MissingField(_) => "BAD_USER_INPUT",
                AuthError::Token(TokenError::Expired | TokenError::Invalid(_)) => {
                    "UNAUTHENTICATED"
                }
                _ => "INTERNAL_SERVER_ERROR",
            },
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Conflict(_) => "CONFLICT",
            Self::BadRequest(_) => "BAD_USER_INPUT",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Whether this error is our fault rather than the caller's.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.code() == "INTERNAL_SERVER_ERROR"
    }

    /// Message safe to show to API clients.
    #[must_use]
    pub fn client_message(&self) -> String {
        if self.is_server_error() {
            return "Internal server error".to_string();
        }

        match self {
            Self::Database(err) | Self::Auth(AuthError::Repository(err)) => match err {
                RepositoryError::Conflict(msg) => msg.clone(),
                _ => "Not found".to_string(),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserAlreadyExists => "A user with this email already exists".to_string(),
                AuthError::Token(_) => "Invalid or expired token".to_string(),
                other => other.to_string(),
            },
            Self::Unauthenticated => "Authentication required".to_string(),
            Self::NotFound(msg)
            | Self::Forbidden(msg)
            | Self::Conflict(msg)
            | Self::BadRequest(msg)
            | Self::InsufficientStock(msg)
            | Self::Internal(msg) => msg.clone(),
        }
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let code = self.code();
        async_graphql::Error::new(self.client_message()).extend_with(|_, e| e.set("code", code))
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after a bearer token is verified to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

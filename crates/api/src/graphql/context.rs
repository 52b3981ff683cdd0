//! Request context helpers shared by resolvers.

use std::str::FromStr;

use async_graphql::{Context, ErrorExtensions, ID};
use sqlx::PgPool;

use salesdesk_core::IdParseError;

use crate::config::TokenConfig;
use crate::error::AppError;
use crate::middleware::auth::Viewer;

/// Typed access to the data every resolver needs.
pub trait ContextExt {
    /// The signed-in seller, or an `UNAUTHENTICATED` error.
    ///
    /// # Errors
    ///
    /// Returns an `UNAUTHENTICATED` error when the request carried no valid
    /// bearer token.
    fn viewer(&self) -> async_graphql::Result<&Viewer>;

    /// Shared database pool.
    fn pool(&self) -> &PgPool;

    /// Token signing settings.
    fn tokens(&self) -> &TokenConfig;
}

impl ContextExt for Context<'_> {
    fn viewer(&self) -> async_graphql::Result<&Viewer> {
        self.data_opt::<Viewer>()
            .ok_or_else(|| AppError::Unauthenticated.extend())
    }

    fn pool(&self) -> &PgPool {
        self.data_unchecked::<PgPool>()
    }

    fn tokens(&self) -> &TokenConfig {
        self.data_unchecked::<TokenConfig>()
    }
}

/// Convert service results into GraphQL results carrying an error `code`.
pub trait Extended<T> {
    /// Map the error through [`ErrorExtensions::extend`].
    ///
    /// # Errors
    ///
    /// Returns the extended GraphQL error when `self` is an error.
    fn extended(self) -> async_graphql::Result<T>;
}

impl<T> Extended<T> for Result<T, AppError> {
    fn extended(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.extend())
    }
}

/// Parse a GraphQL `ID` into a typed id.
///
/// # Errors
///
/// Returns a `BAD_USER_INPUT` error for anything but a positive integer.
pub fn parse_id<T>(id: &ID) -> async_graphql::Result<T>
where
    T: FromStr<Err = IdParseError>,
{
    id.parse::<T>()
        .map_err(|e| AppError::BadRequest(e.to_string()).extend())
}

//! GraphQL schema.
//!
//! Every field except `createUser` and `authenticate` needs a signed-in
//! seller; resolvers fetch it with [`ContextExt::viewer`]. The HTTP layer
//! attaches the [`Viewer`](crate::middleware::auth::Viewer) to each request
//! when its bearer token verifies.

pub mod context;
mod loaders;
mod mutation;
mod query;
mod types;

use async_graphql::dataloader::DataLoader;
use async_graphql::{EmptySubscription, Schema};
use sqlx::PgPool;

pub use context::ContextExt;
pub use loaders::{ClientLoader, ProductLoader, UserLoader};
pub use mutation::MutationRoot;
pub use query::QueryRoot;

use crate::config::TokenConfig;

/// The API schema.
pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with the pool, token settings and loaders as data.
#[must_use]
pub fn build_schema(pool: PgPool, tokens: TokenConfig) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(DataLoader::new(UserLoader::new(pool.clone()), tokio::spawn))
        .data(DataLoader::new(ClientLoader::new(pool.clone()), tokio::spawn))
        .data(DataLoader::new(ProductLoader::new(pool.clone()), tokio::spawn))
        .data(pool)
        .data(tokens)
        .finish()
}

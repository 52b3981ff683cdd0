//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::graphql::{AppSchema, build_schema};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    schema: AppSchema,
}

impl AppState {
    /// Create a new application state and build the GraphQL schema.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let schema = build_schema(pool.clone(), config.token.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                schema,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the GraphQL schema.
    #[must_use]
    pub fn schema(&self) -> &AppSchema {
        &self.inner.schema
    }
}

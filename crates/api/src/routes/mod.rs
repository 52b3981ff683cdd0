//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! POST /graphql        - GraphQL endpoint (rate limited)
//! GET  /graphql        - GraphiQL explorer
//! GET  /health         - Liveness check
//! GET  /health/ready   - Readiness check (database)
//! ```

mod graphql;
mod health;

use axum::{Router, routing::get};

use crate::middleware::graphql_rate_limiter;
use crate::state::AppState;

/// Create the application router (without global layers).
pub fn routes() -> Router<AppState> {
    let graphql = Router::new()
        .route("/graphql", get(graphql::graphiql).post(graphql::graphql_handler))
        .route_layer(graphql_rate_limiter());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(graphql)
}

//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with `request_id` and `user_id` fields)
//! 3. Request ID (reuse or generate `x-request-id`)
//! 4. CORS (configured browser origin)
//! 5. Rate limiting on `/graphql` (governor)
//!
//! Bearer authentication is an extractor, not a layer: see [`auth`].

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod request_id;

pub use auth::{OptionalViewer, Viewer};
pub use cors::cors_layer;
pub use rate_limit::graphql_rate_limiter;
pub use request_id::request_id_middleware;

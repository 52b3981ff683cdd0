//! Integration tests for Salesdesk.
//!
//! # Running Tests
//!
//! ```bash
//! # Database-backed tests (each test gets a fresh database)
//! DATABASE_URL=postgres://localhost/salesdesk cargo test -p salesdesk-integration-tests -- --ignored
//!
//! # HTTP tests additionally need a running server
//! cargo run -p salesdesk-api
//! SALESDESK_API_URL=http://localhost:4000 cargo test -p salesdesk-integration-tests --test graphql_http -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `auth`, `catalog`, `orders`, `reports` - service tests against `PostgreSQL`
//! - `graphql_http` - end-to-end tests against a running API server

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::time::Duration;

use rust_decimal::Decimal;
use salesdesk_api::config::TokenConfig;
use salesdesk_api::models::{Client, NewClient, NewProduct, NewUser, Product, User};
use salesdesk_api::services::{AuthService, CatalogService, ClientService};
use salesdesk_core::{Email, UserId};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;

/// Token settings for tests.
#[must_use]
pub fn test_tokens() -> TokenConfig {
    TokenConfig {
        secret: SecretString::from("integration-k3y-0123456789-abcdefghij".to_owned()),
        ttl: Duration::from_secs(3600),
    }
}

/// A unique email address, so runs never collide.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Register a seller with a known password.
pub async fn create_seller(pool: &PgPool, email: &str) -> User {
    let tokens = test_tokens();
    AuthService::new(pool, &tokens)
        .register(&NewUser {
            name: "Test".to_owned(),
            surname: "Seller".to_owned(),
            email: email.to_owned(),
            password: "correct-horse-battery".to_owned(),
        })
        .await
        .unwrap()
}

/// Create a product.
pub async fn create_product(pool: &PgPool, name: &str, stock: i32, price: Decimal) -> Product {
    CatalogService::new(pool)
        .create(NewProduct {
            name: name.to_owned(),
            stock,
            price,
        })
        .await
        .unwrap()
}

/// Create a client owned by `seller`.
pub async fn create_client(pool: &PgPool, seller: UserId, email: &str) -> Client {
    ClientService::new(pool)
        .create(
            seller,
            NewClient {
                name: "Test".to_owned(),
                surname: "Client".to_owned(),
                company: "Acme".to_owned(),
                email: Email::parse(email).unwrap(),
                phone: None,
            },
        )
        .await
        .unwrap()
}

/// Base URL of a running API server.
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("SALESDESK_API_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

/// Minimal GraphQL-over-HTTP client.
pub struct GraphqlClient {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl Default for GraphqlClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphqlClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            url: format!("{}/graphql", api_base_url()),
            token: None,
        }
    }

    /// Send subsequent requests with this bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Execute an operation and return the JSON response body.
    pub async fn execute(&self, query: &str, variables: Value) -> Value {
        let mut request = self
            .http
            .post(&self.url)
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        request.send().await.unwrap().json().await.unwrap()
    }
}

/// The `code` extension of the first error in a GraphQL response.
#[must_use]
pub fn error_code(response: &Value) -> Option<&str> {
    response["errors"][0]["extensions"]["code"].as_str()
}

//! Batched lookups for nested fields.
//!
//! `Order.client`, `Order.seller`, `Client.seller` and `LineItem.product`
//! go through these loaders so a list of orders costs one query per entity
//! type instead of one per row.

use std::collections::HashMap;

use async_graphql::ErrorExtensions;
use async_graphql::dataloader::Loader;
use sqlx::PgPool;

use salesdesk_core::{ClientId, ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::clients::ClientRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::models::{Client, Product, User};

fn load_error(err: RepositoryError) -> async_graphql::Error {
    AppError::from(err).extend()
}

/// Loads sellers by id.
pub struct UserLoader {
    pool: PgPool,
}

impl UserLoader {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Loader<UserId> for UserLoader {
    type Value = User;
    type Error = async_graphql::Error;

    async fn load(&self, keys: &[UserId]) -> Result<HashMap<UserId, Self::Value>, Self::Error> {
        let users = UserRepository::new(&self.pool)
            .get_many(keys)
            .await
            .map_err(load_error)?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}

/// Loads clients by id.
pub struct ClientLoader {
    pool: PgPool,
}

impl ClientLoader {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Loader<ClientId> for ClientLoader {
    type Value = Client;
    type Error = async_graphql::Error;

    async fn load(
        &self,
        keys: &[ClientId],
    ) -> Result<HashMap<ClientId, Self::Value>, Self::Error> {
        let clients = ClientRepository::new(&self.pool)
            .get_many(keys)
            .await
            .map_err(load_error)?;
        Ok(clients.into_iter().map(|c| (c.id, c)).collect())
    }
}

/// Loads products by id.
pub struct ProductLoader {
    pool: PgPool,
}

impl ProductLoader {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Loader<ProductId> for ProductLoader {
    type Value = Product;
    type Error = async_graphql::Error;

    async fn load(
        &self,
        keys: &[ProductId],
    ) -> Result<HashMap<ProductId, Self::Value>, Self::Error> {
        let products = ProductRepository::new(&self.pool)
            .get_many(keys)
            .await
            .map_err(load_error)?;
        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }
}

//! Mutation root.

use async_graphql::{Context, ID, Object};

use super::context::{ContextExt, Extended, parse_id};
use super::types::{
    AuthInput, ClientInput, ClientObject, OrderInput, OrderObject, ProductInput, ProductObject,
    Token, UpdateClientInput, UpdateOrderInput, UpdateProductInput, UserInput, UserObject,
};
use crate::error::AppError;
use crate::services::{AuthService, CatalogService, ClientService, OrderService};

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Register a seller. Does not require a token.
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        input: UserInput,
    ) -> async_graphql::Result<UserObject> {
        let user = AuthService::new(ctx.pool(), ctx.tokens())
            .register(&input.into())
            .await
            .map_err(AppError::from)
            .extended()?;
        Ok(UserObject(user))
    }

    /// Sign in and receive a bearer token. Does not require a token.
    async fn authenticate(
        &self,
        ctx: &Context<'_>,
        input: AuthInput,
    ) -> async_graphql::Result<Token> {
        let (_, token) = AuthService::new(ctx.pool(), ctx.tokens())
            .login(&input.email, &input.password)
            .await
            .map_err(AppError::from)
            .extended()?;
        Ok(Token { token })
    }

    async fn create_product(
        &self,
        ctx: &Context<'_>,
        input: ProductInput,
    ) -> async_graphql::Result<ProductObject> {
        ctx.viewer()?;
        let product = CatalogService::new(ctx.pool())
            .create(input.into())
            .await
            .extended()?;
        Ok(ProductObject(product))
    }

    async fn update_product(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateProductInput,
    ) -> async_graphql::Result<ProductObject> {
        ctx.viewer()?;
        let product = CatalogService::new(ctx.pool())
            .update(parse_id(&id)?, input.into())
            .await
            .extended()?;
        Ok(ProductObject(product))
    }

    async fn delete_product(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<String> {
        ctx.viewer()?;
        CatalogService::new(ctx.pool())
            .delete(parse_id(&id)?)
            .await
            .extended()?;
        Ok("Product deleted".to_string())
    }

    /// Register a client owned by the signed-in seller.
    async fn create_client(
        &self,
        ctx: &Context<'_>,
        input: ClientInput,
    ) -> async_graphql::Result<ClientObject> {
        let viewer = ctx.viewer()?;
        let client = ClientService::new(ctx.pool())
            .create(viewer.id, input.into_new_client()?)
            .await
            .extended()?;
        Ok(ClientObject(client))
    }

    async fn update_client(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateClientInput,
    ) -> async_graphql::Result<ClientObject> {
        let viewer = ctx.viewer()?;
        let client = ClientService::new(ctx.pool())
            .update(viewer.id, parse_id(&id)?, input.into_patch()?)
            .await
            .extended()?;
        Ok(ClientObject(client))
    }

    async fn delete_client(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<String> {
        let viewer = ctx.viewer()?;
        ClientService::new(ctx.pool())
            .delete(viewer.id, parse_id(&id)?)
            .await
            .extended()?;
        Ok("Client deleted".to_string())
    }

    /// Place an order for one of the signed-in seller's clients.
    async fn create_order(
        &self,
        ctx: &Context<'_>,
        input: OrderInput,
    ) -> async_graphql::Result<OrderObject> {
        let viewer = ctx.viewer()?;
        let order = OrderService::new(ctx.pool())
            .place(viewer.id, input.into_new_order()?)
            .await
            .extended()?;
        Ok(OrderObject(order))
    }

    async fn update_order(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateOrderInput,
    ) -> async_graphql::Result<OrderObject> {
        let viewer = ctx.viewer()?;
        let order = OrderService::new(ctx.pool())
            .update(viewer.id, parse_id(&id)?, input.into_patch()?)
            .await
            .extended()?;
        Ok(OrderObject(order))
    }

    async fn delete_order(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<String> {
        let viewer = ctx.viewer()?;
        OrderService::new(ctx.pool())
            .delete(viewer.id, parse_id(&id)?)
            .await
            .extended()?;
        Ok("Order deleted".to_string())
    }
}

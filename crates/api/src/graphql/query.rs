//! Query root.

use async_graphql::{Context, ErrorExtensions, ID, Object};

use salesdesk_core::OrderStatus;

use super::context::{ContextExt, Extended, parse_id};
use super::types::{ClientObject, OrderObject, ProductObject, TopClientObject, TopSellerObject, UserObject};
use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::services::{CatalogService, ClientService, OrderService, ReportService};

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The signed-in seller.
    async fn current_user(&self, ctx: &Context<'_>) -> async_graphql::Result<UserObject> {
        let viewer = ctx.viewer()?;
        UserRepository::new(ctx.pool())
            .get_by_id(viewer.id)
            .await
            .map_err(AppError::from)
            .extended()?
            .map(UserObject)
            .ok_or_else(|| AppError::NotFound(format!("user {} not found", viewer.id)).extend())
    }

    /// Every product, alphabetically.
    async fn products(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<ProductObject>> {
        ctx.viewer()?;
        let products = CatalogService::new(ctx.pool()).list().await.extended()?;
        Ok(products.into_iter().map(ProductObject).collect())
    }

    async fn product(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<ProductObject> {
        ctx.viewer()?;
        let product = CatalogService::new(ctx.pool())
            .get(parse_id(&id)?)
            .await
            .extended()?;
        Ok(ProductObject(product))
    }

    /// Every client of every seller.
    async fn clients(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<ClientObject>> {
        ctx.viewer()?;
        let clients = ClientService::new(ctx.pool()).list_all().await.extended()?;
        Ok(clients.into_iter().map(ClientObject).collect())
    }

    /// The signed-in seller's clients.
    async fn seller_clients(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<ClientObject>> {
        let viewer = ctx.viewer()?;
        let clients = ClientService::new(ctx.pool())
            .list_for_seller(viewer.id)
            .await
            .extended()?;
        Ok(clients.into_iter().map(ClientObject).collect())
    }

    /// One of the signed-in seller's clients.
    async fn client(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<ClientObject> {
        let viewer = ctx.viewer()?;
        let client = ClientService::new(ctx.pool())
            .get(viewer.id, parse_id(&id)?)
            .await
            .extended()?;
        Ok(ClientObject(client))
    }

    /// Every order of every seller.
    async fn orders(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<OrderObject>> {
        ctx.viewer()?;
        let orders = OrderService::new(ctx.pool()).list_all().await.extended()?;
        Ok(orders.into_iter().map(OrderObject).collect())
    }

    /// The signed-in seller's orders.
    async fn seller_orders(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<OrderObject>> {
        let viewer = ctx.viewer()?;
        let orders = OrderService::new(ctx.pool())
            .list_for_seller(viewer.id)
            .await
            .extended()?;
        Ok(orders.into_iter().map(OrderObject).collect())
    }

    /// One of the signed-in seller's orders.
    async fn order(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<OrderObject> {
        let viewer = ctx.viewer()?;
        let order = OrderService::new(ctx.pool())
            .get(viewer.id, parse_id(&id)?)
            .await
            .extended()?;
        Ok(OrderObject(order))
    }

    /// The signed-in seller's orders in one status.
    async fn orders_by_status(
        &self,
        ctx: &Context<'_>,
        status: OrderStatus,
    ) -> async_graphql::Result<Vec<OrderObject>> {
        let viewer = ctx.viewer()?;
        let orders = OrderService::new(ctx.pool())
            .list_by_status(viewer.id, status)
            .await
            .extended()?;
        Ok(orders.into_iter().map(OrderObject).collect())
    }

    /// Top 10 clients by completed order total.
    async fn top_clients(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<TopClientObject>> {
        ctx.viewer()?;
        let rows = ReportService::new(ctx.pool()).top_clients().await.extended()?;
        Ok(rows.into_iter().map(TopClientObject).collect())
    }

    /// Top 3 sellers by completed order total.
    async fn top_sellers(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<TopSellerObject>> {
        ctx.viewer()?;
        let rows = ReportService::new(ctx.pool()).top_sellers().await.extended()?;
        Ok(rows.into_iter().map(TopSellerObject).collect())
    }

    /// Full-text search over product names (at most 10 results).
    async fn search_products(
        &self,
        ctx: &Context<'_>,
        text: String,
    ) -> async_graphql::Result<Vec<ProductObject>> {
        ctx.viewer()?;
        let products = CatalogService::new(ctx.pool())
            .search(&text)
            .await
            .extended()?;
        Ok(products.into_iter().map(ProductObject).collect())
    }
}

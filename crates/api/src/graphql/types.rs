//! GraphQL object and input types.

use async_graphql::dataloader::DataLoader;
use async_graphql::{
    Context, ErrorExtensions, ID, InputObject, MaybeUndefined, Object, SimpleObject,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use salesdesk_core::{ClientId, Email, OrderStatus, ProductId, UserId};

use super::context::parse_id;
use super::loaders::{ClientLoader, ProductLoader, UserLoader};
use crate::error::AppError;
use crate::models::{
    Client, ClientPatch, LineItem, LineItemRequest, NewClient, NewOrder, NewProduct, NewUser,
    Order, OrderPatch, Product, ProductPatch, TopClient, TopSeller, User,
};

fn gql_id(id: impl std::fmt::Display) -> ID {
    ID(id.to_string())
}

fn parse_email(email: &str) -> async_graphql::Result<Email> {
    Email::parse(email).map_err(|e| AppError::BadRequest(format!("invalid email: {e}")).extend())
}

async fn load_user(ctx: &Context<'_>, id: UserId) -> async_graphql::Result<UserObject> {
    ctx.data_unchecked::<DataLoader<UserLoader>>()
        .load_one(id)
        .await?
        .map(UserObject)
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")).extend())
}

async fn load_client(ctx: &Context<'_>, id: ClientId) -> async_graphql::Result<ClientObject> {
    ctx.data_unchecked::<DataLoader<ClientLoader>>()
        .load_one(id)
        .await?
        .map(ClientObject)
        .ok_or_else(|| AppError::NotFound(format!("client {id} not found")).extend())
}

async fn load_product(ctx: &Context<'_>, id: ProductId) -> async_graphql::Result<ProductObject> {
    ctx.data_unchecked::<DataLoader<ProductLoader>>()
        .load_one(id)
        .await?
        .map(ProductObject)
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")).extend())
}

// =============================================================================
// Objects
// =============================================================================

/// A seller account.
pub struct UserObject(pub User);

#[Object(name = "User")]
impl UserObject {
    async fn id(&self) -> ID {
        gql_id(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn surname(&self) -> &str {
        &self.0.surname
    }

    async fn email(&self) -> &str {
        self.0.email.as_str()
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }
}

/// A catalog product.
pub struct ProductObject(pub Product);

#[Object(name = "Product")]
impl ProductObject {
    async fn id(&self) -> ID {
        gql_id(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    /// Units available for new orders.
    async fn stock(&self) -> i32 {
        self.0.stock
    }

    async fn price(&self) -> Decimal {
        self.0.price
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }
}

/// A client owned by one seller.
pub struct ClientObject(pub Client);

#[Object(name = "Client")]
impl ClientObject {
    async fn id(&self) -> ID {
        gql_id(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn surname(&self) -> &str {
        &self.0.surname
    }

    async fn company(&self) -> &str {
        &self.0.company
    }

    async fn email(&self) -> &str {
        self.0.email.as_str()
    }

    async fn phone(&self) -> Option<&str> {
        self.0.phone.as_deref()
    }

    /// The seller who owns this client.
    async fn seller(&self, ctx: &Context<'_>) -> async_graphql::Result<UserObject> {
        load_user(ctx, self.0.seller_id).await
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }
}

/// One product and quantity within an order.
pub struct LineItemObject(pub LineItem);

#[Object(name = "LineItem")]
impl LineItemObject {
    async fn product(&self, ctx: &Context<'_>) -> async_graphql::Result<ProductObject> {
        load_product(ctx, self.0.product_id).await
    }

    async fn quantity(&self) -> i32 {
        self.0.quantity
    }

    /// Price per unit when the order was placed.
    async fn unit_price(&self) -> Decimal {
        self.0.unit_price
    }

    async fn subtotal(&self) -> Decimal {
        self.0.subtotal()
    }
}

/// An order placed by a seller for one of their clients.
pub struct OrderObject(pub Order);

#[Object(name = "Order")]
impl OrderObject {
    async fn id(&self) -> ID {
        gql_id(self.0.id)
    }

    async fn items(&self) -> Vec<LineItemObject> {
        self.0.items.iter().copied().map(LineItemObject).collect()
    }

    async fn total(&self) -> Decimal {
        self.0.total
    }

    async fn client(&self, ctx: &Context<'_>) -> async_graphql::Result<ClientObject> {
        load_client(ctx, self.0.client_id).await
    }

    async fn seller(&self, ctx: &Context<'_>) -> async_graphql::Result<UserObject> {
        load_user(ctx, self.0.seller_id).await
    }

    async fn status(&self) -> OrderStatus {
        self.0.status
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }
}

/// A client and the total of their completed orders.
pub struct TopClientObject(pub TopClient);

#[Object(name = "TopClient")]
impl TopClientObject {
    async fn client(&self) -> ClientObject {
        ClientObject(self.0.client.clone())
    }

    async fn total(&self) -> Decimal {
        self.0.total
    }
}

/// A seller and the total of their completed orders.
pub struct TopSellerObject(pub TopSeller);

#[Object(name = "TopSeller")]
impl TopSellerObject {
    async fn seller(&self) -> UserObject {
        UserObject(self.0.seller.clone())
    }

    async fn total(&self) -> Decimal {
        self.0.total
    }
}

/// A signed bearer token.
#[derive(SimpleObject)]
pub struct Token {
    pub token: String,
}

// =============================================================================
// Inputs
// =============================================================================

/// Sign-up data.
#[derive(InputObject)]
pub struct UserInput {
    pub name: String,
    pub surname: String,
    pub email: String,
    #[graphql(secret)]
    pub password: String,
}

impl From<UserInput> for NewUser {
    fn from(input: UserInput) -> Self {
        Self {
            name: input.name,
            surname: input.surname,
            email: input.email,
            password: input.password,
        }
    }
}

/// Sign-in data.
#[derive(InputObject)]
pub struct AuthInput {
    pub email: String,
    #[graphql(secret)]
    pub password: String,
}

#[derive(InputObject)]
pub struct ProductInput {
    pub name: String,
    pub stock: i32,
    pub price: Decimal,
}

impl From<ProductInput> for NewProduct {
    fn from(input: ProductInput) -> Self {
        Self {
            name: input.name,
            stock: input.stock,
            price: input.price,
        }
    }
}

/// Omitted fields keep their current value.
#[derive(InputObject)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub stock: Option<i32>,
    pub price: Option<Decimal>,
}

impl From<UpdateProductInput> for ProductPatch {
    fn from(input: UpdateProductInput) -> Self {
        Self {
            name: input.name,
            stock: input.stock,
            price: input.price,
        }
    }
}

#[derive(InputObject)]
pub struct ClientInput {
    pub name: String,
    pub surname: String,
    pub company: String,
    pub email: String,
    pub phone: Option<String>,
}

impl ClientInput {
    pub fn into_new_client(self) -> async_graphql::Result<NewClient> {
        Ok(NewClient {
            email: parse_email(&self.email)?,
            name: self.name,
            surname: self.surname,
            company: self.company,
            phone: self.phone,
        })
    }
}

/// Omitted fields keep their current value.
#[derive(InputObject)]
pub struct UpdateClientInput {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    /// `null` or a blank string clears the phone.
    pub phone: MaybeUndefined<String>,
}

impl UpdateClientInput {
    pub fn into_patch(self) -> async_graphql::Result<ClientPatch> {
        Ok(ClientPatch {
            email: self.email.as_deref().map(parse_email).transpose()?,
            name: self.name,
            surname: self.surname,
            company: self.company,
            phone: match self.phone {
                MaybeUndefined::Undefined => None,
                MaybeUndefined::Null => Some(None),
                MaybeUndefined::Value(phone) => Some(Some(phone)),
            },
        })
    }
}

#[derive(InputObject)]
pub struct LineItemInput {
    pub product: ID,
    pub quantity: i32,
}

impl LineItemInput {
    fn to_request(&self) -> async_graphql::Result<LineItemRequest> {
        Ok(LineItemRequest {
            product_id: parse_id(&self.product)?,
            quantity: self.quantity,
        })
    }
}

fn to_requests(items: &[LineItemInput]) -> async_graphql::Result<Vec<LineItemRequest>> {
    items.iter().map(LineItemInput::to_request).collect()
}

#[derive(InputObject)]
pub struct OrderInput {
    pub client: ID,
    pub items: Vec<LineItemInput>,
    /// Defaults to `PENDING`.
    pub status: Option<OrderStatus>,
}

impl OrderInput {
    pub fn into_new_order(self) -> async_graphql::Result<NewOrder> {
        Ok(NewOrder {
            client_id: parse_id(&self.client)?,
            items: to_requests(&self.items)?,
            status: self.status,
        })
    }
}

/// Omitted fields keep their current value. `items` replaces every line item.
#[derive(InputObject)]
pub struct UpdateOrderInput {
    pub client: Option<ID>,
    pub items: Option<Vec<LineItemInput>>,
    pub status: Option<OrderStatus>,
}

impl UpdateOrderInput {
    pub fn into_patch(self) -> async_graphql::Result<OrderPatch> {
        Ok(OrderPatch {
            client_id: self.client.as_ref().map(parse_id::<ClientId>).transpose()?,
            items: self.items.as_deref().map(to_requests).transpose()?,
            status: self.status,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn update_client(phone: MaybeUndefined<String>) -> UpdateClientInput {
        UpdateClientInput {
            name: None,
            surname: None,
            company: None,
            email: None,
            phone,
        }
    }

    #[test]
    fn test_update_client_phone_states() {
        let omitted = update_client(MaybeUndefined::Undefined).into_patch().unwrap();
        assert_eq!(omitted.phone, None);

        let cleared = update_client(MaybeUndefined::Null).into_patch().unwrap();
        assert_eq!(cleared.phone, Some(None));

        let set = update_client(MaybeUndefined::Value("555-0100".to_owned()))
            .into_patch()
            .unwrap();
        assert_eq!(set.phone, Some(Some("555-0100".to_owned())));
    }

    #[test]
    fn test_update_order_rejects_malformed_client_id() {
        let input = UpdateOrderInput {
            client: Some(ID("not-a-number".to_owned())),
            items: None,
            status: None,
        };
        assert!(input.into_patch().is_err());
    }
}

//! Domain models.
//!
//! These types represent validated domain objects separate from database row
//! types and from the GraphQL wire types.

use rust_decimal::Decimal;

pub mod client;
pub mod order;
pub mod product;
pub mod report;
pub mod user;

pub use client::{Client, ClientPatch, NewClient};
pub use order::{LineItem, LineItemRequest, NewOrder, Order, OrderPatch};
pub use product::{NewProduct, Product, ProductPatch};
pub use report::{TopClient, TopSeller};
pub use user::{NewUser, User};

/// Largest amount a `NUMERIC(12, 2)` money column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

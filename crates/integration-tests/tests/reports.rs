//! Leaderboards against `PostgreSQL`.
//!
//! Run with: `cargo test -p salesdesk-integration-tests --test reports -- --ignored`

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use salesdesk_api::models::{LineItemRequest, NewOrder};
use salesdesk_api::services::{OrderService, ReportService};
use salesdesk_core::{ClientId, OrderStatus, ProductId, UserId};
use salesdesk_integration_tests::{create_client, create_product, create_seller, unique_email};
use sqlx::PgPool;

async fn order(
    pool: &PgPool,
    seller: UserId,
    client: ClientId,
    product: ProductId,
    quantity: i32,
    status: OrderStatus,
) {
    OrderService::new(pool)
        .place(
            seller,
            NewOrder {
                client_id: client,
                items: vec![LineItemRequest {
                    product_id: product,
                    quantity,
                }],
                status: Some(status),
            },
        )
        .await
        .unwrap();
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_top_clients_counts_completed_orders_only(pool: PgPool) {
    let seller = create_seller(&pool, &unique_email("seller")).await;
    let product = create_product(&pool, "Widget", 10_000, Decimal::ONE).await;

    let small = create_client(&pool, seller.id, &unique_email("small")).await;
    let big = create_client(&pool, seller.id, &unique_email("big")).await;
    let idle = create_client(&pool, seller.id, &unique_email("idle")).await;

    order(&pool, seller.id, small.id, product.id, 5, OrderStatus::Completed).await;
    order(&pool, seller.id, big.id, product.id, 20, OrderStatus::Completed).await;
    order(&pool, seller.id, big.id, product.id, 1, OrderStatus::Completed).await;
    order(&pool, seller.id, small.id, product.id, 500, OrderStatus::Pending).await;
    order(&pool, seller.id, idle.id, product.id, 900, OrderStatus::Cancelled).await;

    let top = ReportService::new(&pool).top_clients().await.unwrap();

    assert_eq!(top.len(), 2);
    assert_eq!(top[0].client.id, big.id);
    assert_eq!(top[0].total, Decimal::from(21));
    assert_eq!(top[1].client.id, small.id);
    assert_eq!(top[1].total, Decimal::from(5));
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_top_clients_is_limited_to_ten(pool: PgPool) {
    let seller = create_seller(&pool, &unique_email("seller")).await;
    let product = create_product(&pool, "Widget", 10_000, Decimal::ONE).await;

    for quantity in 1..=12 {
        let client = create_client(&pool, seller.id, &unique_email("client")).await;
        order(&pool, seller.id, client.id, product.id, quantity, OrderStatus::Completed).await;
    }

    let top = ReportService::new(&pool).top_clients().await.unwrap();

    assert_eq!(top.len(), 10);
    assert_eq!(top[0].total, Decimal::from(12));
    assert_eq!(top[9].total, Decimal::from(3));
    assert!(top.windows(2).all(|w| w[0].total >= w[1].total));
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_top_sellers_is_sorted_and_limited_to_three(pool: PgPool) {
    let product = create_product(&pool, "Widget", 10_000, Decimal::ONE).await;

    let mut sellers = Vec::new();
    for quantity in [7, 40, 3, 15] {
        let seller = create_seller(&pool, &unique_email("seller")).await;
        let client = create_client(&pool, seller.id, &unique_email("client")).await;
        order(&pool, seller.id, client.id, product.id, quantity, OrderStatus::Completed).await;
        sellers.push(seller);
    }

    let top = ReportService::new(&pool).top_sellers().await.unwrap();

    assert_eq!(top.len(), 3);
    let ids: Vec<_> = top.iter().map(|t| t.seller.id).collect();
    assert_eq!(ids, vec![sellers[1].id, sellers[3].id, sellers[0].id]);
    assert_eq!(top[0].total, Decimal::from(40));
}

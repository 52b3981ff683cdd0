//! Order placement and stock accounting against `PostgreSQL`.
//!
//! Run with: `cargo test -p salesdesk-integration-tests --test orders -- --ignored`

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use rust_decimal::Decimal;
use salesdesk_api::models::{LineItemRequest, NewOrder, OrderPatch, ProductPatch};
use salesdesk_api::services::{CatalogService, OrderService};
use salesdesk_core::{OrderStatus, ProductId};
use salesdesk_integration_tests::{create_client, create_product, create_seller, unique_email};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

const fn item(product_id: ProductId, quantity: i32) -> LineItemRequest {
    LineItemRequest {
        product_id,
        quantity,
    }
}

async fn stock_of(pool: &PgPool, id: ProductId) -> i32 {
    CatalogService::new(pool).get(id).await.unwrap().stock
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_place_reserves_stock_and_totals_on_server(pool: PgPool) {
    let seller = create_seller(&pool, &unique_email("seller")).await;
    let client = create_client(&pool, seller.id, &unique_email("client")).await;
    let chair = create_product(&pool, "Chair", 10, Decimal::new(2550, 2)).await;
    let desk = create_product(&pool, "Desk", 2, Decimal::new(10000, 2)).await;

    let order = OrderService::new(&pool)
        .place(
            seller.id,
            NewOrder {
                client_id: client.id,
                // Repeated products are merged
                items: vec![item(chair.id, 2), item(desk.id, 1), item(chair.id, 1)],
                status: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.seller_id, seller.id);
    assert_eq!(order.items.len(), 2);
    // 3 * 25.50 + 1 * 100.00
    assert_eq!(order.total, Decimal::new(17650, 2));
    assert_eq!(stock_of(&pool, chair.id).await, 7);
    assert_eq!(stock_of(&pool, desk.id).await, 1);
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_insufficient_stock_takes_nothing(pool: PgPool) {
    let seller = create_seller(&pool, &unique_email("seller")).await;
    let client = create_client(&pool, seller.id, &unique_email("client")).await;
    let chair = create_product(&pool, "Chair", 10, Decimal::new(2550, 2)).await;
    let desk = create_product(&pool, "Desk", 2, Decimal::new(10000, 2)).await;

    let err = OrderService::new(&pool)
        .place(
            seller.id,
            NewOrder {
                client_id: client.id,
                items: vec![item(chair.id, 4), item(desk.id, 3)],
                status: None,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "INSUFFICIENT_STOCK");
    assert!(err.to_string().contains("Desk"));
    assert_eq!(stock_of(&pool, chair.id).await, 10);
    assert_eq!(stock_of(&pool, desk.id).await, 2);
    assert!(OrderService::new(&pool).list_all().await.unwrap().is_empty());
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_invalid_line_items_are_rejected(pool: PgPool) {
    let seller = create_seller(&pool, &unique_email("seller")).await;
    let client = create_client(&pool, seller.id, &unique_email("client")).await;
    let chair = create_product(&pool, "Chair", 10, Decimal::new(2550, 2)).await;
    let orders = OrderService::new(&pool);

    let empty = orders
        .place(
            seller.id,
            NewOrder {
                client_id: client.id,
                items: vec![],
                status: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(empty.code(), "BAD_USER_INPUT");

    let zero = orders
        .place(
            seller.id,
            NewOrder {
                client_id: client.id,
                items: vec![item(chair.id, 0)],
                status: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(zero.code(), "BAD_USER_INPUT");

    let missing = orders
        .place(
            seller.id,
            NewOrder {
                client_id: client.id,
                items: vec![item(ProductId::new(999_999), 1)],
                status: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(missing.code(), "NOT_FOUND");
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_orders_are_private_to_their_seller(pool: PgPool) {
    let owner = create_seller(&pool, &unique_email("owner")).await;
    let other = create_seller(&pool, &unique_email("other")).await;
    let client = create_client(&pool, owner.id, &unique_email("client")).await;
    let chair = create_product(&pool, "Chair", 10, Decimal::new(2550, 2)).await;
    let orders = OrderService::new(&pool);

    let placed_for_foreign_client = orders
        .place(
            other.id,
            NewOrder {
                client_id: client.id,
                items: vec![item(chair.id, 1)],
                status: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(placed_for_foreign_client.code(), "FORBIDDEN");
    assert_eq!(stock_of(&pool, chair.id).await, 10);

    let order = orders
        .place(
            owner.id,
            NewOrder {
                client_id: client.id,
                items: vec![item(chair.id, 1)],
                status: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(orders.get(other.id, order.id).await.unwrap_err().code(), "FORBIDDEN");
    assert_eq!(
        orders
            .update(
                other.id,
                order.id,
                OrderPatch {
                    status: Some(OrderStatus::Completed),
                    ..OrderPatch::default()
                },
            )
            .await
            .unwrap_err()
            .code(),
        "FORBIDDEN"
    );
    assert_eq!(orders.delete(other.id, order.id).await.unwrap_err().code(), "FORBIDDEN");
    assert!(orders.list_for_seller(other.id).await.unwrap().is_empty());
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_replacing_items_adjusts_stock_by_difference(pool: PgPool) {
    let seller = create_seller(&pool, &unique_email("seller")).await;
    let client = create_client(&pool, seller.id, &unique_email("client")).await;
    let chair = create_product(&pool, "Chair", 6, Decimal::new(1000, 2)).await;
    let orders = OrderService::new(&pool);

    let order = orders
        .place(
            seller.id,
            NewOrder {
                client_id: client.id,
                items: vec![item(chair.id, 2)],
                status: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(stock_of(&pool, chair.id).await, 4);

    // Only the extra 4 units need to be available
    let grown = orders
        .update(
            seller.id,
            order.id,
            OrderPatch {
                items: Some(vec![item(chair.id, 6)]),
                ..OrderPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(grown.total, Decimal::new(6000, 2));
    assert_eq!(stock_of(&pool, chair.id).await, 0);

    let too_many = orders
        .update(
            seller.id,
            order.id,
            OrderPatch {
                items: Some(vec![item(chair.id, 7)]),
                ..OrderPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(too_many.code(), "INSUFFICIENT_STOCK");
    assert_eq!(stock_of(&pool, chair.id).await, 0);

    orders
        .update(
            seller.id,
            order.id,
            OrderPatch {
                items: Some(vec![item(chair.id, 1)]),
                ..OrderPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(stock_of(&pool, chair.id).await, 5);
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_cancel_returns_stock_and_reactivation_takes_it_again(pool: PgPool) {
    let seller = create_seller(&pool, &unique_email("seller")).await;
    let client = create_client(&pool, seller.id, &unique_email("client")).await;
    let chair = create_product(&pool, "Chair", 5, Decimal::new(1000, 2)).await;
    let orders = OrderService::new(&pool);

    let order = orders
        .place(
            seller.id,
            NewOrder {
                client_id: client.id,
                items: vec![item(chair.id, 3)],
                status: None,
            },
        )
        .await
        .unwrap();

    let cancelled = orders
        .update(
            seller.id,
            order.id,
            OrderPatch {
                status: Some(OrderStatus::Cancelled),
                ..OrderPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&pool, chair.id).await, 5);

    CatalogService::new(&pool)
        .update(
            chair.id,
            ProductPatch {
                price: Some(Decimal::new(9900, 2)),
                ..ProductPatch::default()
            },
        )
        .await
        .unwrap();

    let reactivated = orders
        .update(
            seller.id,
            order.id,
            OrderPatch {
                status: Some(OrderStatus::Pending),
                ..OrderPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(stock_of(&pool, chair.id).await, 2);
    // Reactivation keeps the prices the order was placed at
    assert_eq!(reactivated.total, Decimal::new(3000, 2));
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_delete_restocks_only_pending_orders(pool: PgPool) {
    let seller = create_seller(&pool, &unique_email("seller")).await;
    let client = create_client(&pool, seller.id, &unique_email("client")).await;
    let chair = create_product(&pool, "Chair", 10, Decimal::new(1000, 2)).await;
    let orders = OrderService::new(&pool);

    let pending = orders
        .place(
            seller.id,
            NewOrder {
                client_id: client.id,
                items: vec![item(chair.id, 2)],
                status: None,
            },
        )
        .await
        .unwrap();
    let completed = orders
        .place(
            seller.id,
            NewOrder {
                client_id: client.id,
                items: vec![item(chair.id, 3)],
                status: Some(OrderStatus::Completed),
            },
        )
        .await
        .unwrap();
    assert_eq!(stock_of(&pool, chair.id).await, 5);

    orders.delete(seller.id, pending.id).await.unwrap();
    assert_eq!(stock_of(&pool, chair.id).await, 7);

    orders.delete(seller.id, completed.id).await.unwrap();
    assert_eq!(stock_of(&pool, chair.id).await, 7);

    assert_eq!(
        orders.get(seller.id, pending.id).await.unwrap_err().code(),
        "NOT_FOUND"
    );
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_list_by_status_filters_seller_orders(pool: PgPool) {
    let seller = create_seller(&pool, &unique_email("seller")).await;
    let client = create_client(&pool, seller.id, &unique_email("client")).await;
    let chair = create_product(&pool, "Chair", 10, Decimal::new(1000, 2)).await;
    let orders = OrderService::new(&pool);

    for status in [
        OrderStatus::Pending,
        OrderStatus::Completed,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ] {
        orders
            .place(
                seller.id,
                NewOrder {
                    client_id: client.id,
                    items: vec![item(chair.id, 1)],
                    status: Some(status),
                },
            )
            .await
            .unwrap();
    }

    // Cancelled orders never held stock
    assert_eq!(stock_of(&pool, chair.id).await, 7);

    let completed = orders
        .list_by_status(seller.id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.len(), 2);
    assert!(completed.iter().all(|o| o.status == OrderStatus::Completed));
    assert_eq!(orders.list_for_seller(seller.id).await.unwrap().len(), 4);
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_concurrent_orders_never_oversell(pool: PgPool) {
    let seller = create_seller(&pool, &unique_email("seller")).await;
    let client = create_client(&pool, seller.id, &unique_email("client")).await;
    let lamp = create_product(&pool, "Lamp", 3, Decimal::new(1500, 2)).await;
    let orders = OrderService::new(&pool);

    let order = || NewOrder {
        client_id: client.id,
        items: vec![item(lamp.id, 2)],
        status: None,
    };

    let (first, second) = tokio::join!(
        orders.place(seller.id, order()),
        orders.place(seller.id, order())
    );

    let codes: Vec<&str> = [first, second]
        .into_iter()
        .filter_map(Result::err)
        .map(|e| e.code())
        .collect();
    assert_eq!(codes, vec!["INSUFFICIENT_STOCK"]);
    assert_eq!(stock_of(&pool, lamp.id).await, 1);
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_crossing_updates_both_complete(pool: PgPool) {
    let seller = create_seller(&pool, &unique_email("seller")).await;
    let client = create_client(&pool, seller.id, &unique_email("client")).await;
    let chair = create_product(&pool, "Chair", 5, Decimal::new(1000, 2)).await;
    let desk = create_product(&pool, "Desk", 5, Decimal::new(5000, 2)).await;
    let orders = OrderService::new(&pool);

    let place = |product_id| NewOrder {
        client_id: client.id,
        items: vec![item(product_id, 1)],
        status: None,
    };
    let a = orders.place(seller.id, place(chair.id)).await.unwrap();
    let b = orders.place(seller.id, place(desk.id)).await.unwrap();

    // Each update releases one product and takes the other
    let swap = |product_id| OrderPatch {
        items: Some(vec![item(product_id, 2)]),
        ..OrderPatch::default()
    };
    let (a, b) = tokio::join!(
        orders.update(seller.id, a.id, swap(desk.id)),
        orders.update(seller.id, b.id, swap(chair.id))
    );

    assert_eq!(a.unwrap().total, Decimal::new(10000, 2));
    assert_eq!(b.unwrap().total, Decimal::new(2000, 2));
    assert_eq!(stock_of(&pool, chair.id).await, 3);
    assert_eq!(stock_of(&pool, desk.id).await, 3);
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_update_moves_order_to_another_client(
    pool_opts: PgPoolOptions,
    connect_opts: PgConnectOptions,
) {
    // A single connection means the ownership check has to share the
    // update's transaction
    let pool = pool_opts
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(connect_opts)
        .await
        .unwrap();

    let seller = create_seller(&pool, &unique_email("seller")).await;
    let other = create_seller(&pool, &unique_email("other")).await;
    let first = create_client(&pool, seller.id, &unique_email("first")).await;
    let second = create_client(&pool, seller.id, &unique_email("second")).await;
    let foreign = create_client(&pool, other.id, &unique_email("foreign")).await;
    let chair = create_product(&pool, "Chair", 5, Decimal::new(1000, 2)).await;
    let orders = OrderService::new(&pool);

    let order = orders
        .place(
            seller.id,
            NewOrder {
                client_id: first.id,
                items: vec![item(chair.id, 1)],
                status: None,
            },
        )
        .await
        .unwrap();

    let moved = orders
        .update(
            seller.id,
            order.id,
            OrderPatch {
                client_id: Some(second.id),
                ..OrderPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.client_id, second.id);
    assert_eq!(stock_of(&pool, chair.id).await, 4);

    let stolen = orders
        .update(
            seller.id,
            order.id,
            OrderPatch {
                client_id: Some(foreign.id),
                ..OrderPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(stolen.code(), "FORBIDDEN");
    assert_eq!(orders.get(seller.id, order.id).await.unwrap().client_id, second.id);
}

#[sqlx::test(migrator = "salesdesk_api::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL"]
async fn test_total_past_column_range_is_bad_input(pool: PgPool) {
    let seller = create_seller(&pool, &unique_email("seller")).await;
    let client = create_client(&pool, seller.id, &unique_email("client")).await;
    let yacht = create_product(&pool, "Yacht", 5, Decimal::new(999_999_999_999, 2)).await;

    let err = OrderService::new(&pool)
        .place(
            seller.id,
            NewOrder {
                client_id: client.id,
                items: vec![item(yacht.id, 2)],
                status: None,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "BAD_USER_INPUT");
    assert_eq!(stock_of(&pool, yacht.id).await, 5);
}

use crate::helper::{
    fetch_item_prices, fetch_product_row, seed_products, spawn_app, table_counts,
};
use serde_json::Value;
use storefront::db::drop_database;
use uuid::Uuid;

#[tokio::test]
async fn order_creation_moves_stock_and_sold_per_line() {
    //arrange
    let app = spawn_app().await;
    let laptop = app.create_product("Laptop", 50000.0, 10).await;
    let bottle = app.create_product("Bottle", 1000.0, 100).await;
    let laptop_id = laptop["data"]["id"].as_str().unwrap();
    let bottle_id = bottle["data"]["id"].as_str().unwrap();

    //act: the laptop appears on two separate lines
    let response = app
        .post_order(&serde_json::json!({"products": [
            {"id": laptop_id, "quantity": 2},
            {"id": bottle_id, "quantity": 5},
            {"id": laptop_id, "quantity": 3},
        ]}))
        .await;

    //assert
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Order created");
    assert_eq!(body["data"]["products"].as_array().unwrap().len(), 3);

    let laptop_row = fetch_product_row(&app.db_pool, Uuid::parse_str(laptop_id).unwrap()).await;
    assert_eq!(laptop_row.stock, 5);
    assert_eq!(laptop_row.sold, 5);
    let bottle_row = fetch_product_row(&app.db_pool, Uuid::parse_str(bottle_id).unwrap()).await;
    assert_eq!(bottle_row.stock, 95);
    assert_eq!(bottle_row.sold, 5);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn order_with_unknown_product_rolls_back_completely() {
    //arrange
    let app = spawn_app().await;
    let laptop = app.create_product("Laptop", 50000.0, 10).await;
    let laptop_id = laptop["data"]["id"].as_str().unwrap();
    let counts_before = table_counts(&app.db_pool).await;

    //act: the second line references a product that does not exist
    let response = app
        .post_order(&serde_json::json!({"products": [
            {"id": laptop_id, "quantity": 1},
            {"id": "5fcd7d83-7adf-4d4d-931a-68b9678009db", "quantity": 1},
        ]}))
        .await;

    //assert
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Product with id 5fcd7d83-7adf-4d4d-931a-68b9678009db not found."
    );

    assert_eq!(table_counts(&app.db_pool).await, counts_before);
    let laptop_row = fetch_product_row(&app.db_pool, Uuid::parse_str(laptop_id).unwrap()).await;
    assert_eq!(laptop_row.stock, 10);
    assert_eq!(laptop_row.sold, 0);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn order_with_empty_or_missing_products_returns_400_and_creates_nothing() {
    let app = spawn_app().await;
    let counts_before = table_counts(&app.db_pool).await;

    for invalid_body in [
        serde_json::json!({"products": []}),
        serde_json::json!({}),
    ] {
        let response = app.post_order(&invalid_body).await;

        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Invalid input, products array is required.");
    }

    assert_eq!(table_counts(&app.db_pool).await, counts_before);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn order_exceeding_stock_is_rejected_and_rolled_back() {
    //arrange
    let app = spawn_app().await;
    let cap = app.create_product("Cap", 500.0, 5).await;
    let cap_id = cap["data"]["id"].as_str().unwrap();
    let counts_before = table_counts(&app.db_pool).await;

    //act
    let response = app
        .post_order(&serde_json::json!({"products": [{"id": cap_id, "quantity": 10}]}))
        .await;

    //assert
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        format!("Insufficient stock for product {}", cap_id)
    );

    assert_eq!(table_counts(&app.db_pool).await, counts_before);
    let cap_row = fetch_product_row(&app.db_pool, Uuid::parse_str(cap_id).unwrap()).await;
    assert_eq!(cap_row.stock, 5);
    assert_eq!(cap_row.sold, 0);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn concurrent_orders_cannot_oversell_a_product() {
    //arrange
    let app = spawn_app().await;
    let vinyl = app.create_product("Limited Edition Vinyl", 35.0, 1).await;
    let vinyl_id = vinyl["data"]["id"].as_str().unwrap();
    let order_body = serde_json::json!({"products": [{"id": vinyl_id, "quantity": 1}]});

    //act: both placements race for the last unit
    let (first, second) = tokio::join!(app.post_order(&order_body), app.post_order(&order_body));

    //assert: exactly one wins, stock never goes negative
    let statuses = [first.status().as_u16(), second.status().as_u16()];
    assert_eq!(statuses.iter().filter(|s| **s == 201).count(), 1);

    let vinyl_row = fetch_product_row(&app.db_pool, Uuid::parse_str(vinyl_id).unwrap()).await;
    assert_eq!(vinyl_row.stock, 0);
    assert_eq!(vinyl_row.sold, 1);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn order_items_keep_the_price_snapshot_while_listing_shows_live_price() {
    //arrange
    let app = spawn_app().await;
    let phone = app.create_product("Smart Phone", 20000.0, 25).await;
    let phone_id = phone["data"]["id"].as_str().unwrap();

    let response = app
        .post_order(&serde_json::json!({"products": [{"id": phone_id, "quantity": 1}]}))
        .await;
    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    let order_id = created["data"]["id"].as_str().unwrap();

    //act: reprice the phone after the order was placed
    let response = app
        .api_client
        .put(&format!("{}/api/products/{}", &app.address, phone_id))
        .json(&serde_json::json!({"name": "Smart Phone", "price": 25000.0, "stock": 24}))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 200);

    //assert: the item row keeps the order-time price
    let prices = fetch_item_prices(&app.db_pool, Uuid::parse_str(order_id).unwrap()).await;
    assert_eq!(prices, vec![20000.0]);

    // while the order detail shows the product as it is now
    let response = app
        .api_client
        .get(&format!("{}/api/orders/{}", &app.address, order_id))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["products"][0]["price"], 25000.0);
    assert_eq!(body["data"]["products"][0]["quantity"], 1);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn order_listing_joins_lines_to_current_products() {
    //arrange
    let app = spawn_app().await;
    let seeded = seed_products(&app.db_pool)
        .await
        .expect("Failed to seed products");
    let first = &seeded[0];

    let response = app
        .post_order(
            &serde_json::json!({"products": [{"id": first.id.to_string(), "quantity": 2}]}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);

    //act
    let response = app
        .api_client
        .get(&format!("{}/api/orders", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    //assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Order List");
    let orders = body["data"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["products"][0]["name"], first.name);
    assert_eq!(orders[0]["products"][0]["quantity"], 2);
    assert_eq!(orders[0]["products"][0]["sold"], 2);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn getting_an_unknown_order_returns_404() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(&format!(
            "{}/api/orders/5fcd7d83-7adf-4d4d-931a-68b9678009db",
            &app.address
        ))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Order not found");
    drop_database(&app.database_name);
}

#[tokio::test]
async fn deleting_an_order_cascades_items_but_keeps_stock() {
    //arrange
    let app = spawn_app().await;
    let dress = app.create_product("Dress", 5000.0, 40).await;
    let dress_id = dress["data"]["id"].as_str().unwrap();

    let response = app
        .post_order(&serde_json::json!({"products": [{"id": dress_id, "quantity": 3}]}))
        .await;
    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    let order_id = created["data"]["id"].as_str().unwrap();

    //act
    let response = app
        .api_client
        .delete(&format!("{}/api/orders/{}", &app.address, order_id))
        .send()
        .await
        .expect("Failed to execute request.");

    //assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Order deleted successfully");
    assert_eq!(body["data"]["products"][0]["quantity"], 3);

    let (_, order_count, item_count) = table_counts(&app.db_pool).await;
    assert_eq!(order_count, 0);
    assert_eq!(item_count, 0);

    // the sale stays on the books
    let dress_row = fetch_product_row(&app.db_pool, Uuid::parse_str(dress_id).unwrap()).await;
    assert_eq!(dress_row.stock, 37);
    assert_eq!(dress_row.sold, 3);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn deleting_an_unknown_order_returns_404() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .delete(&format!(
            "{}/api/orders/5fcd7d83-7adf-4d4d-931a-68b9678009db",
            &app.address
        ))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Order not found");
    drop_database(&app.database_name);
}

mod common;

use common::{order_body, TestApp, TEST_USER_ID};
use serde_json::{json, Value};

#[tokio::test]
async fn dine_in_order_is_charged_and_persisted() {
    let app = TestApp::spawn().await;

    let response = app.post_order(&order_body("pm-bca", "dineIn")).await;
    assert_eq!(response.status().as_u16(), 201);

    let order: Value = response.json().await.expect("Failed to parse JSON");
    let order_id = order["id"].as_str().expect("order id").to_string();

    assert_eq!(order["totalAmount"], 32000);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["paymentStatus"], "pending");
    assert_eq!(order["orderType"], "dineIn");
    assert_eq!(order["paymentCode"], "8808123456789012");
    assert!(order["paymentExpiry"].is_string());
    assert_eq!(order["paymentDetailsRaw"]["order_id"], order_id.as_str());
    assert_eq!(order["orderItems"].as_array().map(Vec::len), Some(2));

    let reservations = app.store.reservations_for_order(&order_id).await;
    assert_eq!(reservations.len(), 1);
    assert_eq!(order["tableReservationId"], reservations[0].id.as_str());
    assert_eq!(reservations[0].table_id, "table-7");

    // Only the purchased line is removed from the cart.
    let cart = app.store.cart_items_for_user(TEST_USER_ID).await;
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].menu_item_id, "menu-sate");

    let charge = app.gateway.last_request().expect("charge was sent");
    assert_eq!(charge.transaction_details.order_id, order_id);
    assert_eq!(charge.transaction_details.gross_amount, 32000);
    assert_eq!(app.gateway.call_count(), 1);
}

#[tokio::test]
async fn take_away_order_never_reserves_a_table() {
    let app = TestApp::spawn().await;

    let response = app.post_order(&order_body("pm-bca", "takeAway")).await;
    assert_eq!(response.status().as_u16(), 201);

    let order: Value = response.json().await.expect("Failed to parse JSON");
    assert!(order.get("tableReservationId").is_none());
    let order_id = order["id"].as_str().expect("order id");
    assert!(app.store.reservations_for_order(order_id).await.is_empty());
}

#[tokio::test]
async fn qris_order_exposes_display_url() {
    let app = TestApp::spawn().await;

    let response = app.post_order(&order_body("pm-qris", "takeAway")).await;
    assert_eq!(response.status().as_u16(), 201);

    let order: Value = response.json().await.expect("Failed to parse JSON");
    let url = order["paymentDisplayUrl"].as_str().expect("display url");
    assert!(url.contains("/qr/"));
    assert!(order.get("paymentCode").is_none());
}

#[tokio::test]
async fn convenience_store_order_gets_payment_code() {
    let app = TestApp::spawn().await;

    let response = app.post_order(&order_body("pm-indomaret", "takeAway")).await;
    assert_eq!(response.status().as_u16(), 201);

    let order: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(order["paymentCode"], "MOCK-STORE-0001");
}

#[tokio::test]
async fn shopeepay_charge_carries_callback() {
    let app = TestApp::spawn().await;

    let response = app.post_order(&order_body("pm-shopeepay", "takeAway")).await;
    assert_eq!(response.status().as_u16(), 201);

    let charge = app.gateway.last_request().expect("charge was sent");
    let body = serde_json::to_value(&charge).expect("serializable charge");
    assert_eq!(body["payment_type"], "shopeepay");
    assert_eq!(
        body["shopeepay"]["callback_url"],
        "http://localhost/shopeepay/callback"
    );
}

#[tokio::test]
async fn missing_gateway_identifier_fails_before_charge() {
    let app = TestApp::spawn().await;

    let response = app.post_order(&order_body("pm-va-null", "dineIn")).await;
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(app.gateway.call_count(), 0);
    assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn unknown_user_and_payment_method_are_404() {
    let app = TestApp::spawn().await;

    let mut body = order_body("pm-bca", "dineIn");
    body["userId"] = json!("ghost");
    assert_eq!(app.post_order(&body).await.status().as_u16(), 404);

    let body = order_body("pm-does-not-exist", "dineIn");
    assert_eq!(app.post_order(&body).await.status().as_u16(), 404);

    assert_eq!(app.gateway.call_count(), 0);
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let app = TestApp::spawn().await;

    let mut no_items = order_body("pm-bca", "dineIn");
    no_items["orderItems"] = json!([]);
    assert_eq!(app.post_order(&no_items).await.status().as_u16(), 422);

    let mut zero_qty = order_body("pm-bca", "dineIn");
    zero_qty["orderItems"][0]["quantity"] = json!(0);
    assert_eq!(app.post_order(&zero_qty).await.status().as_u16(), 422);

    let mut wrong_total = order_body("pm-bca", "dineIn");
    wrong_total["orderItems"][1]["total"] = json!(9000);
    assert_eq!(app.post_order(&wrong_total).await.status().as_u16(), 400);

    let mut bad_type = order_body("pm-bca", "dineIn");
    bad_type["orderType"] = json!("delivery");
    assert_eq!(app.post_order(&bad_type).await.status().as_u16(), 400);

    assert_eq!(app.gateway.call_count(), 0);
}

#[tokio::test]
async fn gateway_rejection_leaves_no_order() {
    let app = TestApp::spawn().await;
    app.gateway.set_reject(true);

    let response = app.post_order(&order_body("pm-bca", "dineIn")).await;
    assert_eq!(response.status().as_u16(), 502);
    assert_eq!(app.gateway.call_count(), 1);
    assert_eq!(app.store.order_count().await, 0);
    assert_eq!(app.store.cart_items_for_user(TEST_USER_ID).await.len(), 2);
}

#[tokio::test]
async fn commit_failure_after_charge_is_reported_as_critical() {
    let app = TestApp::spawn().await;
    app.store.set_fail_commits(true);

    let response = app.post_order(&order_body("pm-bca", "dineIn")).await;
    assert_eq!(response.status().as_u16(), 500);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["details"], "Manual reconciliation required");
    assert!(body["error"].as_str().unwrap_or_default().contains("charged"));

    assert_eq!(app.gateway.call_count(), 1);
    assert_eq!(app.store.order_count().await, 0);
    assert_eq!(app.store.cart_items_for_user(TEST_USER_ID).await.len(), 2);
}

#[tokio::test]
async fn get_and_patch_order() {
    let app = TestApp::spawn().await;

    let created: Value = app
        .post_order(&order_body("pm-gopay", "takeAway"))
        .await
        .json()
        .await
        .expect("Failed to parse JSON");
    let order_id = created["id"].as_str().expect("order id");
    let url = format!("{}/v1/orders/{}", app.address, order_id);

    let fetched: Value = app
        .client
        .get(&url)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(fetched["id"], order_id);
    assert_eq!(fetched["totalAmount"], 32000);

    let patched = app
        .client
        .patch(&url)
        .json(&json!({ "orderStatus": "preparing" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(patched.status().as_u16(), 200);
    let patched: Value = patched.json().await.expect("Failed to parse JSON");
    assert_eq!(patched["status"], "preparing");
    assert_eq!(patched["paymentStatus"], "pending");
    assert_eq!(patched["totalAmount"], 32000);

    let noop = app
        .client
        .patch(&url)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(noop.status().as_u16(), 200);
    let noop: Value = noop.json().await.expect("Failed to parse JSON");
    assert_eq!(noop["updatedAt"], patched["updatedAt"]);
}

#[tokio::test]
async fn missing_order_is_404() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/v1/orders/nope", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);

    let response = app
        .client
        .patch(format!("{}/v1/orders/nope", app.address))
        .json(&json!({ "paymentStatus": "success" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(app.store.order_count().await, 0);
}

mod common;

use common::{order_body, test_config, TestApp};
use order_service::services::SignatureVerifier;
use secrecy::Secret;
use order_service::models::{OrderStatus, PaymentStatus};
use order_service::services::OrderStore;
use serde_json::{json, Value};

async fn create_order(app: &TestApp) -> String {
    let order: Value = app
        .post_order(&order_body("pm-bca", "takeAway"))
        .await
        .json()
        .await
        .expect("Failed to parse JSON");
    order["id"].as_str().expect("order id").to_string()
}

async fn statuses(app: &TestApp, order_id: &str) -> (PaymentStatus, OrderStatus) {
    let order = app
        .store
        .find_order(order_id)
        .await
        .expect("store read")
        .expect("order exists");
    (order.payment_status, order.status)
}

#[tokio::test]
async fn settlement_confirms_order() {
    let app = TestApp::spawn().await;
    let order_id = create_order(&app).await;

    let response = app
        .post_webhook(&app.notification(&order_id, "settlement", "2026-01-01 10:00:00"))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Webhook processed successfully");
    assert_eq!(
        statuses(&app, &order_id).await,
        (PaymentStatus::Success, OrderStatus::Confirmed)
    );
}

#[tokio::test]
async fn expire_and_deny_cancel_order() {
    let app = TestApp::spawn().await;

    let expired = create_order(&app).await;
    app.post_webhook(&app.notification(&expired, "expire", "2026-01-01 10:00:00"))
        .await;
    assert_eq!(
        statuses(&app, &expired).await,
        (PaymentStatus::Failure, OrderStatus::Cancelled)
    );

    let denied = create_order(&app).await;
    app.post_webhook(&app.notification(&denied, "deny", "2026-01-01 10:00:00"))
        .await;
    assert_eq!(
        statuses(&app, &denied).await,
        (PaymentStatus::Deny, OrderStatus::Cancelled)
    );
}

#[tokio::test]
async fn invalid_signature_is_401_and_changes_nothing() {
    let app = TestApp::spawn().await;
    let order_id = create_order(&app).await;

    let mut body = app.notification(&order_id, "settlement", "2026-01-01 10:00:00");
    body["gross_amount"] = json!("1.00");

    let response = app.post_webhook(&body).await;
    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(
        statuses(&app, &order_id).await,
        (PaymentStatus::Pending, OrderStatus::Pending)
    );
}

#[tokio::test]
async fn malformed_body_is_400() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/v1/webhooks/midtrans", app.address))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn unknown_status_is_acknowledged_without_change() {
    let app = TestApp::spawn().await;
    let order_id = create_order(&app).await;

    let response = app
        .post_webhook(&app.notification(&order_id, "refund", "2026-01-01 10:00:00"))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Webhook received, no action taken");
    assert_eq!(
        statuses(&app, &order_id).await,
        (PaymentStatus::Pending, OrderStatus::Pending)
    );
}

#[tokio::test]
async fn unknown_order_is_acknowledged() {
    let app = TestApp::spawn().await;

    let response = app
        .post_webhook(&app.notification("order-missing", "settlement", "2026-01-01 10:00:00"))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn replayed_notification_converges() {
    let app = TestApp::spawn().await;
    let order_id = create_order(&app).await;
    let body = app.notification(&order_id, "settlement", "2026-01-01 10:00:00");

    for _ in 0..3 {
        let response = app.post_webhook(&body).await;
        assert_eq!(response.status().as_u16(), 200);
    }

    assert_eq!(
        statuses(&app, &order_id).await,
        (PaymentStatus::Success, OrderStatus::Confirmed)
    );
}

#[tokio::test]
async fn out_of_order_pending_does_not_regress() {
    let app = TestApp::spawn().await;
    let order_id = create_order(&app).await;

    app.post_webhook(&app.notification(&order_id, "settlement", "2026-01-01 10:05:00"))
        .await;
    let response = app
        .post_webhook(&app.notification(&order_id, "pending", "2026-01-01 10:00:00"))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    assert_eq!(
        statuses(&app, &order_id).await,
        (PaymentStatus::Success, OrderStatus::Confirmed)
    );
}

#[tokio::test]
async fn store_failure_is_acknowledged_without_change() {
    let app = TestApp::spawn().await;
    let order_id = create_order(&app).await;
    app.store.set_fail_updates(true);

    let response = app
        .post_webhook(&app.notification(&order_id, "settlement", "2026-01-01 10:00:00"))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Webhook received, no action taken");
    assert_eq!(
        statuses(&app, &order_id).await,
        (PaymentStatus::Pending, OrderStatus::Pending)
    );
}

#[tokio::test]
async fn unconfigured_server_key_rejects_every_notification() {
    let mut config = test_config();
    config.midtrans.server_key = Secret::new(String::new());
    let app = TestApp::spawn_with(config).await;
    let order_id = create_order(&app).await;

    // Anyone can compute a digest that uses an empty key.
    let keyless = SignatureVerifier::new(Secret::new(String::new()));
    let mut body = app.notification(&order_id, "settlement", "2026-01-01 10:00:00");
    body["signature_key"] = json!(keyless.expected(&order_id, "200", "32000.00"));

    let response = app.post_webhook(&body).await;
    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(
        statuses(&app, &order_id).await,
        (PaymentStatus::Pending, OrderStatus::Pending)
    );
}

#![allow(dead_code)]

use std::sync::Arc;

use mongodb::bson::DateTime;
use order_service::config::{MidtransConfig, MongoConfig, OrderServiceConfig};
use order_service::models::{CartItem, PaymentMethod, PaymentMethodType, User};
use order_service::services::{InMemoryOrderStore, MockPaymentGateway, SignatureVerifier};
use order_service::Application;
use secrecy::Secret;
use serde_json::{json, Value};

pub const SERVER_KEY: &str = "SB-Mid-server-test-key";
pub const TEST_USER_ID: &str = "user-1";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<InMemoryOrderStore>,
    pub gateway: Arc<MockPaymentGateway>,
    pub client: reqwest::Client,
}

pub fn test_config() -> OrderServiceConfig {
    OrderServiceConfig {
        common: service_core::config::Config {
            port: 0,
            log_level: "warn".to_string(),
            otlp_endpoint: None,
        },
        mongodb: MongoConfig {
            uri: Secret::new("mongodb://localhost:27017".to_string()),
            database: "unused".to_string(),
        },
        midtrans: MidtransConfig {
            server_key: Secret::new(SERVER_KEY.to_string()),
            api_base_url: "http://127.0.0.1:1".to_string(),
            shopeepay_callback_url: "http://localhost/shopeepay/callback".to_string(),
        },
        service_name: "order-service-test".to_string(),
    }
}

fn payment_method(id: &str, kind: PaymentMethodType, identifier: Option<&str>) -> PaymentMethod {
    let now = DateTime::now();
    PaymentMethod {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        logo: None,
        payment_method_type: kind,
        midtrans_identifier: identifier.map(str::to_string),
        minimum_amount: 0,
        maximum_amount: 0,
        admin_payment_code: None,
        admin_payment_qr_code_picture: None,
        created_at: now,
        updated_at: now,
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(config: OrderServiceConfig) -> Self {
        let store = Arc::new(InMemoryOrderStore::new());
        let gateway = Arc::new(MockPaymentGateway::new());

        store
            .seed_user(User {
                id: TEST_USER_ID.to_string(),
                username: "rina".to_string(),
                email: "rina@example.com".to_string(),
                role: Default::default(),
                phone_number: "08123456789".to_string(),
            })
            .await;

        for pm in [
            payment_method("pm-bca", PaymentMethodType::VirtualAccount, Some("bca")),
            payment_method("pm-va-null", PaymentMethodType::VirtualAccount, None),
            payment_method("pm-gopay", PaymentMethodType::EWallet, Some("gopay")),
            payment_method("pm-shopeepay", PaymentMethodType::EWallet, Some("shopeepay")),
            payment_method("pm-qris", PaymentMethodType::QrCode, Some("gopay")),
            payment_method("pm-indomaret", PaymentMethodType::OverTheCounter, Some("indomaret")),
            payment_method("pm-cash", PaymentMethodType::Cash, None),
        ] {
            store.seed_payment_method(pm).await;
        }

        for (id, menu_item_id) in [("cart-1", "menu-nasi-goreng"), ("cart-2", "menu-sate")] {
            store
                .seed_cart_item(CartItem {
                    id: id.to_string(),
                    menu_item_id: menu_item_id.to_string(),
                    user_id: TEST_USER_ID.to_string(),
                    quantity: 1,
                })
                .await;
        }

        let app = Application::build_with(config, store.clone(), gateway.clone())
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            gateway,
            client,
        }
    }

    pub async fn post_order(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/v1/orders", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_webhook(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/v1/webhooks/midtrans", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// A notification body signed with the test server key.
    pub fn notification(&self, order_id: &str, transaction_status: &str, time: &str) -> Value {
        let verifier = SignatureVerifier::new(Secret::new(SERVER_KEY.to_string()));
        json!({
            "transaction_time": time,
            "transaction_status": transaction_status,
            "transaction_id": format!("tx-{}", order_id),
            "status_message": "midtrans payment notification",
            "status_code": "200",
            "signature_key": verifier.expected(order_id, "200", "32000.00"),
            "payment_type": "bank_transfer",
            "order_id": order_id,
            "merchant_id": "G000000000",
            "gross_amount": "32000.00",
            "fraud_status": "accept",
            "currency": "IDR"
        })
    }
}

pub fn order_body(payment_method_id: &str, order_type: &str) -> Value {
    json!({
        "userId": TEST_USER_ID,
        "paymentMethodId": payment_method_id,
        "orderType": order_type,
        "estimatedReadyTime": 1767225600000i64,
        "specialInstructions": "no peanuts",
        "tableReservation": {
            "tableId": "table-7",
            "reservationTime": "2026-01-01T19:00:00+07:00",
            "table": {
                "id": "table-7",
                "tableNumber": "7",
                "capacity": 4,
                "isAvailable": true,
                "location": "indoor"
            }
        },
        "orderItems": [
            {
                "menuItemId": "menu-nasi-goreng",
                "quantity": 2,
                "price": 12000,
                "total": 24000,
                "specialRequests": "extra pedas",
                "menuItem": { "id": "menu-nasi-goreng", "name": "Nasi Goreng", "price": 12000 }
            },
            {
                "menuItemId": "menu-es-teh",
                "quantity": 2,
                "price": 4000,
                "total": 8000
            }
        ]
    })
}

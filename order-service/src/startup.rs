//! HTTP server assembly: shared state, routes and listener lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::OrderServiceConfig;
use crate::handlers;
use crate::services::{
    ChargeBuilder, MidtransClient, MongoOrderStore, OrderService, OrderStore, PaymentGateway,
    PaymentMethodService, SignatureVerifier, WebhookReconciler,
};

#[derive(Clone)]
pub struct AppState {
    pub config: OrderServiceConfig,
    pub orders: OrderService,
    pub payment_methods: PaymentMethodService,
    pub reconciler: WebhookReconciler,
}

impl AppState {
    pub fn new(
        config: OrderServiceConfig,
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let charge_builder = ChargeBuilder::new(config.midtrans.shopeepay_callback_url.clone());
        let verifier = SignatureVerifier::new(config.midtrans.server_key.clone());

        Self {
            orders: OrderService::new(store.clone(), gateway, charge_builder),
            payment_methods: PaymentMethodService::new(store.clone()),
            reconciler: WebhookReconciler::new(store, verifier),
            config,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route("/v1/orders", post(handlers::orders::create_order))
        .route(
            "/v1/orders/:id",
            get(handlers::orders::get_order).patch(handlers::orders::update_order),
        )
        .route(
            "/v1/webhooks/midtrans",
            post(handlers::webhooks::midtrans_notification),
        )
        .route(
            "/v1/payment-methods",
            post(handlers::payment_methods::create_payment_method)
                .get(handlers::payment_methods::list_payment_methods),
        )
        .route(
            "/v1/payment-methods/bulk",
            post(handlers::payment_methods::create_payment_methods_bulk),
        )
        .route(
            "/v1/payment-methods/:id",
            get(handlers::payment_methods::get_payment_method)
                .put(handlers::payment_methods::update_payment_method)
                .delete(handlers::payment_methods::delete_payment_method),
        )
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Connect to MongoDB and Midtrans using the given configuration.
    pub async fn build(config: OrderServiceConfig) -> Result<Self, AppError> {
        let store = MongoOrderStore::connect(&config.mongodb).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(e.into())
        })?;

        store.init_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            AppError::DatabaseError(e.into())
        })?;

        let midtrans = MidtransClient::new(config.midtrans.clone());
        if midtrans.is_configured() {
            tracing::info!(base_url = %config.midtrans.api_base_url, "Midtrans client initialized");
        } else {
            tracing::warn!(
                "Midtrans server key not configured - charges and webhooks will be rejected"
            );
        }

        Self::build_with(config, Arc::new(store), Arc::new(midtrans)).await
    }

    /// Build around an existing store and gateway. Port 0 picks a free port.
    pub async fn build_with(
        config: OrderServiceConfig,
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let router = router(AppState::new(config, store, gateway));

        tracing::info!("Order service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}

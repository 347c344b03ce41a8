pub mod charge;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod metrics;
pub mod midtrans;
pub mod orders;
pub mod payment_methods;
pub mod reconciler;
pub mod repository;
pub mod signature;
pub mod store;

pub use charge::{ChargeBuildError, ChargeBuilder, ChargeRequest, PaymentDetails};
pub use error::OrderError;
pub use gateway::{ChargeResult, GatewayError, MockPaymentGateway, PaymentGateway};
pub use memory::InMemoryOrderStore;
pub use midtrans::MidtransClient;
pub use orders::OrderService;
pub use payment_methods::PaymentMethodService;
pub use reconciler::{WebhookOutcome, WebhookReconciler};
pub use repository::MongoOrderStore;
pub use signature::SignatureVerifier;
pub use store::{OrderStore, StoreError};

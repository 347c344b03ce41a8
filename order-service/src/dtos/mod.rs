pub mod order;
pub mod payment_method;
pub mod webhook;

pub use order::{
    CreateOrderRequest, OrderItemRequest, OrderResponse, TableReservationRequest,
    UpdateOrderRequest,
};
pub use payment_method::{
    BulkCreatePaymentMethodsRequest, CreatePaymentMethodRequest, PaymentMethodResponse,
    UpdatePaymentMethodRequest,
};
pub use webhook::{MidtransNotification, WebhookAck};

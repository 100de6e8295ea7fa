use common::razorpay::Order;
use db::models::user::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct CreateOrderRequest {
    pub plan: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateOrderResponse {
    pub success: bool,
    pub order: Order,
    /// Gateway public key id, needed by the checkout widget.
    pub key: String,
}

/// Client-submitted payment receipt. Field names follow the gateway checkout
/// callback payload. Transient: validated, then discarded.
#[derive(Debug, Deserialize)]
pub(crate) struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub plan: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyPaymentResponse {
    pub success: bool,
    pub user: User,
    pub message: String,
}

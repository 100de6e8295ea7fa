use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::{
    clerk::ClerkClient, error::Res, http::Success, jwt::SessionClaims, razorpay::RazorpayClient,
};
use sqlx::PgPool;

use crate::{
    dtos::pay::{
        CreateOrderRequest, CreateOrderResponse, VerifyPaymentRequest, VerifyPaymentResponse,
    },
    services,
};

/// Creates a payment-gateway order for a subscription plan.
///
/// # Input
/// - `claims`: session claims of the authenticated caller
/// - `req`: JSON body `{"plan": "monthly" | "quarterly" | "yearly"}`
///
/// # Output
/// - Success: `{success, order, key}` where `order` is the gateway order
///   handle and `key` the public key id for the checkout widget
/// - Error: 400 for an unknown plan (listing the valid ones), 500 when the
///   gateway is unreachable or not configured
#[post("/create-order")]
async fn post_create_order(
    _claims: web::ReqData<SessionClaims>,
    req: web::Json<CreateOrderRequest>,
    razorpay: web::Data<RazorpayClient>,
) -> Res<impl Responder> {
    let order = services::pay::create_order(&razorpay, &req.plan).await?;

    Success::ok(CreateOrderResponse {
        success: true,
        key: razorpay.key_id().to_string(),
        order,
    })
}

/// Verifies a checkout receipt and activates the premium subscription.
///
/// # Input
/// - `claims`: session claims; the grant is keyed by `claims.sub`
/// - `req`: JSON body with `razorpay_order_id`, `razorpay_payment_id`,
///   `razorpay_signature` and `plan`
///
/// # Output
/// - Success: `{success, user, message}` with the updated mirror record
/// - Error: 400 for a bad signature or unknown plan (no state change), 500
///   for persistence or identity-provider failures
#[post("/verify")]
async fn post_verify(
    claims: web::ReqData<SessionClaims>,
    req: web::Json<VerifyPaymentRequest>,
    pool: web::Data<Arc<PgPool>>,
    razorpay: web::Data<RazorpayClient>,
    clerk: web::Data<ClerkClient>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &**pool;
    let user =
        services::pay::verify_payment(pg_pool, &razorpay, &clerk, &claims.sub, &req).await?;

    Success::ok(VerifyPaymentResponse {
        success: true,
        user,
        message: "Premium subscription activated successfully!".to_string(),
    })
}

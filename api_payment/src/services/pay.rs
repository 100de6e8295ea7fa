use chrono::Utc;
use common::{
    clerk::ClerkClient,
    entitlement,
    error::{AppError, Res},
    plan::{self, Plan},
    razorpay::{Order, RazorpayClient},
};
use db::{
    dtos::user::{PremiumGrant, UserProfile},
    models::user::User,
};
use serde_json::json;
use sqlx::PgPool;

use crate::dtos::pay::VerifyPaymentRequest;

pub(crate) fn resolve_plan(name: &str) -> Res<Plan> {
    Plan::parse(name).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid plan \"{}\", available plans: {}",
            name,
            Plan::names().join(", ")
        ))
    })
}

/// Creates a gateway order for the selected plan. Unknown plans are rejected
/// before any network call; the receipt reference is derived from the current
/// time so repeated purchases never collide gateway-side.
pub(crate) async fn create_order(razorpay: &RazorpayClient, plan_name: &str) -> Res<Order> {
    let plan = resolve_plan(plan_name)?;

    if !razorpay.is_configured() {
        return Err(AppError::Internal(
            "Payment service not configured".to_string(),
        ));
    }

    let receipt = format!("receipt_{}", Utc::now().timestamp_millis());
    razorpay
        .create_order(plan.price_minor_units(), plan::CURRENCY, &receipt)
        .await
}

/// Verifies a payment receipt and grants premium.
///
/// The signature check happens before any state change; a mismatch leaves
/// both stores untouched. The local mirror write is a single atomic upsert
/// and is the source of truth for entitlement. Mirroring the grant into the
/// identity provider's metadata is best-effort: a failure there is logged and
/// the request still succeeds.
pub(crate) async fn verify_payment(
    pool: &PgPool,
    razorpay: &RazorpayClient,
    clerk: &ClerkClient,
    clerk_user_id: &str,
    receipt: &VerifyPaymentRequest,
) -> Res<User> {
    let plan = resolve_plan(&receipt.plan)?;

    let valid = razorpay.verify_payment_signature(
        &receipt.razorpay_order_id,
        &receipt.razorpay_payment_id,
        &receipt.razorpay_signature,
    )?;
    if !valid {
        return Err(AppError::BadRequest(
            "Invalid payment signature".to_string(),
        ));
    }

    let now = Utc::now();
    let expires_at = entitlement::expiry_for(plan, now);

    // profile backfill, applied only if the mirror record does not exist yet
    let clerk_user = clerk.get_user(clerk_user_id).await?;
    let grant = PremiumGrant {
        profile: UserProfile {
            clerk_id: clerk_user_id.to_string(),
            email: clerk_user.primary_email(),
            first_name: clerk_user.first_name.clone().unwrap_or_default(),
            last_name: clerk_user.last_name.clone().unwrap_or_default(),
            phone: clerk_user.primary_phone(),
            role: clerk_user.metadata_role().unwrap_or("user").to_string(),
            is_premium: true,
        },
        purchased_at: now,
        expires_at,
    };
    let user = db::user::grant_premium(pool, &grant).await?;

    let mut updates = serde_json::Map::new();
    updates.insert("isPremium".to_string(), json!(true));
    updates.insert("premiumPurchasedAt".to_string(), json!(now.to_rfc3339()));
    updates.insert(
        "premiumExpiresAt".to_string(),
        json!(expires_at.to_rfc3339()),
    );
    updates.insert("premiumPlan".to_string(), json!(plan.as_str()));
    updates.insert("premiumDuration".to_string(), json!(plan.duration_days()));
    if let Err(err) = clerk.merge_public_metadata(clerk_user_id, updates).await {
        log::error!(
            "Failed to mirror premium grant into Clerk metadata for user {}: {}",
            clerk_user_id,
            err
        );
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_plan_is_rejected() {
        let err = resolve_plan("weekly").unwrap_err();
        match err {
            AppError::BadRequest(msg) => {
                assert!(msg.contains("weekly"));
                assert!(msg.contains("monthly, quarterly, yearly"));
            }
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn known_plans_resolve() {
        assert_eq!(resolve_plan("quarterly").unwrap(), Plan::Quarterly);
    }
}

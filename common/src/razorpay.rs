//! Razorpay payment gateway client.
//!
//! Covers the two interactions this service has with the gateway: creating an
//! order for a fixed amount, and recomputing the payment signature that the
//! checkout widget hands back to the client.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{
    env_config::RazorpayConfig,
    error::{AppError, Res},
};

type HmacSha256 = Hmac<Sha256>;

/// Gateway-issued order record. Opaque to this system beyond echoing it back
/// to the client; never persisted locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

#[derive(Clone)]
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
    api_url: String,
}

impl RazorpayClient {
    pub fn new(config: &RazorpayConfig) -> Self {
        RazorpayClient {
            http: reqwest::Client::new(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Public key id, needed by the client to open the checkout widget.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn is_configured(&self) -> bool {
        !self.key_id.is_empty() && !self.key_secret.is_empty()
    }

    /// Creates a gateway order for `amount` minor units. The receipt
    /// reference must be unique per call to avoid gateway-side idempotency
    /// collisions.
    pub async fn create_order(&self, amount: i64, currency: &str, receipt: &str) -> Res<Order> {
        let response = self
            .http
            .post(format!("{}/orders", self.api_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&serde_json::json!({
                "amount": amount,
                "currency": currency,
                "receipt": receipt,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Razorpay order creation failed ({}): {}",
                status, body
            )));
        }

        response.json::<Order>().await.map_err(AppError::from)
    }

    /// Checks a client-submitted payment signature against the one recomputed
    /// from the shared secret. Comparison is constant-time.
    pub fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Res<bool> {
        let expected = expected_signature(&self.key_secret, order_id, payment_id)?;
        Ok(expected.as_bytes().ct_eq(signature.as_bytes()).into())
    }
}

/// Hex-encoded HMAC-SHA256 over `"{order_id}|{payment_id}"`, keyed by the
/// gateway shared secret. This is the signature scheme the gateway uses for
/// checkout receipts.
pub fn expected_signature(secret: &str, order_id: &str, payment_id: &str) -> Res<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid payment secret key: {}", e)))?;
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(secret: &str) -> RazorpayClient {
        RazorpayClient::new(&RazorpayConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: secret.to_string(),
            api_url: "https://api.razorpay.com/v1".to_string(),
        })
    }

    #[test]
    fn signature_is_deterministic() {
        let a = expected_signature("secret", "order_1", "pay_1").unwrap();
        let b = expected_signature("secret", "order_1", "pay_1").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // hex-encoded SHA-256
    }

    #[test]
    fn accepts_matching_signature() {
        let client = client("secret");
        let signature = expected_signature("secret", "order_abc", "pay_xyz").unwrap();
        assert!(client
            .verify_payment_signature("order_abc", "pay_xyz", &signature)
            .unwrap());
    }

    #[test]
    fn rejects_tampered_signature() {
        let client = client("secret");
        let mut signature = expected_signature("secret", "order_abc", "pay_xyz").unwrap();
        // flip a single hex digit
        let last = signature.pop().unwrap();
        signature.push(if last == '0' { '1' } else { '0' });
        assert!(!client
            .verify_payment_signature("order_abc", "pay_xyz", &signature)
            .unwrap());
    }

    #[test]
    fn rejects_signature_for_different_receipt() {
        let client = client("secret");
        let signature = expected_signature("secret", "order_abc", "pay_xyz").unwrap();
        assert!(!client
            .verify_payment_signature("order_abc", "pay_other", &signature)
            .unwrap());
        assert!(!client
            .verify_payment_signature("order_other", "pay_xyz", &signature)
            .unwrap());
    }

    #[test]
    fn rejects_signature_made_with_wrong_secret() {
        let client = client("secret");
        let signature = expected_signature("other-secret", "order_abc", "pay_xyz").unwrap();
        assert!(!client
            .verify_payment_signature("order_abc", "pay_xyz", &signature)
            .unwrap());
    }
}

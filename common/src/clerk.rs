//! Clerk identity provider client and webhook envelope verification.
//!
//! The provider owns user accounts and a public-metadata bag per user. This
//! service reads profile fields and `role`/`isPremium` from it, and writes
//! entitlement keys back after a verified purchase. Metadata writes always
//! merge with the current bag so unrelated keys survive.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{
    env_config::ClerkConfig,
    error::{AppError, Res},
};

type HmacSha256 = Hmac<Sha256>;

/// Inbound webhook timestamps older or newer than this are rejected.
const WEBHOOK_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAddress {
    pub email_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub phone_number: String,
}

/// Provider-side user object, as returned by the backend API and carried in
/// `user.*` webhook payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClerkUser {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default)]
    pub public_metadata: Map<String, Value>,
}

impl ClerkUser {
    pub fn primary_email(&self) -> String {
        self.email_addresses
            .first()
            .map(|e| e.email_address.clone())
            .unwrap_or_default()
    }

    pub fn primary_phone(&self) -> Option<String> {
        self.phone_numbers.first().map(|p| p.phone_number.clone())
    }

    pub fn metadata_role(&self) -> Option<&str> {
        self.public_metadata.get("role").and_then(Value::as_str)
    }

    pub fn metadata_is_premium(&self) -> Option<bool> {
        self.public_metadata.get("isPremium").and_then(Value::as_bool)
    }
}

/// Webhook envelope. `data` stays untyped until the event kind is known;
/// only `user.created` / `user.updated` carry a user object.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
}

#[derive(Clone)]
pub struct ClerkClient {
    http: reqwest::Client,
    secret_key: String,
    api_url: String,
}

impl ClerkClient {
    pub fn new(config: &ClerkConfig) -> Self {
        ClerkClient {
            http: reqwest::Client::new(),
            secret_key: config.secret_key.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches the provider's user object.
    pub async fn get_user(&self, user_id: &str) -> Res<ClerkUser> {
        let response = self
            .http
            .get(format!("{}/users/{}", self.api_url, user_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Clerk user {}", user_id)));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Clerk user lookup failed ({}): {}",
                status, body
            )));
        }

        response.json::<ClerkUser>().await.map_err(AppError::from)
    }

    /// Writes `updates` into the user's public metadata, preserving every key
    /// the update does not carry: read current bag, compute the field-level
    /// union with new values winning, write back the union.
    pub async fn merge_public_metadata(
        &self,
        user_id: &str,
        updates: Map<String, Value>,
    ) -> Res<()> {
        let current = self.get_user(user_id).await?.public_metadata;
        let merged = merge_metadata(current, updates);

        let response = self
            .http
            .patch(format!("{}/users/{}/metadata", self.api_url, user_id))
            .bearer_auth(&self.secret_key)
            .json(&serde_json::json!({ "public_metadata": merged }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Clerk metadata update failed ({}): {}",
                status, body
            )));
        }

        Ok(())
    }
}

/// Field-level union of two metadata bags. Values from `updates` win only for
/// the keys they carry.
pub fn merge_metadata(
    mut current: Map<String, Value>,
    updates: Map<String, Value>,
) -> Map<String, Value> {
    for (key, value) in updates {
        current.insert(key, value);
    }
    current
}

/// Verifies a Svix-signed webhook envelope and parses it.
///
/// The signed content is `{id}.{timestamp}.{payload}`, keyed by the
/// base64-decoded part of the `whsec_...` signing secret. The signature
/// header carries a space-delimited list of `v1,<base64>` entries; the
/// envelope is accepted when any of them matches, compared constant-time.
pub fn verify_webhook(
    payload: &[u8],
    msg_id: &str,
    timestamp: &str,
    signature_header: &str,
    signing_secret: &str,
) -> Res<WebhookEvent> {
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid webhook timestamp".to_string()))?;
    if (Utc::now().timestamp() - ts).abs() > WEBHOOK_TOLERANCE_SECS {
        return Err(AppError::BadRequest(
            "Webhook timestamp outside tolerance".to_string(),
        ));
    }

    let secret = signing_secret.strip_prefix("whsec_").unwrap_or(signing_secret);
    let key = BASE64
        .decode(secret)
        .map_err(|_| AppError::Internal("Invalid webhook signing secret".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(&key)
        .map_err(|e| AppError::Internal(format!("Invalid webhook signing key: {}", e)))?;
    mac.update(format!("{}.{}.", msg_id, timestamp).as_bytes());
    mac.update(payload);
    let expected = BASE64.encode(mac.finalize().into_bytes());

    let matched = signature_header
        .split_whitespace()
        .filter_map(|entry| entry.split_once(','))
        .filter(|(version, _)| *version == "v1")
        .any(|(_, signature)| bool::from(expected.as_bytes().ct_eq(signature.as_bytes())));

    if !matched {
        return Err(AppError::BadRequest(
            "Invalid webhook signature".to_string(),
        ));
    }

    serde_json::from_slice(payload)
        .map_err(|e| AppError::BadRequest(format!("Malformed webhook payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signing_secret(key: &[u8]) -> String {
        format!("whsec_{}", BASE64.encode(key))
    }

    fn sign(key: &[u8], msg_id: &str, timestamp: &str, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(key).unwrap();
        mac.update(format!("{}.{}.", msg_id, timestamp).as_bytes());
        mac.update(payload);
        BASE64.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn verifies_a_signed_envelope() {
        let key = b"webhook-test-key";
        let payload = json!({"type": "user.created", "data": {"id": "user_1"}}).to_string();
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(key, "msg_1", &timestamp, payload.as_bytes());

        let event = verify_webhook(
            payload.as_bytes(),
            "msg_1",
            &timestamp,
            &format!("v1,{}", signature),
            &signing_secret(key),
        )
        .unwrap();
        assert_eq!(event.kind, "user.created");
    }

    #[test]
    fn accepts_any_matching_entry_in_the_signature_list() {
        let key = b"webhook-test-key";
        let payload = json!({"type": "user.updated", "data": {"id": "user_1"}}).to_string();
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(key, "msg_1", &timestamp, payload.as_bytes());

        let header = format!("v1,bm90LXRoZS1zaWduYXR1cmU= v1,{}", signature);
        assert!(verify_webhook(
            payload.as_bytes(),
            "msg_1",
            &timestamp,
            &header,
            &signing_secret(key),
        )
        .is_ok());
    }

    #[test]
    fn rejects_tampered_payload() {
        let key = b"webhook-test-key";
        let payload = json!({"type": "user.created", "data": {"id": "user_1"}}).to_string();
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(key, "msg_1", &timestamp, payload.as_bytes());

        let tampered = payload.replace("user_1", "user_2");
        assert!(verify_webhook(
            tampered.as_bytes(),
            "msg_1",
            &timestamp,
            &format!("v1,{}", signature),
            &signing_secret(key),
        )
        .is_err());
    }

    #[test]
    fn rejects_unknown_signature_version() {
        let key = b"webhook-test-key";
        let payload = b"{}";
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(key, "msg_1", &timestamp, payload);

        assert!(verify_webhook(
            payload,
            "msg_1",
            &timestamp,
            &format!("v2,{}", signature),
            &signing_secret(key),
        )
        .is_err());
    }

    #[test]
    fn rejects_stale_timestamp() {
        let key = b"webhook-test-key";
        let payload = b"{}";
        let timestamp = (Utc::now().timestamp() - 3600).to_string();
        let signature = sign(key, "msg_1", &timestamp, payload);

        assert!(verify_webhook(
            payload,
            "msg_1",
            &timestamp,
            &format!("v1,{}", signature),
            &signing_secret(key),
        )
        .is_err());
    }

    #[test]
    fn merge_preserves_unrelated_keys() {
        let mut current = Map::new();
        current.insert("role".to_string(), json!("admin"));
        current.insert("referral".to_string(), json!("campaign-7"));

        let mut updates = Map::new();
        updates.insert("isPremium".to_string(), json!(true));
        updates.insert("premiumPlan".to_string(), json!("monthly"));

        let merged = merge_metadata(current, updates);
        assert_eq!(merged.get("role"), Some(&json!("admin")));
        assert_eq!(merged.get("referral"), Some(&json!("campaign-7")));
        assert_eq!(merged.get("isPremium"), Some(&json!(true)));
        assert_eq!(merged.get("premiumPlan"), Some(&json!("monthly")));
    }

    #[test]
    fn merge_lets_new_values_win_for_their_keys() {
        let mut current = Map::new();
        current.insert("isPremium".to_string(), json!(false));

        let mut updates = Map::new();
        updates.insert("isPremium".to_string(), json!(true));

        let merged = merge_metadata(current, updates);
        assert_eq!(merged.get("isPremium"), Some(&json!(true)));
    }

    #[test]
    fn deserializes_a_sparse_user_object() {
        let user: ClerkUser = serde_json::from_value(json!({"id": "user_1"})).unwrap();
        assert_eq!(user.primary_email(), "");
        assert_eq!(user.primary_phone(), None);
        assert_eq!(user.metadata_role(), None);
        assert_eq!(user.metadata_is_premium(), None);
    }

    #[test]
    fn reads_profile_and_metadata_fields() {
        let user: ClerkUser = serde_json::from_value(json!({
            "id": "user_1",
            "email_addresses": [{"email_address": "a@b.c"}],
            "first_name": "Asha",
            "last_name": "Rao",
            "phone_numbers": [{"phone_number": "+911234567890"}],
            "public_metadata": {"role": "admin", "isPremium": true}
        }))
        .unwrap();
        assert_eq!(user.primary_email(), "a@b.c");
        assert_eq!(user.primary_phone().as_deref(), Some("+911234567890"));
        assert_eq!(user.metadata_role(), Some("admin"));
        assert_eq!(user.metadata_is_premium(), Some(true));
    }
}

use common::{
    clerk::{ClerkClient, ClerkUser, WebhookEvent},
    error::{AppError, Res},
};
use db::{dtos::user::UserProfile, models::user::User};
use serde_json::json;
use sqlx::PgPool;

/// Maps a provider user object onto mirror profile fields, applying the
/// defaults for absent metadata: role "user", not premium.
pub(crate) fn profile_from_clerk(user: &ClerkUser) -> UserProfile {
    UserProfile {
        clerk_id: user.id.clone(),
        email: user.primary_email(),
        first_name: user.first_name.clone().unwrap_or_default(),
        last_name: user.last_name.clone().unwrap_or_default(),
        phone: user.primary_phone(),
        role: user.metadata_role().unwrap_or("user").to_string(),
        is_premium: user.metadata_is_premium().unwrap_or(false),
    }
}

/// Ensures the caller has a mirror record. Existing record: no-op read.
/// Missing: fetch the provider profile and create one, then run the
/// first-login role assignment.
pub(crate) async fn sync_user(
    pool: &PgPool,
    clerk: &ClerkClient,
    clerk_user_id: &str,
) -> Res<User> {
    if let Some(user) = db::user::get_user_by_clerk_id(pool, clerk_user_id).await? {
        return Ok(user);
    }

    let clerk_user = clerk.get_user(clerk_user_id).await?;
    let profile = profile_from_clerk(&clerk_user);

    // a concurrent webhook upsert may win the insert; use its row then
    let user = match db::user::insert_user_if_absent(pool, &profile).await? {
        Some(user) => user,
        None => db::user::get_user_by_clerk_id(pool, clerk_user_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("User {} vanished during sync", clerk_user_id))
            })?,
    };

    // Best-effort: the mirror record above already carries the defaults.
    if let Err(err) = ensure_default_role(clerk, &clerk_user).await {
        log::warn!(
            "Failed to assign default role for user {}: {}",
            clerk_user_id,
            err
        );
    }

    Ok(user)
}

/// First-login role assignment in the identity provider: fill missing
/// metadata keys only. An existing role is never overwritten, and an already
/// set isPremium flag is left alone.
async fn ensure_default_role(clerk: &ClerkClient, clerk_user: &ClerkUser) -> Res<()> {
    if clerk_user.metadata_role().is_some() {
        return Ok(());
    }

    let mut updates = serde_json::Map::new();
    updates.insert("role".to_string(), json!("user"));
    if !clerk_user.public_metadata.contains_key("isPremium") {
        updates.insert("isPremium".to_string(), json!(false));
    }
    clerk.merge_public_metadata(&clerk_user.id, updates).await
}

/// Applies a verified webhook event to the identity mirror. Only
/// `user.created` and `user.updated` mutate state; every other kind is
/// accepted and ignored.
pub(crate) async fn process_webhook_event(pool: &PgPool, event: WebhookEvent) -> Res<()> {
    match event.kind.as_str() {
        "user.created" | "user.updated" => {
            let clerk_user: ClerkUser = serde_json::from_value(event.data)
                .map_err(|e| AppError::BadRequest(format!("Malformed user payload: {}", e)))?;
            let profile = profile_from_clerk(&clerk_user);
            db::user::upsert_profile(pool, &profile).await?;
            log::info!("Synced webhook profile for user {}", profile.clerk_id);
        }
        other => {
            log::info!("Ignoring webhook event kind: {}", other);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[actix_web::test]
    async fn unrecognized_webhook_kind_is_ignored() {
        // lazy pool, never connected; any row access would error out
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unreachable")
            .unwrap();
        let event = WebhookEvent {
            kind: "session.created".to_string(),
            data: json!({"id": "sess_1"}),
        };
        assert!(process_webhook_event(&pool, event).await.is_ok());
    }

    #[test]
    fn profile_defaults_when_metadata_is_absent() {
        let clerk_user: ClerkUser = serde_json::from_value(json!({
            "id": "user_1",
            "email_addresses": [{"email_address": "a@b.c"}]
        }))
        .unwrap();

        let profile = profile_from_clerk(&clerk_user);
        assert_eq!(profile.clerk_id, "user_1");
        assert_eq!(profile.email, "a@b.c");
        assert_eq!(profile.role, "user");
        assert!(!profile.is_premium);
        assert_eq!(profile.phone, None);
    }

    #[test]
    fn profile_carries_provider_metadata() {
        let clerk_user: ClerkUser = serde_json::from_value(json!({
            "id": "user_2",
            "first_name": "Asha",
            "last_name": "Rao",
            "phone_numbers": [{"phone_number": "+911234567890"}],
            "public_metadata": {"role": "admin", "isPremium": true}
        }))
        .unwrap();

        let profile = profile_from_clerk(&clerk_user);
        assert_eq!(profile.first_name, "Asha");
        assert_eq!(profile.last_name, "Rao");
        assert_eq!(profile.phone.as_deref(), Some("+911234567890"));
        assert_eq!(profile.role, "admin");
        assert!(profile.is_premium);
    }
}

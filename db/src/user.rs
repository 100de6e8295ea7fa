use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};

use crate::{
    dtos::user::{PremiumGrant, UserProfile},
    models::user::User,
};

pub async fn get_user_by_clerk_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    clerk_id: &str,
) -> Res<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE clerk_id = $1")
        .bind(clerk_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// Creates the mirror record unless it already exists. Returns `None` when a
/// concurrent writer won the insert; callers re-read in that case.
pub async fn insert_user_if_absent<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    profile: &UserProfile,
) -> Res<Option<User>> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (clerk_id, email, first_name, last_name, phone, role, is_premium)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (clerk_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(&profile.clerk_id)
    .bind(&profile.email)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(&profile.phone)
    .bind(&profile.role)
    .bind(profile.is_premium)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

/// Webhook upsert: the event is authoritative for profile data, so those
/// fields are overwritten. Premium timestamps are untouched; only a verified
/// payment writes them.
pub async fn upsert_profile<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    profile: &UserProfile,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (clerk_id, email, first_name, last_name, phone, role, is_premium)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (clerk_id) DO UPDATE SET
            email = EXCLUDED.email,
            first_name = EXCLUDED.first_name,
            last_name = EXCLUDED.last_name,
            phone = EXCLUDED.phone,
            role = EXCLUDED.role,
            is_premium = EXCLUDED.is_premium,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(&profile.clerk_id)
    .bind(&profile.email)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(&profile.phone)
    .bind(&profile.role)
    .bind(profile.is_premium)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Grants premium in a single atomic statement keyed on clerk_id. Concurrent
/// verifications for the same user converge to one consistent row instead of
/// interleaving partial writes. Profile fields are backfilled only on insert.
pub async fn grant_premium<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    grant: &PremiumGrant,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (clerk_id, email, first_name, last_name, phone, role,
                           is_premium, premium_purchased_at, premium_expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8)
        ON CONFLICT (clerk_id) DO UPDATE SET
            is_premium = TRUE,
            premium_purchased_at = EXCLUDED.premium_purchased_at,
            premium_expires_at = EXCLUDED.premium_expires_at,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(&grant.profile.clerk_id)
    .bind(&grant.profile.email)
    .bind(&grant.profile.first_name)
    .bind(&grant.profile.last_name)
    .bind(&grant.profile.phone)
    .bind(&grant.profile.role)
    .bind(grant.purchased_at)
    .bind(grant.expires_at)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::{clerk::ClerkClient, error::Res, http::Success, jwt::SessionClaims};
use sqlx::PgPool;

use crate::{dtos::user::SyncResponse, services};

/// Ensures the authenticated caller has an identity-mirror record.
///
/// Idempotent: an existing record is returned as-is; a missing one is created
/// from the identity provider's profile, with role defaulting to "user" and
/// premium defaulting to off when absent upstream.
#[post("/sync")]
async fn post_sync(
    claims: web::ReqData<SessionClaims>,
    pool: web::Data<Arc<PgPool>>,
    clerk: web::Data<ClerkClient>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &**pool;
    let user = services::user::sync_user(pg_pool, &clerk, &claims.sub).await?;

    Success::ok(SyncResponse {
        message: "User synced".to_string(),
        user,
    })
}

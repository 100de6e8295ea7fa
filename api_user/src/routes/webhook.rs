use std::sync::Arc;

use actix_web::{Responder, http::header::HeaderMap, post, web};
use common::{
    clerk,
    env_config::Config,
    error::{AppError, Res},
    http::Success,
};
use sqlx::PgPool;

use crate::services;

/// Identity-provider webhook endpoint.
///
/// Called by the provider, not by the frontend; the envelope is Svix-signed
/// with the secret configured in the provider dashboard. A bad signature is a
/// 400 with no state change; recognized user events upsert the identity
/// mirror, everything else is acknowledged and ignored.
#[post("/clerk")]
async fn post_clerk(
    payload: web::Bytes,
    req: actix_web::HttpRequest,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let headers = req.headers();
    let msg_id = header_str(headers, "svix-id")?;
    let timestamp = header_str(headers, "svix-timestamp")?;
    let signature = header_str(headers, "svix-signature")?;

    let event = clerk::verify_webhook(
        &payload,
        msg_id,
        timestamp,
        signature,
        &config.clerk.webhook_signing_secret,
    )?;

    let pg_pool: &PgPool = &**pool;
    services::user::process_webhook_event(pg_pool, event).await?;

    Success::ok("Webhook processed")
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Res<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::BadRequest(format!("Missing {} header", name)))
}

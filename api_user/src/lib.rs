use actix_web::web::{self};

use crate::middleware::auth::AuthMiddleware;

pub mod routes {
    pub mod user;
    pub mod webhook;
}

mod services {
    pub(crate) mod user;
}

mod dtos {
    pub(crate) mod user;
}

pub mod middleware {
    pub mod auth;
}

pub fn mount_user() -> actix_web::Scope {
    web::scope("/user").service(routes::user::post_sync)
}

/// Provider-signed webhooks; mounted outside the session-auth scope.
pub fn mount_webhook() -> actix_web::Scope {
    web::scope("/user/webhooks").service(routes::webhook::post_clerk)
}

pub fn auth_middleware(jwt_public_key: String) -> AuthMiddleware {
    AuthMiddleware::new(jwt_public_key)
}

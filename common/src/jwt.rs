use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::Res;

/// Claims carried by a Clerk session JWT. `sub` is the external user id that
/// keys the identity mirror.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: usize,
}

/// Extracts claims from a session token issued by the identity provider.
/// Tokens are RS256-signed; validation happens locally against the instance
/// public key, no network call.
pub fn validate_session_token(token: &str, public_key_pem: &str) -> Res<SessionClaims> {
    let key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?;
    let token_data =
        jsonwebtoken::decode::<SessionClaims>(token, &key, &Validation::new(Algorithm::RS256))?;
    Ok(token_data.claims)
}

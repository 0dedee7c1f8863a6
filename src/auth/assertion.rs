use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use tracing::debug;

use crate::auth::error::AuthError;
use crate::config::credentials::ServiceCredentials;

/// Assertion lifetime declared in the `exp` claim.
pub const ASSERTION_LIFETIME_SECONDS: u64 = 3600;

/// Claim set of the JWT-bearer assertion. Built per exchange, signed,
/// consumed in one request and discarded. Never persisted.
#[derive(Debug, Serialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub scope: String,
    pub iat: u64,
    pub exp: u64,
}

impl AssertionClaims {
    pub fn new(credentials: &ServiceCredentials, scope: &str, now_unix_ts: u64) -> Self {
        Self {
            iss: credentials.integration_key.clone(),
            sub: credentials.impersonated_user_id.clone(),
            aud: credentials.auth_server_host.clone(),
            scope: scope.to_string(),
            iat: now_unix_ts,
            exp: now_unix_ts + ASSERTION_LIFETIME_SECONDS,
        }
    }
}

/// Sign the claim set with RSA-SHA256 using an already-normalized PEM key.
///
/// A key that does not parse as RSA is a configuration error, not a retry
/// case: no amount of network traffic fixes bad key material.
pub fn sign_assertion(claims: &AssertionClaims, private_key_pem: &str) -> Result<String, AuthError> {
    let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).map_err(|err| {
        AuthError::configuration(format!("private key did not parse as RSA: {}", err))
    })?;

    let assertion = encode(&Header::new(Algorithm::RS256), claims, &encoding_key)
        .map_err(|err| AuthError::configuration(format!("failed to sign assertion: {}", err)))?;

    debug!(
        iss = %claims.iss,
        aud = %claims.aud,
        scope = %claims.scope,
        assertion_length = assertion.len(),
        "assertion signed"
    );
    Ok(assertion)
}

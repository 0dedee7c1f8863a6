use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::assertion::{sign_assertion, AssertionClaims};
use crate::auth::auth_base_url;
use crate::auth::consent::{build_consent_url, CONSENT_SCOPE};
use crate::auth::error::AuthError;
use crate::auth::key::normalize_private_key;
use crate::cache::token::CachedToken;
use crate::config::credentials::ServiceCredentials;
use crate::config::settings::Settings;
use crate::helpers::time::{Clock, SystemClock};

pub const GRANT_TYPE_JWT_BEARER: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

const CONSENT_REQUIRED_ERROR: &str = "consent_required";

/// Success body of the token endpoint. Other response fields are ignored.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Produces bearer access tokens for the signing API.
///
/// Owns the single cached-token slot. The whole check-then-refresh-then-store
/// sequence runs under one async mutex, so concurrent callers either observe
/// a freshly stored token or wait for the single in-flight exchange instead
/// of each paying a signed round-trip.
pub struct TokenProvider {
    credentials: ServiceCredentials,
    settings: Settings,
    client: Client,
    clock: Arc<dyn Clock>,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(credentials: ServiceCredentials, settings: Settings) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(settings.exchange_timeout)
            .build()
            .map_err(|err| {
                AuthError::configuration(format!("failed to build HTTP client: {}", err))
            })?;
        Ok(Self {
            credentials,
            settings,
            client,
            clock: Arc::new(SystemClock),
            cache: Mutex::new(None),
        })
    }

    /// Replace the wall clock, letting expiry be driven by virtual time.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn credentials(&self) -> &ServiceCredentials {
        &self.credentials
    }

    /// Return a valid bearer token, serving the cached one when it is still
    /// inside its usable window and exchanging a fresh signed assertion
    /// otherwise.
    pub async fn get_access_token(&self) -> Result<String, AuthError> {
        self.check_credentials()?;

        let mut slot = self.cache.lock().await;
        let now = self.clock.now_unix_ts();
        if let Some(cached) = slot.as_ref() {
            if cached.is_usable(now) {
                debug!(
                    expires_at = cached.expires_at_unix_ts,
                    "serving cached access token"
                );
                return Ok(cached.access_token.clone());
            }
        }

        // Clear before exchanging: an aborted or failed refresh must never
        // leave a stale entry that the next call would short-circuit to.
        *slot = None;

        let refreshed = self.exchange().await?;
        let access_token = refreshed.access_token.clone();
        info!(
            expires_at = refreshed.expires_at_unix_ts,
            token_length = access_token.len(),
            "access token refreshed"
        );
        *slot = Some(refreshed);
        Ok(access_token)
    }

    /// Drop the cached token and perform an exchange unconditionally, even
    /// if the cached entry is still inside its window.
    pub async fn refresh_access_token(&self) -> Result<String, AuthError> {
        self.check_credentials()?;

        let mut slot = self.cache.lock().await;
        *slot = None;

        let refreshed = self.exchange().await?;
        let access_token = refreshed.access_token.clone();
        info!(
            expires_at = refreshed.expires_at_unix_ts,
            "access token force-refreshed"
        );
        *slot = Some(refreshed);
        Ok(access_token)
    }

    /// Drop the cached token so the next caller performs a fresh exchange.
    pub async fn invalidate(&self) {
        let mut slot = self.cache.lock().await;
        *slot = None;
        debug!("cached access token invalidated");
    }

    /// Authorization-grant URL for a one-time operator consent. Pure
    /// function of configuration, usable proactively before the first
    /// exchange ever fails.
    pub fn consent_url(&self) -> Result<String, AuthError> {
        build_consent_url(
            &self.credentials.integration_key,
            &self.credentials.auth_server_host,
            &self.settings.consent_redirect_uri,
            CONSENT_SCOPE,
        )
    }

    fn check_credentials(&self) -> Result<(), AuthError> {
        let missing = self.credentials.missing_fields();
        if missing.is_empty() {
            return Ok(());
        }
        debug!(credentials = ?self.credentials, "credential check failed");
        Err(AuthError::configuration(format!(
            "missing credentials: {}",
            missing.join(", ")
        )))
    }

    async fn exchange(&self) -> Result<CachedToken, AuthError> {
        let private_key_pem = normalize_private_key(&self.credentials.private_key)?;
        let claims = AssertionClaims::new(
            &self.credentials,
            &self.settings.scope,
            self.clock.now_unix_ts(),
        );
        let assertion = sign_assertion(&claims, &private_key_pem)?;

        let token_url = format!(
            "{}/oauth/token",
            auth_base_url(&self.credentials.auth_server_host)
        );
        debug!(%token_url, "exchanging assertion for access token");

        let form = [
            ("grant_type", GRANT_TYPE_JWT_BEARER),
            ("assertion", assertion.as_str()),
        ];
        let response = self
            .client
            .post(&token_url)
            .form(&form)
            .send()
            .await
            .map_err(AuthError::Transient)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or(serde_json::Value::Null);

            if detail.get("error").and_then(serde_json::Value::as_str)
                == Some(CONSENT_REQUIRED_ERROR)
            {
                warn!("authorization server requires a one-time operator consent grant");
                return Err(AuthError::ConsentRequired {
                    consent_url: self.consent_url()?,
                    detail,
                });
            }

            warn!(status = status.as_u16(), "token exchange rejected");
            return Err(AuthError::AuthServer {
                status: status.as_u16(),
                detail,
            });
        }

        let body: TokenResponse = response.json().await.map_err(|err| AuthError::AuthServer {
            status: status.as_u16(),
            detail: serde_json::json!({
                "error": "invalid_token_response",
                "error_description": err.to_string(),
            }),
        })?;

        Ok(CachedToken::new(
            body.access_token,
            body.expires_in,
            self.settings.safety_margin_seconds,
            self.clock.now_unix_ts(),
        ))
    }
}

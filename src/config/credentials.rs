use std::fmt;

/// ================================
/// Service-account credentials
/// ================================

/// Sandbox/demo authorization server, the default target.
pub const SANDBOX_AUTH_HOST: &str = "account-d.docusign.com";
/// Production authorization server.
pub const PRODUCTION_AUTH_HOST: &str = "account.docusign.com";

/// Credentials of the registered client application, loaded once and
/// immutable for the process lifetime.
#[derive(Clone)]
pub struct ServiceCredentials {
    /// Identifier of the registered client application (issuer claim).
    pub integration_key: String,
    /// Identifier of the account being impersonated (subject claim).
    pub impersonated_user_id: String,
    /// RSA private key in PEM encoding, possibly escape-mangled in transit.
    pub private_key: String,
    /// Authorization-server hostname; sandbox and production differ.
    pub auth_server_host: String,
    /// Used by callers building signing-API payloads, never by the token
    /// provider itself.
    pub account_id: Option<String>,
}

impl ServiceCredentials {
    /// Names of the credential fields a token exchange cannot run without.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.integration_key.is_empty() {
            missing.push("integration_key");
        }
        if self.impersonated_user_id.is_empty() {
            missing.push("impersonated_user_id");
        }
        if self.private_key.is_empty() {
            missing.push("private_key");
        }
        missing
    }
}

// Manual Debug: key material must never leak through debug logging, only
// structural facts.
impl fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("integration_key_length", &self.integration_key.len())
            .field(
                "impersonated_user_id_length",
                &self.impersonated_user_id.len(),
            )
            .field("private_key_length", &self.private_key.len())
            .field(
                "private_key_has_pem_marker",
                &self.private_key.contains("-----BEGIN"),
            )
            .field("auth_server_host", &self.auth_server_host)
            .field("has_account_id", &self.account_id.is_some())
            .finish()
    }
}

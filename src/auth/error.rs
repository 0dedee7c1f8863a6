use thiserror::Error;

/// Failure taxonomy for token acquisition.
///
/// Callers branch on the variant: `Configuration` is fatal and never worth
/// retrying, `ConsentRequired` must be surfaced to a human operator,
/// `AuthServer` is left to the caller's judgement, and `Transient` is safe
/// to retry with backoff.
///
/// Display output never contains key material or token values.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or malformed credentials or key material.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// The authorization server demands a one-time human consent grant.
    #[error("consent required, direct an operator to the consent URL")]
    ConsentRequired {
        consent_url: String,
        detail: serde_json::Value,
    },

    /// Any other non-success response from the token endpoint.
    #[error("authorization server rejected the token exchange (status {status})")]
    AuthServer {
        status: u16,
        detail: serde_json::Value,
    },

    /// Timeout, connect failure or cancellation during the exchange.
    #[error("token exchange did not complete: {0}")]
    Transient(#[source] reqwest::Error),
}

impl AuthError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// True when retrying the call could plausibly succeed without any
    /// operator intervention.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

use std::time::Duration;

use clap::ValueEnum;

/// ================================
/// Agent-wide settings
/// ================================

pub const SAFETY_MARGIN_SECONDS_DEFAULT: u64 = 300;
pub const EXCHANGE_TIMEOUT_SECONDS_DEFAULT: u64 = 30;
pub const CONSENT_REDIRECT_URI_DEFAULT: &str = "http://localhost:3000/oauth/callback";
pub const TOKEN_SCOPE_DEFAULT: &str = "signature";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Early-expiry buffer subtracted from the server-declared lifetime so a
    /// token is never used right up against real expiry.
    pub safety_margin_seconds: u64,
    /// Deadline on the outbound token exchange.
    pub exchange_timeout: Duration,
    /// Space-separated capability list requested in the assertion.
    pub scope: String,
    /// Callback the consent grant redirects the operator's browser to.
    pub consent_redirect_uri: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            safety_margin_seconds: SAFETY_MARGIN_SECONDS_DEFAULT,
            exchange_timeout: Duration::from_secs(EXCHANGE_TIMEOUT_SECONDS_DEFAULT),
            scope: TOKEN_SCOPE_DEFAULT.to_string(),
            consent_redirect_uri: CONSENT_REDIRECT_URI_DEFAULT.to_string(),
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Compact,
}

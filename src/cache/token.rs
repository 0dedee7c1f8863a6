/// Cached bearer token with its computed usability deadline.
///
/// `expires_at_unix_ts` is already net of the safety margin, so the slot
/// holder only compares against the clock. Replaced wholesale on refresh,
/// cleared entirely on any exchange error.
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at_unix_ts: u64,
}

impl CachedToken {
    pub fn new(
        access_token: String,
        expires_in_seconds: u64,
        safety_margin_seconds: u64,
        now_unix_ts: u64,
    ) -> Self {
        // a lifetime shorter than the margin yields an already-stale entry
        let usable_for = expires_in_seconds.saturating_sub(safety_margin_seconds);
        Self {
            access_token,
            expires_at_unix_ts: now_unix_ts.saturating_add(usable_for),
        }
    }

    /// Check if the token can still be served.
    pub fn is_usable(&self, now_unix_ts: u64) -> bool {
        now_unix_ts < self.expires_at_unix_ts
    }
}

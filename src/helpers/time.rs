use chrono::Utc;

/// Clock seam so expiry behavior can be driven by virtual time in tests.
pub trait Clock: Send + Sync {
    fn now_unix_ts(&self) -> u64;
}

/// Wall-clock implementation used everywhere outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_ts(&self) -> u64 {
        now_u64()
    }
}

pub fn now_u64() -> u64 {
    now_i64().max(0) as u64
}

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

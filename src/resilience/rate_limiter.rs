use crate::api::RemoApi;
use crate::types::User;
use crate::Result;
use reqwest::header::HeaderMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const LIMIT_HEADER: &str = "x-rate-limit-limit";
pub const REMAINING_HEADER: &str = "x-rate-limit-remaining";
pub const RESET_HEADER: &str = "x-rate-limit-reset";

/// Last rate-limit state reported by the server.
///
/// Replaced wholesale after every response; fields are `None` until the
/// server has reported them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    pub reset_at: Option<SystemTime>,
}

impl RateLimitSnapshot {
    pub fn new(remaining: u64, reset_at: SystemTime) -> Self {
        Self {
            limit: None,
            remaining: Some(remaining),
            reset_at: Some(reset_at),
        }
    }

    /// Snapshot whose window resets `after` from now.
    pub fn resetting_in(remaining: u64, after: Duration) -> Self {
        Self::new(remaining, SystemTime::now() + after)
    }

    /// Parse the `X-Rate-Limit-*` headers. The reset header is a Unix epoch in seconds.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let reset_at = header_u64(headers, RESET_HEADER)
            .map(|epoch| UNIX_EPOCH + Duration::from_secs(epoch));
        Self {
            limit: header_u64(headers, LIMIT_HEADER),
            remaining: header_u64(headers, REMAINING_HEADER),
            reset_at,
        }
    }

    /// Signed whole seconds until the window resets; negative once it has elapsed.
    pub fn seconds_until_reset(&self, now: SystemTime) -> Option<i64> {
        let reset_at = self.reset_at?;
        Some(match reset_at.duration_since(now) {
            Ok(ahead) => ahead.as_secs() as i64,
            Err(e) => -(e.duration().as_secs_f64().ceil() as i64),
        })
    }

    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.seconds_until_reset(now).map_or(false, |s| s < 0)
    }
}

impl fmt::Display for RateLimitSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |v: Option<u64>| v.map_or_else(|| "?".to_string(), |v| v.to_string());
        let reset = self
            .reset_at
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or_else(|| "?".to_string(), |d| d.as_secs().to_string());
        write!(
            f,
            "limit={} remaining={} reset={}",
            opt(self.limit),
            opt(self.remaining),
            reset
        )
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Admission rule over a snapshot and the optimistic usage counter.
///
/// Unknown remaining is a denial. One unit of headroom is kept, so a
/// remaining count equal to `requested` is rejected.
pub fn admits(snapshot: &RateLimitSnapshot, usage: i64, requested: u32) -> bool {
    match snapshot.remaining {
        Some(remaining) => remaining as i64 - usage > i64::from(requested),
        None => false,
    }
}

/// Gate over the account's request quota.
///
/// The server's snapshot is authoritative; between snapshots the gate counts
/// the requests it has admitted (`usage`) so bursts do not overrun the quota.
pub struct RateLimitGate {
    api: Arc<dyn RemoApi>,
    usage: AtomicI64,
    // Held across an account fetch so concurrent callers share one resync.
    resync_lock: Mutex<()>,
}

impl RateLimitGate {
    pub fn new(api: Arc<dyn RemoApi>) -> Self {
        Self {
            api,
            usage: AtomicI64::new(0),
            resync_lock: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> RateLimitSnapshot {
        self.api.rate_limit()
    }

    /// Requests admitted since the last account-level fetch.
    pub fn usage(&self) -> i64 {
        self.usage.load(Ordering::SeqCst)
    }

    pub fn reset_usage(&self) {
        self.usage.store(0, Ordering::SeqCst);
    }

    /// Remaining quota after subtracting optimistic usage.
    pub fn remaining(&self) -> Option<i64> {
        self.snapshot()
            .remaining
            .map(|r| r as i64 - self.usage())
    }

    pub fn seconds_until_reset(&self) -> Option<i64> {
        self.snapshot().seconds_until_reset(SystemTime::now())
    }

    /// Fetch the account to pull a fresh snapshot.
    ///
    /// Usage restarts from zero only once the fetch has succeeded; a failed
    /// fetch leaves both the snapshot and the counter as they were.
    pub async fn resync(&self) -> Result<User> {
        let _resync = self.resync_lock.lock().await;
        self.fetch_user_fresh().await
    }

    async fn fetch_user_fresh(&self) -> Result<User> {
        let user = self.api.fetch_user().await?;
        self.reset_usage();
        Ok(user)
    }

    /// Resync when the reset time has passed. Returns `false` when a resync
    /// was needed and failed, in which case nothing may be admitted.
    async fn resync_if_expired(&self) -> bool {
        if !self.snapshot().is_expired(SystemTime::now()) {
            return true;
        }
        let _resync = self.resync_lock.lock().await;
        // Another caller may have resynced while we waited.
        if !self.snapshot().is_expired(SystemTime::now()) {
            return true;
        }
        match self.fetch_user_fresh().await {
            Ok(user) => {
                debug!(user = %user.nickname, snapshot = %self.snapshot(), "rate limit window elapsed, resynchronized");
                true
            }
            Err(e) => {
                warn!(error = %e, "rate limit resync failed, denying");
                false
            }
        }
    }

    /// May `requested` more requests be issued now?
    ///
    /// Resynchronizes first when the reset time has already passed; a failed
    /// resync is a denial.
    pub async fn can_request(&self, requested: u32) -> bool {
        if !self.resync_if_expired().await {
            return false;
        }
        let snapshot = self.snapshot();
        let usage = self.usage();
        let ok = admits(&snapshot, usage, requested);
        self.log_decision(ok, &snapshot, usage, requested);
        ok
    }

    /// Like [`can_request`](Self::can_request), but on admission also adds
    /// `requested` to the usage counter in the same atomic step.
    pub async fn try_acquire(&self, requested: u32) -> bool {
        if !self.resync_if_expired().await {
            return false;
        }
        let snapshot = self.snapshot();
        let mut usage = self.usage();
        loop {
            if !admits(&snapshot, usage, requested) {
                self.log_decision(false, &snapshot, usage, requested);
                return false;
            }
            match self.usage.compare_exchange(
                usage,
                usage + i64::from(requested),
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => {
                    self.log_decision(true, &snapshot, usage, requested);
                    return true;
                }
                Err(actual) => usage = actual,
            }
        }
    }

    fn log_decision(&self, ok: bool, snapshot: &RateLimitSnapshot, usage: i64, requested: u32) {
        let remaining = snapshot.remaining.map(|r| r as i64 - usage);
        let reset_in = snapshot.seconds_until_reset(SystemTime::now());
        if ok {
            debug!(?remaining, ?reset_in, requested, %snapshot, "can_request: ok");
        } else {
            debug!(?remaining, ?reset_in, requested, %snapshot, "can_request: too many requests");
        }
    }
}

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default quota per key per window.
pub const DEFAULT_LIMIT: u32 = 10;
/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// The outcome of a limiter check.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Admitted; `remaining` is the quota left in the current window,
    /// suitable for an `X-RateLimit-Remaining` header.
    Allowed { remaining: u32 },
    /// Denied; `retry_after_secs` is the whole seconds until the window
    /// resets, suitable for a `Retry-After` header. Strictly positive
    /// while the window is live.
    Denied { retry_after_secs: u64 },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window rate limiter keyed by caller identity (e.g. an IP).
///
/// Each key gets an independent counter that resets `window` after the
/// first request that opened it. The window is fixed, not sliding: a
/// burst straddling a window boundary can be admitted up to twice the
/// limit in a short interval around the boundary. Entries are never
/// evicted on their own, so the table grows with the number of distinct
/// keys seen until [`reset_all`](RateLimiter::reset_all) is called.
pub struct RateLimiter {
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Checks `key` against the default quota of
    /// [`DEFAULT_LIMIT`] requests per [`DEFAULT_WINDOW`].
    pub fn check(&self, key: &str) -> Decision {
        self.check_with(key, DEFAULT_LIMIT, DEFAULT_WINDOW)
    }

    /// Checks `key` against `limit` requests per `window`.
    ///
    /// The first request for a key, or the first after its window
    /// elapsed, opens a fresh window with a count of one. The lookup
    /// and update happen under one lock acquisition, so concurrent
    /// calls for the same key cannot both be admitted past the quota.
    pub fn check_with(&self, key: &str, limit: u32, window: Duration) -> Decision {
        let now = Instant::now();
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match entries.get_mut(key) {
            // Live window for this key.
            Some(entry) if entry.reset_at > now => {
                if entry.count >= limit {
                    let millis_left = entry.reset_at.duration_since(now).as_millis() as u64;
                    return Decision::Denied {
                        retry_after_secs: millis_left.div_ceil(1_000).max(1),
                    };
                }
                entry.count += 1;
                Decision::Allowed {
                    remaining: limit.saturating_sub(entry.count),
                }
            }
            // First sighting, or the previous window elapsed.
            _ => {
                entries.insert(
                    key.to_owned(),
                    WindowEntry {
                        count: 1,
                        reset_at: now + window,
                    },
                );
                Decision::Allowed {
                    remaining: limit.saturating_sub(1),
                }
            }
        }
    }

    /// Clears every tracked key. Administrative/test use.
    pub fn reset_all(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

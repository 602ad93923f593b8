use std::sync::{Arc, RwLock};

/// Configures retry and timeout behavior for [`FetchClient`](crate::FetchClient).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FetchConfig {
    /// Total tries including the first. Values below 1 are treated as 1.
    pub attempts: u32,
    /// Base backoff in milliseconds; delay before retry `i` is
    /// `min(base_delay_ms * 2^i, max_delay_ms)`.
    pub base_delay_ms: u64,
    /// Upper bound on any single backoff delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2_000,
            timeout_ms: 5_000,
        }
    }
}

/// Partial [`FetchConfig`] update; `None` fields are left unchanged.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConfigPatch {
    pub attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
}

/// Shared handle to a [`FetchConfig`].
///
/// Clones refer to the same underlying configuration, so an [`update`]
/// through one handle is observed by every client holding a clone — a call
/// already retrying picks the new values up on its next attempt.
///
/// [`update`]: SharedConfig::update
#[derive(Clone, Debug, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<FetchConfig>>,
}

impl SharedConfig {
    /// Creates a handle starting from the given configuration.
    pub fn new(config: FetchConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Snapshots the current configuration.
    pub fn get(&self) -> FetchConfig {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Merges a partial update into the current configuration.
    pub fn update(&self, patch: ConfigPatch) {
        let mut config = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(attempts) = patch.attempts {
            config.attempts = attempts;
        }
        if let Some(base_delay_ms) = patch.base_delay_ms {
            config.base_delay_ms = base_delay_ms;
        }
        if let Some(max_delay_ms) = patch.max_delay_ms {
            config.max_delay_ms = max_delay_ms;
        }
        if let Some(timeout_ms) = patch.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
    }

    /// Replaces the configuration wholesale.
    pub fn set(&self, config: FetchConfig) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigPatch, FetchConfig, SharedConfig};

    #[test]
    fn update_merges_only_given_fields() {
        let shared = SharedConfig::default();
        shared.update(ConfigPatch {
            attempts: Some(5),
            timeout_ms: Some(1_000),
            ..ConfigPatch::default()
        });

        let config = shared.get();
        assert_eq!(config.attempts, 5);
        assert_eq!(config.timeout_ms, 1_000);
        assert_eq!(config.base_delay_ms, FetchConfig::default().base_delay_ms);
        assert_eq!(config.max_delay_ms, FetchConfig::default().max_delay_ms);
    }

    #[test]
    fn clones_share_the_same_configuration() {
        let shared = SharedConfig::default();
        let other = shared.clone();
        other.update(ConfigPatch {
            base_delay_ms: Some(7),
            ..ConfigPatch::default()
        });
        assert_eq!(shared.get().base_delay_ms, 7);
    }
}

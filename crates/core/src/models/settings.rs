use serde::{Deserialize, Serialize};
use std::time::Duration;

/// User-tunable knobs for the refresh cycle and the caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Delay between refresh cycles, in seconds.
    pub refresh_interval_secs: u64,

    /// How long a fetched quote stays fresh within one render pass,
    /// in seconds. The cache is also invalidated explicitly at the
    /// start of each refresh cycle.
    pub quote_cache_ttl_secs: u64,

    /// How long a resolved display name stays cached, in seconds.
    /// Names don't change, so this is long.
    pub name_cache_ttl_secs: u64,

    /// Display names longer than this are truncated with "...".
    pub max_name_len: usize,
}

impl Settings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn quote_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.quote_cache_ttl_secs)
    }

    pub fn name_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.name_cache_ttl_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 3,
            quote_cache_ttl_secs: 3,
            name_cache_ttl_secs: 1800,
            max_name_len: 25,
        }
    }
}

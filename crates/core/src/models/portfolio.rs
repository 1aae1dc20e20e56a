use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::holding::Holding;
use super::settings::Settings;

/// The explicit application-state object, owned by the top-level
/// tracker and passed by reference to the services. Lifecycle is tied
/// to the running process: nothing here is persisted, restarting loses
/// all holdings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    /// User-recorded positions, in insertion order.
    /// No uniqueness constraint on ticker.
    pub holdings: Vec<Holding>,

    /// Refresh/cache settings
    pub settings: Settings,

    /// Whether the refresh loop keeps cycling after its first pass
    pub auto_refresh: bool,

    /// When the last evaluate-and-render pass completed
    pub last_update: Option<DateTime<Utc>>,
}

impl Default for Portfolio {
    fn default() -> Self {
        Self {
            holdings: Vec::new(),
            settings: Settings::default(),
            auto_refresh: true,
            last_update: None,
        }
    }
}

impl Portfolio {
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

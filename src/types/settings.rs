use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level application settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub realtime: RealtimeSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Live-sync behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RealtimeSettings {
    /// First reconnect delay, doubled on every consecutive failure.
    pub base_delay_ms: u64,
    /// Upper bound on the reconnect delay.
    pub max_delay_ms: u64,
    /// Table watched on the change feed.
    pub table: String,
    /// Restore an optimistically removed bookmark when the delete is refused.
    pub rollback_failed_deletes: bool,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
            table: "bookmarks".to_string(),
            rollback_failed_deletes: false,
        }
    }
}

impl RealtimeSettings {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Where the local authoritative store keeps its data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StorageSettings {
    /// Explicit database file. `None` means `<data dir>/bookmarks.db`.
    pub database_path: Option<String>,
}

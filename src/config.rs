//! Tunables for the stores: history bounds, simulated latencies and the
//! strings stamped into records.

use serde::Deserialize;
use std::time::Duration;

/// Store configuration.
///
/// Every field has a default, so a host can deserialize a partial table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of counter history entries kept
    pub counter_history_limit: usize,

    /// Maximum number of login history entries kept
    pub login_history_limit: usize,

    /// Default delay for `CounterStore::increment_async_default`
    pub increment_delay_ms: u64,

    /// Simulated login round trip
    pub login_delay_ms: u64,

    /// Simulated profile refresh round trip
    pub fetch_delay_ms: u64,

    /// Placeholder avatar service used when a user has no avatar
    pub avatar_base_url: String,

    /// Identifies this client in login history records
    pub client_context: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            counter_history_limit: 10,
            login_history_limit: 20,
            increment_delay_ms: 1000,
            login_delay_ms: 1500,
            fetch_delay_ms: 1000,
            avatar_base_url: "https://ui-avatars.com/api/".to_string(),
            client_context: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
                .to_string(),
        }
    }
}

impl StoreConfig {
    /// Configuration with every simulated delay removed.
    pub fn testing() -> Self {
        Self {
            increment_delay_ms: 0,
            login_delay_ms: 0,
            fetch_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn increment_delay(&self) -> Duration {
        Duration::from_millis(self.increment_delay_ms)
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }
}

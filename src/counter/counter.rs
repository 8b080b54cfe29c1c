use crate::clock::{local_timestamp, next_record_id};
use crate::config::StoreConfig;
use crate::store::{Store, Subscription};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Kind of counter mutation recorded in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Increment,
    Decrement,
    Reset,
    Set,
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Increment => "increment",
            Self::Decrement => "decrement",
            Self::Reset => "reset",
            Self::Set => "set",
        };
        f.pad(label)
    }
}

/// One counter history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub action: HistoryAction,
    /// Count right after the action
    pub value: i64,
    pub description: String,
    pub timestamp: String,
}

/// Sign of the current count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountStatus {
    Initial,
    Positive,
    Negative,
}

impl fmt::Display for CountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Initial => "initial",
            Self::Positive => "positive",
            Self::Negative => "negative",
        };
        f.pad(label)
    }
}

/// Counter state: the count plus a bounded, newest-first history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterState {
    pub count: i64,
    pub name: String,
    pub history: Vec<HistoryEntry>,
    #[serde(skip)]
    last_entry_id: u64,
}

impl Default for CounterState {
    fn default() -> Self {
        Self {
            count: 0,
            name: "Counter".to_string(),
            history: Vec::new(),
            last_entry_id: 0,
        }
    }
}

impl CounterState {
    pub fn double_count(&self) -> i64 {
        self.count.saturating_mul(2)
    }

    pub fn is_even(&self) -> bool {
        self.count % 2 == 0
    }

    pub fn count_status(&self) -> CountStatus {
        match self.count {
            0 => CountStatus::Initial,
            n if n > 0 => CountStatus::Positive,
            _ => CountStatus::Negative,
        }
    }

    pub fn history_count(&self) -> usize {
        self.history.len()
    }

    fn record(&mut self, action: HistoryAction, value: i64, description: String, limit: usize) {
        self.last_entry_id = next_record_id(self.last_entry_id);
        self.history.insert(
            0,
            HistoryEntry {
                id: self.last_entry_id,
                action,
                value,
                description,
                timestamp: local_timestamp(),
            },
        );
        self.history.truncate(limit);
    }
}

/// An integer counter with a bounded history log.
#[derive(Clone)]
pub struct CounterStore {
    store: Store<CounterState>,
    history_limit: usize,
    default_delay: Duration,
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterStore {
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        Self {
            store: Store::new(CounterState::default()),
            history_limit: config.counter_history_limit,
            default_delay: config.increment_delay(),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CounterState {
        self.store.get()
    }

    /// Subscribe to every counter mutation.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&CounterState) + Send + Sync + 'static,
    {
        self.store.subscribe(callback)
    }

    pub fn count(&self) -> i64 {
        self.store.read(|s| s.count)
    }

    pub fn name(&self) -> String {
        self.store.read(|s| s.name.clone())
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.store.read(|s| s.history.clone())
    }

    pub fn double_count(&self) -> i64 {
        self.store.read(CounterState::double_count)
    }

    pub fn is_even(&self) -> bool {
        self.store.read(CounterState::is_even)
    }

    pub fn count_status(&self) -> CountStatus {
        self.store.read(CounterState::count_status)
    }

    pub fn history_count(&self) -> usize {
        self.store.read(CounterState::history_count)
    }

    /// Add one and return the new count.
    pub fn increment(&self) -> i64 {
        let limit = self.history_limit;
        self.store.update(|s| {
            s.count = s.count.saturating_add(1);
            s.record(HistoryAction::Increment, s.count, String::new(), limit);
            s.count
        })
    }

    /// Subtract one and return the new count.
    pub fn decrement(&self) -> i64 {
        let limit = self.history_limit;
        self.store.update(|s| {
            s.count = s.count.saturating_sub(1);
            s.record(HistoryAction::Decrement, s.count, String::new(), limit);
            s.count
        })
    }

    pub fn reset(&self) {
        let limit = self.history_limit;
        let old = self.store.update(|s| {
            let old = s.count;
            s.count = 0;
            s.record(HistoryAction::Reset, 0, format!("from {old} reset to 0"), limit);
            old
        });
        debug!(from = old, "counter reset");
    }

    pub fn set_count(&self, value: i64) {
        let limit = self.history_limit;
        self.store.update(|s| {
            let old = s.count;
            s.count = value;
            s.record(HistoryAction::Set, value, format!("from {old} set to {value}"), limit);
        });
    }

    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.store.update(|s| s.name = name);
    }

    /// Prepend a history record and drop anything past the limit.
    pub fn add_to_history(&self, action: HistoryAction, value: i64, description: impl Into<String>) {
        let limit = self.history_limit;
        let description = description.into();
        self.store.update(|s| s.record(action, value, description, limit));
    }

    /// Empty the history; the count is untouched.
    pub fn clear_history(&self) {
        self.store.update(|s| s.history.clear());
    }

    /// Wait for `delay`, then increment and return the new count.
    ///
    /// Two overlapping calls complete in delay order, not call order.
    pub async fn increment_async(&self, delay: Duration) -> i64 {
        debug!(?delay, "delayed increment scheduled");
        tokio::time::sleep(delay).await;
        self.increment()
    }

    /// [`increment_async`](Self::increment_async) with the configured delay.
    pub async fn increment_async_default(&self) -> i64 {
        self.increment_async(self.default_delay).await
    }
}

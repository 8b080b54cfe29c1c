//! Integer counter store with a bounded history log.

mod counter;

pub use counter::{CountStatus, CounterState, CounterStore, HistoryAction, HistoryEntry};

//! # Stashbox
//!
//! The state core of a small single-page demo: three independent stores,
//! each holding its state, derived values and actions.
//!
//! ## Stores
//!
//! - [`CounterStore`] - an integer counter with a bounded history log
//! - [`TodoStore`] - a todo list with filtering, grouping and sorting
//! - [`UserStore`] - a simulated login session with preferences and history
//!
//! ## Building blocks
//!
//! - [`Store<T>`] - thread-safe, versioned state container with subscribers
//! - [`Memo`] - derived value cached against a store's version
//!
//! Async actions (`increment_async`, `login`, `fetch_user_data`) only
//! simulate latency with `tokio::time::sleep` and never hold a lock while
//! suspended.

pub mod app;
mod clock;
pub mod config;
pub mod counter;
pub mod error;
pub mod memo;
pub mod store;
pub mod telemetry;
pub mod todos;
pub mod user;

// Re-export main types for convenience
pub use app::{App, Route, View};
pub use config::StoreConfig;
pub use counter::CounterStore;
pub use error::{Result, StoreError};
pub use memo::Memo;
pub use store::{Store, Subscription};
pub use todos::TodoStore;
pub use user::UserStore;

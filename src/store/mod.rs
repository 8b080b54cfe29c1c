//! Shared, versioned state containers.
//!
//! Every store in this crate wraps its state in a [`Store`], which tracks a
//! mutation version and notifies subscribers after each change.

mod store;

pub use store::{Store, Subscription};

//! Cached derived values.
//!
//! A [`Memo`] watches a store's version and only recomputes after the state
//! has been mutated.

mod memo;

pub use memo::Memo;

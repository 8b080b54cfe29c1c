//! Error types shared by the stores.

use thiserror::Error;

/// Failures surfaced by store actions.
///
/// Invalid input to counter and todo actions (blank text, unknown ids) is
/// not an error: those actions simply leave state unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Credentials did not match any known account.
    #[error("{0}")]
    Auth(String),

    /// The simulated profile refresh failed.
    #[error("failed to fetch user data: {0}")]
    Fetch(String),

    #[error("unknown filter '{0}' (expected all, active or completed)")]
    InvalidFilter(String),

    #[error("unknown priority '{0}' (expected low, medium or high)")]
    InvalidPriority(String),
}

impl StoreError {
    /// Message recorded in session state and login history.
    pub fn message(&self) -> String {
        match self {
            Self::Auth(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

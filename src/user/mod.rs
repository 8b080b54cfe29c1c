//! Simulated user session store.
//!
//! Credentials are checked by an [`AuthBackend`]; the default
//! [`SimulatedBackend`] knows two hardcoded accounts and sleeps to mimic
//! network latency.

mod backend;
mod model;
mod user;

pub use backend::{AuthBackend, SimulatedBackend};
pub use model::{
    AccessLevel, LoginKind, LoginRecord, Preferences, PreferencesUpdate, ProfileUpdate, Role,
    Theme, User, UserState,
};
pub use user::UserStore;

use super::model::{Role, User};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;
use tracing::debug;

/// The remote side of the session store.
///
/// Both calls stand in for network round trips; the store awaits them
/// without holding any lock.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Resolve credentials to a profile with a fresh `last_login_at`.
    async fn authenticate(&self, email: &str, password: &str) -> Result<User>;

    /// Fetch the latest login time for an already authenticated user.
    async fn refresh(&self, user: &User) -> Result<DateTime<Utc>>;
}

/// Offline backend with two built-in accounts and fixed latencies.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    login_delay: Duration,
    fetch_delay: Duration,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

impl SimulatedBackend {
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            login_delay: config.login_delay(),
            fetch_delay: config.fetch_delay(),
        }
    }

    fn account(email: &str, password: &str) -> Option<User> {
        let (id, first_name, role, day) = match (email, password) {
            ("admin@example.com", "admin123") => (1, "Admin", Role::Admin, 1),
            ("user@example.com", "user123") => (2, "Regular", Role::User, 2),
            _ => return None,
        };
        Some(User {
            id,
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: "User".to_string(),
            role,
            avatar: None,
            created_at: Utc
                .with_ymd_and_hms(2024, 1, day, 0, 0, 0)
                .single()
                .unwrap_or_default(),
            last_login_at: Utc::now(),
        })
    }
}

#[async_trait]
impl AuthBackend for SimulatedBackend {
    async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        tokio::time::sleep(self.login_delay).await;
        debug!(email, "checking credentials");
        Self::account(email, password)
            .ok_or_else(|| StoreError::Auth("invalid email or password".to_string()))
    }

    async fn refresh(&self, user: &User) -> Result<DateTime<Utc>> {
        tokio::time::sleep(self.fetch_delay).await;
        debug!(id = user.id, "refreshed user data");
        Ok(Utc::now())
    }
}

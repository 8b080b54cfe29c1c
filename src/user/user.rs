use super::backend::{AuthBackend, SimulatedBackend};
use super::model::{
    AccessLevel, LoginKind, LoginRecord, Preferences, PreferencesUpdate, ProfileUpdate, User,
    UserState,
};
use crate::clock::next_record_id;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::store::{Store, Subscription};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Clears `is_loading` when dropped, whichever way the action exits.
struct LoadingGuard<'a> {
    store: &'a Store<UserState>,
}

impl<'a> LoadingGuard<'a> {
    fn begin(store: &'a Store<UserState>) -> Self {
        store.update(|s| s.is_loading = true);
        Self { store }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.update(|s| s.is_loading = false);
    }
}

/// Simulated session: login state, profile, preferences and login history.
///
/// Overlapping async actions are not serialized; whichever finishes last
/// decides `user`, `error` and `is_loading`.
#[derive(Clone)]
pub struct UserStore {
    store: Store<UserState>,
    backend: Arc<dyn AuthBackend>,
    last_record_id: Arc<parking_lot::Mutex<u64>>,
    history_limit: usize,
    client_context: String,
    avatar_base_url: String,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore {
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        Self::with_backend(config, Arc::new(SimulatedBackend::from_config(config)))
    }

    pub fn with_backend(config: &StoreConfig, backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            store: Store::new(UserState::default()),
            backend,
            last_record_id: Arc::new(parking_lot::Mutex::new(0)),
            history_limit: config.login_history_limit,
            client_context: config.client_context.clone(),
            avatar_base_url: config.avatar_base_url.clone(),
        }
    }

    pub fn state(&self) -> UserState {
        self.store.get()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&UserState) + Send + Sync + 'static,
    {
        self.store.subscribe(callback)
    }

    pub fn user(&self) -> Option<User> {
        self.store.read(|s| s.user.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.store.read(|s| s.is_loading)
    }

    pub fn error(&self) -> Option<String> {
        self.store.read(|s| s.error.clone())
    }

    pub fn preferences(&self) -> Preferences {
        self.store.read(|s| s.preferences.clone())
    }

    pub fn login_history(&self) -> Vec<LoginRecord> {
        self.store.read(|s| s.login_history.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.read(UserState::is_logged_in)
    }

    pub fn full_name(&self) -> String {
        self.store.read(UserState::full_name)
    }

    pub fn avatar_url(&self) -> String {
        self.store.read(|s| s.avatar_url(&self.avatar_base_url))
    }

    pub fn user_role(&self) -> AccessLevel {
        self.store.read(UserState::user_role)
    }

    pub fn is_admin(&self) -> bool {
        self.store.read(UserState::is_admin)
    }

    pub fn last_login_time(&self) -> Option<DateTime<Utc>> {
        self.store.read(UserState::last_login_time)
    }

    /// Authenticate and start a session.
    ///
    /// A failure is recorded in `error` and the login history, then
    /// returned to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        self.store.update(|s| s.error = None);
        let _loading = LoadingGuard::begin(&self.store);

        match self.backend.authenticate(email, password).await {
            Ok(user) => {
                self.store.update(|s| s.user = Some(user.clone()));
                self.add_login_history(LoginKind::Success, "");
                info!(email, role = ?user.role, "login succeeded");
                Ok(user)
            }
            Err(err) => {
                let message = err.message();
                warn!(email, error = %message, "login failed");
                self.store.update(|s| s.error = Some(message.clone()));
                self.add_login_history(LoginKind::Failed, message);
                Err(err)
            }
        }
    }

    pub fn logout(&self) {
        self.store.update(|s| {
            s.user = None;
            s.error = None;
        });
        self.add_login_history(LoginKind::Logout, "");
        info!("logged out");
    }

    /// Merge `updates` into the current profile; ignored when logged out.
    pub fn update_profile(&self, updates: ProfileUpdate) {
        let applied = self.store.update(|s| match s.user.as_mut() {
            Some(user) => {
                user.apply(updates);
                true
            }
            None => false,
        });
        if !applied {
            debug!("profile update ignored, not logged in");
        }
    }

    pub fn update_preferences(&self, updates: PreferencesUpdate) {
        self.store.update(|s| s.preferences.apply(updates));
    }

    pub fn toggle_theme(&self) {
        self.store
            .update(|s| s.preferences.theme = s.preferences.theme.toggled());
    }

    pub fn toggle_notifications(&self) {
        self.store
            .update(|s| s.preferences.notifications = !s.preferences.notifications);
    }

    /// Refresh the logged-in user's data.
    ///
    /// Faults land in `error` and are not returned.
    pub async fn fetch_user_data(&self) {
        let Some(user) = self.user() else {
            debug!("fetch skipped, not logged in");
            return;
        };
        let _loading = LoadingGuard::begin(&self.store);

        match self.backend.refresh(&user).await {
            Ok(last_login_at) => self.store.update(|s| {
                if let Some(current) = s.user.as_mut() {
                    current.last_login_at = last_login_at;
                }
            }),
            Err(err) => {
                warn!(id = user.id, error = %err, "fetching user data failed");
                self.store.update(|s| s.error = Some(err.message()));
            }
        }
    }

    /// Prepend a login history record and drop anything past the limit.
    pub fn add_login_history(&self, kind: LoginKind, message: impl Into<String>) {
        let id = {
            let mut last = self.last_record_id.lock();
            *last = next_record_id(*last);
            *last
        };
        let record = LoginRecord {
            id,
            kind,
            message: message.into(),
            timestamp: Utc::now(),
            client_context: self.client_context.clone(),
        };
        let limit = self.history_limit;
        self.store.update(|s| {
            s.login_history.insert(0, record);
            s.login_history.truncate(limit);
        });
    }

    pub fn clear_login_history(&self) {
        self.store.update(|s| s.login_history.clear());
    }

    pub fn clear_error(&self) {
        self.store.update(|s| s.error = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::user::model::{Role, Theme};
    use async_trait::async_trait;
    use std::time::Duration;

    struct FaultyBackend;

    #[async_trait]
    impl AuthBackend for FaultyBackend {
        async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
            SimulatedBackend::from_config(&StoreConfig::testing())
                .authenticate(email, password)
                .await
        }

        async fn refresh(&self, _user: &User) -> Result<DateTime<Utc>> {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err(StoreError::Fetch("connection reset".to_string()))
        }
    }

    struct PanickingBackend;

    #[async_trait]
    impl AuthBackend for PanickingBackend {
        async fn authenticate(&self, _email: &str, _password: &str) -> Result<User> {
            panic!("backend blew up");
        }

        async fn refresh(&self, _user: &User) -> Result<DateTime<Utc>> {
            panic!("backend blew up");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn admin_login_resolves_admin_profile() {
        let store = UserStore::new();

        let user = store.login("admin@example.com", "admin123").await.unwrap();

        assert_eq!(user.role, Role::Admin);
        assert!(store.is_logged_in());
        assert!(store.is_admin());
        assert!(!store.is_loading());
        assert_eq!(store.user_role(), AccessLevel::Admin);
        assert_eq!(store.login_history()[0].kind, LoginKind::Success);
        assert_eq!(store.login_history()[0].message, "");
    }

    #[tokio::test(start_paused = true)]
    async fn regular_login_is_user_role() {
        let store = UserStore::new();
        store.login("user@example.com", "user123").await.unwrap();

        assert_eq!(store.user_role(), AccessLevel::User);
        assert!(!store.is_admin());
        assert_eq!(store.full_name(), "Regular User");
        assert_eq!(
            store.avatar_url(),
            "https://ui-avatars.com/api/?name=Regular+User&background=667eea&color=fff"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn bad_credentials_reject_and_record() {
        let store = UserStore::new();

        let err = store.login("x@x.com", "wrong").await.unwrap_err();

        assert_eq!(err, StoreError::Auth("invalid email or password".to_string()));
        assert!(store.user().is_none());
        assert!(!store.is_loading());
        assert_eq!(store.error().as_deref(), Some("invalid email or password"));

        let latest = &store.login_history()[0];
        assert_eq!(latest.kind, LoginKind::Failed);
        assert_eq!(latest.message, "invalid email or password");
    }

    #[tokio::test(start_paused = true)]
    async fn loading_is_set_during_login() {
        let store = UserStore::new();
        let task = {
            let store = store.clone();
            tokio::spawn(async move { store.login("user@example.com", "user123").await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(store.is_loading());

        task.await.unwrap().unwrap();
        assert!(!store.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn new_login_clears_previous_error() {
        let store = UserStore::new();
        let _ = store.login("x@x.com", "wrong").await;
        assert!(store.error().is_some());

        store.login("user@example.com", "user123").await.unwrap();
        assert_eq!(store.error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_backend_still_clears_loading() {
        let store = UserStore::with_backend(&StoreConfig::testing(), Arc::new(PanickingBackend));
        let task = {
            let store = store.clone();
            tokio::spawn(async move { store.login("a@b.c", "pw").await })
        };

        assert!(task.await.unwrap_err().is_panic());
        assert!(!store.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_login_clears_loading() {
        let store = UserStore::new();

        let outcome = tokio::time::timeout(
            Duration::from_millis(100),
            store.login("admin@example.com", "admin123"),
        )
        .await;

        assert!(outcome.is_err());
        assert!(!store.is_loading());
        assert!(store.user().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_logins_last_write_wins() {
        let store = UserStore::new();
        let admin = {
            let store = store.clone();
            tokio::spawn(async move { store.login("admin@example.com", "admin123").await })
        };
        tokio::time::sleep(Duration::from_millis(500)).await;
        let user = {
            let store = store.clone();
            tokio::spawn(async move { store.login("user@example.com", "user123").await })
        };

        admin.await.unwrap().unwrap();
        assert_eq!(store.user().map(|u| u.id), Some(1));
        assert!(!store.is_loading());

        user.await.unwrap().unwrap();

        assert_eq!(store.user().map(|u| u.id), Some(2));
        assert!(!store.is_loading());
        assert_eq!(store.login_history().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn logout_clears_session() {
        let store = UserStore::new();
        store.login("admin@example.com", "admin123").await.unwrap();

        store.logout();

        assert!(!store.is_logged_in());
        assert_eq!(store.user_role(), AccessLevel::Guest);
        assert_eq!(store.full_name(), "");
        let latest = &store.login_history()[0];
        assert_eq!(latest.kind, LoginKind::Logout);
        assert_eq!(latest.message, "");
        assert_eq!(store.last_login_time(), Some(latest.timestamp));
    }

    #[tokio::test(start_paused = true)]
    async fn update_profile_merges_when_logged_in() {
        let store = UserStore::new();
        store.update_profile(ProfileUpdate {
            first_name: Some("Nobody".to_string()),
            ..ProfileUpdate::default()
        });
        assert!(store.user().is_none());

        store.login("user@example.com", "user123").await.unwrap();
        store.update_profile(ProfileUpdate {
            first_name: Some("Grace".to_string()),
            avatar: Some(Some("https://cdn/grace.png".to_string())),
            ..ProfileUpdate::default()
        });

        let user = store.user().unwrap();
        assert_eq!(user.first_name, "Grace");
        assert_eq!(user.last_name, "User");
        assert_eq!(user.email, "user@example.com");
        assert_eq!(store.avatar_url(), "https://cdn/grace.png");
    }

    #[test]
    fn preferences_work_while_logged_out() {
        let store = UserStore::new();

        store.update_preferences(PreferencesUpdate {
            language: Some("en-US".to_string()),
            ..PreferencesUpdate::default()
        });
        store.toggle_theme();
        store.toggle_notifications();

        let prefs = store.preferences();
        assert_eq!(prefs.language, "en-US");
        assert_eq!(prefs.theme, Theme::Dark);
        assert!(!prefs.notifications);

        store.toggle_theme();
        assert_eq!(store.preferences().theme, Theme::Light);
    }

    #[test]
    fn login_history_is_bounded_newest_first() {
        let store = UserStore::new();
        for i in 0..25 {
            store.add_login_history(LoginKind::Failed, format!("attempt {i}"));
        }

        let history = store.login_history();
        assert_eq!(history.len(), 20);
        assert_eq!(history[0].message, "attempt 24");
        assert_eq!(history[19].message, "attempt 5");
        assert!(history.windows(2).all(|pair| pair[0].id > pair[1].id));
        assert!(history
            .iter()
            .all(|r| r.client_context.starts_with("stashbox/")));
    }

    #[test]
    fn clear_history_and_error() {
        let store = UserStore::new();
        store.add_login_history(LoginKind::Logout, "");
        assert!(store.last_login_time().is_some());

        store.clear_login_history();
        assert!(store.login_history().is_empty());
        assert_eq!(store.last_login_time(), None);

        store.clear_error();
        assert_eq!(store.error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_is_noop_when_logged_out() {
        let store = UserStore::new();
        let version = store.store.version();

        store.fetch_user_data().await;

        assert_eq!(store.store.version(), version);
        assert!(!store.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_refreshes_last_login() {
        let store = UserStore::new();
        let before = store
            .login("user@example.com", "user123")
            .await
            .unwrap()
            .last_login_at;

        tokio::time::sleep(Duration::from_millis(5)).await;
        store.fetch_user_data().await;

        let after = store.user().unwrap().last_login_at;
        assert!(after >= before);
        assert!(!store.is_loading());
        assert_eq!(store.error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn logout_during_fetch_keeps_session_closed() {
        let store = UserStore::new();
        store.login("user@example.com", "user123").await.unwrap();

        let fetch = {
            let store = store.clone();
            tokio::spawn(async move { store.fetch_user_data().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(store.is_loading());
        store.logout();

        fetch.await.unwrap();

        assert!(store.user().is_none());
        assert_eq!(store.error(), None);
        assert!(!store.is_loading());
        assert_eq!(store.login_history()[0].kind, LoginKind::Logout);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_fault_is_recorded_not_returned() {
        let store = UserStore::with_backend(&StoreConfig::testing(), Arc::new(FaultyBackend));
        store.login("admin@example.com", "admin123").await.unwrap();

        store.fetch_user_data().await;

        assert_eq!(
            store.error().as_deref(),
            Some("failed to fetch user data: connection reset")
        );
        assert!(!store.is_loading());
        assert!(store.is_logged_in());
    }
}

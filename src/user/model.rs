use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Effective access level, including the logged-out case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Guest,
    User,
    Admin,
}

impl AccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<Role> for AccessLevel {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Admin => Self::Admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

impl User {
    /// Overwrite the fields present in `update`, keeping the rest.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(id) = update.id {
            self.id = id;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(avatar) = update.avatar {
            self.avatar = avatar;
        }
        if let Some(created_at) = update.created_at {
            self.created_at = created_at;
        }
        if let Some(last_login_at) = update.last_login_at {
            self.last_login_at = last_login_at;
        }
    }
}

// Keeps an explicit `null` distinct from a missing key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Shallow patch for [`User`]; `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub id: Option<u64>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    /// `Some(None)` clears the avatar
    #[serde(deserialize_with = "present")]
    pub avatar: Option<Option<String>>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    pub language: String,
    pub notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            language: "zh-CN".to_string(),
            notifications: true,
        }
    }
}

impl Preferences {
    pub fn apply(&mut self, update: PreferencesUpdate) {
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        if let Some(language) = update.language {
            self.language = language;
        }
        if let Some(notifications) = update.notifications {
            self.notifications = notifications;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PreferencesUpdate {
    pub theme: Option<Theme>,
    pub language: Option<String>,
    pub notifications: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginKind {
    Success,
    Failed,
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRecord {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: LoginKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub client_context: String,
}

/// Session state. `is_loading` and `error` are independent flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    pub user: Option<User>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub preferences: Preferences,
    pub login_history: Vec<LoginRecord>,
}

impl UserState {
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// "First Last", or empty when logged out.
    pub fn full_name(&self) -> String {
        self.user
            .as_ref()
            .map(|u| format!("{} {}", u.first_name, u.last_name))
            .unwrap_or_default()
    }

    /// Explicit avatar, else a generated placeholder; empty when logged out.
    pub fn avatar_url(&self, base_url: &str) -> String {
        match &self.user {
            None => String::new(),
            Some(User {
                avatar: Some(avatar),
                ..
            }) => avatar.clone(),
            Some(user) => format!(
                "{base_url}?name={}+{}&background=667eea&color=fff",
                user.first_name, user.last_name
            ),
        }
    }

    pub fn user_role(&self) -> AccessLevel {
        self.user
            .as_ref()
            .map_or(AccessLevel::Guest, |u| u.role.into())
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == Role::Admin)
    }

    /// Timestamp of the newest login history record.
    pub fn last_login_time(&self) -> Option<DateTime<Utc>> {
        self.login_history.first().map(|r| r.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: Role::User,
            avatar: None,
            created_at: Utc::now(),
            last_login_at: Utc::now(),
        }
    }

    #[test]
    fn logged_out_derivations() {
        let state = UserState::default();
        assert!(!state.is_logged_in());
        assert_eq!(state.full_name(), "");
        assert_eq!(state.avatar_url("https://a/"), "");
        assert_eq!(state.user_role(), AccessLevel::Guest);
        assert!(!state.is_admin());
        assert_eq!(state.last_login_time(), None);
    }

    #[test]
    fn placeholder_avatar_uses_names() {
        let state = UserState {
            user: Some(sample_user()),
            ..UserState::default()
        };
        assert_eq!(
            state.avatar_url("https://ui-avatars.com/api/"),
            "https://ui-avatars.com/api/?name=Ada+Lovelace&background=667eea&color=fff"
        );
        assert_eq!(state.full_name(), "Ada Lovelace");
    }

    #[test]
    fn explicit_avatar_wins() {
        let mut user = sample_user();
        user.avatar = Some("https://cdn/ada.png".to_string());
        let state = UserState {
            user: Some(user),
            ..UserState::default()
        };
        assert_eq!(state.avatar_url("https://ignored/"), "https://cdn/ada.png");
    }

    #[test]
    fn profile_patch_keeps_missing_keys() {
        let mut user = sample_user();
        let update: ProfileUpdate = serde_json::from_str(r#"{ "firstName": "Augusta" }"#).unwrap();

        user.apply(update);

        assert_eq!(user.first_name, "Augusta");
        assert_eq!(user.last_name, "Lovelace");
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn explicit_null_clears_avatar() {
        let mut user = sample_user();
        user.avatar = Some("https://cdn/ada.png".to_string());

        let keep: ProfileUpdate = serde_json::from_str("{}").unwrap();
        user.apply(keep);
        assert!(user.avatar.is_some());

        let clear: ProfileUpdate = serde_json::from_str(r#"{ "avatar": null }"#).unwrap();
        user.apply(clear);
        assert_eq!(user.avatar, None);
    }

    #[test]
    fn preferences_patch() {
        let mut prefs = Preferences::default();
        prefs.apply(PreferencesUpdate {
            language: Some("en-US".to_string()),
            ..PreferencesUpdate::default()
        });
        assert_eq!(prefs.language, "en-US");
        assert_eq!(prefs.theme, Theme::Light);
        assert!(prefs.notifications);
    }

    #[test]
    fn login_record_serializes_kind_as_type() {
        let record = LoginRecord {
            id: 1,
            kind: LoginKind::Failed,
            message: "nope".to_string(),
            timestamp: Utc::now(),
            client_context: "test".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "failed");
        assert_eq!(json["clientContext"], "test");
    }
}

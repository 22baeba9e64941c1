//! # Profile Module
//!
//! ProfileState: thông tin cá nhân, bảo mật, tuỳ chọn và lịch sử hoạt động.
//! `full_name`/`email`/`role` luôn được đồng bộ lại từ identity hiện tại.

use crate::identity::{Identity, Role};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub device: String,
    pub location: String,
    pub last_active: DateTime<Utc>,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    pub two_factor_enabled: bool,
    pub sessions: Vec<Session>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl Theme {
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme: Theme,
    pub email_alerts: bool,
    pub fraud_alerts: bool,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub status: String,
    pub ip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileState {
    pub user: ProfileUser,
    pub security: SecuritySettings,
    pub preferences: Preferences,
    /// Newest first
    pub activity: Vec<ActivityEntry>,
}

impl ProfileState {
    /// Giá trị mặc định, ghép với identity hiện tại nếu có
    pub fn defaults(identity: Option<&Identity>, now: DateTime<Utc>) -> Self {
        let mut state = Self {
            user: ProfileUser {
                full_name: "Guest User".to_string(),
                email: "guest@kycdesk.local".to_string(),
                phone: "+84 90 000 0000".to_string(),
                address: "12 Nguyen Hue, District 1, Ho Chi Minh City".to_string(),
                role: Role::User,
                profile_image: None,
            },
            security: SecuritySettings {
                two_factor_enabled: false,
                sessions: vec![
                    Session {
                        id: "sess-current".to_string(),
                        device: "Chrome on macOS".to_string(),
                        location: "Ho Chi Minh City, VN".to_string(),
                        last_active: now,
                        current: true,
                    },
                    Session {
                        id: "sess-mobile".to_string(),
                        device: "Safari on iPhone".to_string(),
                        location: "Hanoi, VN".to_string(),
                        last_active: now - Duration::days(2),
                        current: false,
                    },
                ],
            },
            preferences: Preferences {
                theme: Theme::System,
                email_alerts: true,
                fraud_alerts: true,
                language: "en".to_string(),
            },
            activity: vec![ActivityEntry {
                timestamp: now - Duration::days(2),
                action: "Login".to_string(),
                status: "success".to_string(),
                ip: "203.0.113.24".to_string(),
            }],
        };
        if let Some(identity) = identity {
            state.sync_identity(identity);
        }
        state
    }

    /// Overwrite the identity-owned fields from the live identity record
    pub fn sync_identity(&mut self, identity: &Identity) {
        self.user.full_name = identity.name.clone();
        self.user.email = identity.email.clone();
        self.user.role = identity.role;
    }

    pub fn record_activity(&mut self, action: &str, status: &str, ip: &str, now: DateTime<Utc>) {
        self.activity.insert(
            0,
            ActivityEntry {
                timestamp: now,
                action: action.to_string(),
                status: status.to_string(),
                ip: ip.to_string(),
            },
        );
    }

    /// Remove a session; returns whether one matched
    pub fn remove_session(&mut self, session_id: &str) -> bool {
        let before = self.security.sessions.len();
        self.security.sessions.retain(|s| s.id != session_id);
        self.security.sessions.len() != before
    }
}

/// Partial update of `ProfileUser`. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub profile_image: Option<String>,
}

impl UserPatch {
    pub fn apply(&self, user: &mut ProfileUser) {
        if let Some(ref v) = self.full_name {
            user.full_name = v.clone();
        }
        if let Some(ref v) = self.email {
            user.email = v.clone();
        }
        if let Some(ref v) = self.phone {
            user.phone = v.clone();
        }
        if let Some(ref v) = self.address {
            user.address = v.clone();
        }
        if let Some(ref v) = self.profile_image {
            user.profile_image = Some(v.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    pub theme: Option<Theme>,
    pub email_alerts: Option<bool>,
    pub fraud_alerts: Option<bool>,
    pub language: Option<String>,
}

impl PreferencesPatch {
    pub fn apply(&self, prefs: &mut Preferences) {
        if let Some(theme) = self.theme {
            prefs.theme = theme;
        }
        if let Some(v) = self.email_alerts {
            prefs.email_alerts = v;
        }
        if let Some(v) = self.fraud_alerts {
            prefs.fraud_alerts = v;
        }
        if let Some(ref v) = self.language {
            prefs.language = v.clone();
        }
    }
}

//! # Identity Module
//!
//! Định nghĩa Role và Identity cho người dùng đang đăng nhập.
//! - User: Khách hàng tải tài liệu, quản lý consent
//! - Bank: Nhân viên ngân hàng xác minh hồ sơ KYC

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vai trò của người dùng trong dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Bank,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bank => "bank",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bản ghi identity được lưu dưới key `user`.
///
/// Mọi dữ liệu theo người dùng (documents) được phân vùng theo `email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl Identity {
    pub fn new(name: &str, email: &str, role: Role) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            role,
        }
    }

    /// Partition key: email viết thường
    pub fn partition_key(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> ({})", self.name, self.email, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_str() {
        assert_eq!(Role::Bank.as_str(), "bank");
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(serde_json::to_value(Role::Bank).unwrap(), "bank");
    }

    #[test]
    fn test_identity_partition_key() {
        let id = Identity::new("An", " An@Example.COM ", Role::User);
        assert_eq!(id.partition_key(), "an@example.com");
    }

    #[test]
    fn test_identity_missing_role_defaults_to_user() {
        let id: Identity = serde_json::from_str(r#"{"name":"An","email":"an@x.com"}"#).unwrap();
        assert_eq!(id.role, Role::User);
        assert_eq!(format!("{}", id), "An <an@x.com> (user)");
    }
}

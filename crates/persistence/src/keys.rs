//! Snapshot keys - tên cố định cho từng collection

/// Identity record của người dùng đang đăng nhập
pub const USER: &str = "user";
pub const CREDENTIALS: &str = "credentials";
pub const PROFILE: &str = "profile";
pub const CONSENTS: &str = "consents";
pub const FRAUD_ALERTS: &str = "fraud_alerts";
pub const VERIFICATION_USERS: &str = "verification_users";
pub const VERIFICATION_LOGS: &str = "verification_logs";

const DOCUMENTS_PREFIX: &str = "documents:";

/// Per-user document key, scoped by lower-cased email
pub fn documents(email: &str) -> String {
    format!("{}{}", DOCUMENTS_PREFIX, email.trim().to_lowercase())
}

/// Ngược lại với `documents()`: lấy email từ key
pub fn documents_owner(key: &str) -> Option<&str> {
    key.strip_prefix(DOCUMENTS_PREFIX)
}

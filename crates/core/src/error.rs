//! # Error Module
//!
//! Định nghĩa các domain errors cho Kycdesk sử dụng thiserror.

use thiserror::Error;

/// Core domain errors.
///
/// Các lỗi nghiệp vụ cốt lõi, không liên quan đến infrastructure.
/// Mỗi variant có một `code()` ổn định để UI phân loại lỗi.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // === Identity errors ===
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    // === Lookup errors ===
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    // === Conflict errors ===
    #[error("Consent already granted to {0}")]
    DuplicateConsent(String),

    #[error("Email already registered: {0}")]
    AlreadyRegistered(String),

    // === Validation errors ===
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min_len} characters")]
    WeakPassword { min_len: usize },

    // === Auth errors ===
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email not verified: {0}")]
    EmailNotVerified(String),

    #[error("Invalid verification code")]
    InvalidOtp,

    #[error("Verification code expired")]
    OtpExpired,
}

/// Result type alias với CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Tạo NotFound error
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Mã lỗi ổn định (tương đương `code` trong JSON response)
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::AuthenticationRequired(_) => "AUTH_REQUIRED",
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::DuplicateConsent(_) => "DUPLICATE_CONSENT",
            CoreError::AlreadyRegistered(_) => "ALREADY_REGISTERED",
            CoreError::Validation(_) => "VALIDATION",
            CoreError::PasswordMismatch => "PASSWORD_MISMATCH",
            CoreError::WeakPassword { .. } => "WEAK_PASSWORD",
            CoreError::InvalidCredentials => "INVALID_CREDENTIALS",
            CoreError::EmailNotVerified(_) => "EMAIL_NOT_VERIFIED",
            CoreError::InvalidOtp => "INVALID_OTP",
            CoreError::OtpExpired => "OTP_EXPIRED",
        }
    }

    /// Kiểm tra có phải lỗi not found không
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }

    /// Kiểm tra có phải lỗi trùng lặp không
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            CoreError::DuplicateConsent(_) | CoreError::AlreadyRegistered(_)
        )
    }

    /// Kiểm tra có phải lỗi validation (hiển thị cạnh form field)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_) | CoreError::PasswordMismatch | CoreError::WeakPassword { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::not_found("Log", "LOG-404");
        assert_eq!(err.to_string(), "Log not found: LOG-404");

        let err = CoreError::DuplicateConsent("HDFC Bank".to_string());
        assert_eq!(err.to_string(), "Consent already granted to HDFC Bank");

        let err = CoreError::WeakPassword { min_len: 8 };
        assert_eq!(err.to_string(), "Password must be at least 8 characters");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CoreError::AuthenticationRequired("upload".into()).code(),
            "AUTH_REQUIRED"
        );
        assert_eq!(CoreError::not_found("Alert", "x").code(), "NOT_FOUND");
        assert_eq!(CoreError::PasswordMismatch.code(), "PASSWORD_MISMATCH");
    }

    #[test]
    fn test_error_checks() {
        assert!(CoreError::not_found("Consent", "ACME").is_not_found());
        assert!(CoreError::DuplicateConsent("ACME".into()).is_conflict());
        assert!(CoreError::PasswordMismatch.is_validation());
        assert!(CoreError::WeakPassword { min_len: 8 }.is_validation());
        assert!(!CoreError::InvalidOtp.is_validation());
    }
}

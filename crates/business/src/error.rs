//! Business layer errors
//!
//! `ServiceError` gom lỗi domain (`CoreError`) và lỗi lưu trữ
//! (`PersistenceError`) thành một kiểu duy nhất cho mọi store operation.

use kycdesk_core::CoreError;
use kycdesk_persistence::PersistenceError;
use thiserror::Error;

/// Store operation errors
#[derive(Debug, Error)]
pub enum ServiceError {
    // === Domain errors ===
    #[error(transparent)]
    Core(#[from] CoreError),

    // === Storage errors ===
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type alias for store operations
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Stable discriminator, mirrors `CoreError::code`
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Core(e) => e.code(),
            ServiceError::Persistence(_) => "PERSISTENCE",
        }
    }

    /// Domain error, if this is one
    pub fn core(&self) -> Option<&CoreError> {
        match self {
            ServiceError::Core(e) => Some(e),
            ServiceError::Persistence(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.core().map(CoreError::is_not_found).unwrap_or(false)
    }

    pub fn is_conflict(&self) -> bool {
        self.core().map(CoreError::is_conflict).unwrap_or(false)
    }

    pub fn is_validation(&self) -> bool {
        self.core().map(CoreError::is_validation).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_is_transparent() {
        let err: ServiceError = CoreError::not_found("Log", "LOG-x").into();
        assert_eq!(err.to_string(), "Log not found: LOG-x");
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_persistence_code() {
        let err: ServiceError = PersistenceError::InvalidKey(String::new()).into();
        assert_eq!(err.code(), "PERSISTENCE");
        assert!(err.core().is_none());
        assert!(!err.is_not_found());
    }
}

//! # Kycdesk Core
//!
//! Core domain types cho Kycdesk - KYC dashboard backend.
//!
//! ## Modules
//!
//! - `identity`: Role, Identity (người dùng đang đăng nhập)
//! - `credential`: Credential, OTP cho luồng đăng ký
//! - `document`: DocumentRecord, AiReport, UploadFile
//! - `consent`: ConsentRecord, grant/revoke
//! - `alert`: FraudAlertRecord, resolve
//! - `profile`: ProfileState, patches
//! - `applicant`: roster phía ngân hàng, quyết định xác minh
//! - `log`: VerificationLogEntry, LogQuery, LogDetails
//! - `digest`: SHA-256 và synthetic transaction hash
//! - `page`: phân trang offset

pub mod alert;
pub mod applicant;
pub mod consent;
pub mod credential;
pub mod digest;
pub mod document;
pub mod error;
pub mod identity;
pub mod log;
pub mod page;
pub mod profile;

pub use alert::{
    Affected, AffectedKind, AlertDetails, AlertStatus, AlertType, BlockchainVerification,
    FraudAlertRecord, Severity,
};
pub use applicant::{
    Applicant, ApplicantDocument, DocumentVerification, FraudAnalysis, FraudStatus,
    HistoryAction, HistoryEntry, IntegrityResult, UserQuery, VerificationStatus,
};
pub use consent::{ConsentRecord, ConsentStatus, GrantOutcome};
pub use credential::{Credential, Registration};
pub use digest::{sha256_hex, synthetic_tx_hash};
pub use document::{AiReport, DocumentPatch, DocumentRecord, DocumentStatus, UploadFile};
pub use error::{CoreError, CoreResult};
pub use identity::{Identity, Role};
pub use log::{LogAction, LogDetails, LogQuery, LogStatus, VerificationLogEntry};
pub use page::{paginate, Page};
pub use profile::{
    ActivityEntry, Preferences, PreferencesPatch, ProfileState, ProfileUser, SecuritySettings,
    Session, Theme, UserPatch,
};

//! # Kycdesk Business
//!
//! Business logic layer - các store của KYC dashboard dưới dạng service
//! object, dùng chung một `KycContext`.
//!
//! ## Stores
//!
//! - `documents`: tài liệu theo từng user (email)
//! - `consents`: consent của institution, grant/revoke
//! - `alerts`: fraud alert, resolve/review/report
//! - `profile`: hồ sơ, tuỳ chọn, mật khẩu, session
//! - `verification`: roster phía ngân hàng, kiểm tra và quyết định
//! - `logs`: verification log dùng chung
//! - `auth`: đăng ký, OTP, đăng nhập

pub mod alerts;
pub mod app;
pub mod auth;
pub mod capability;
pub mod config;
pub mod consents;
pub mod context;
pub mod documents;
pub mod error;
pub mod identity;
pub mod logs;
pub mod profile;
pub mod verification;

pub use alerts::FraudAlertRegistry;
pub use app::{KycApp, KycAppBuilder};
pub use auth::AuthService;
pub use capability::{
    DigestIntegrityChecker, DocumentIntegrityChecker, FraudClassifier, FraudScore,
    RandomFraudClassifier, RandomIntegrityChecker,
};
pub use config::KycConfig;
pub use consents::ConsentRegistry;
pub use context::{Ack, KycContext, SnapshotCell};
pub use documents::DocumentStore;
pub use error::{ServiceError, ServiceResult};
pub use identity::IdentityService;
pub use logs::VerificationLogRegistry;
pub use profile::ProfileStore;
pub use verification::VerificationWorkflow;

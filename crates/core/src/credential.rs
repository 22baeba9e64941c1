//! # Credential Module
//!
//! Thông tin đăng nhập cho luồng register -> verify OTP -> login.
//! Mật khẩu lưu dạng salted SHA-256 (demo grade).

use crate::digest::{random_hex, salted_sha256};
use crate::error::{CoreError, CoreResult};
use crate::identity::{Identity, Role};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOtp {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub salt: String,
    pub password_hash: String,
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<PendingOtp>,
    pub created_at: DateTime<Utc>,
}

/// Result of a registration or OTP resend; the code is what would be emailed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub otp: String,
    pub expires_at: DateTime<Utc>,
}

/// Email shape check: one `@`, non-empty local part, dotted domain
pub fn validate_email(email: &str) -> CoreResult<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Invalid email address: {}", email)))
    }
}

/// Check `next == confirm` first, then the length floor
pub fn validate_new_password(next: &str, confirm: &str, min_len: usize) -> CoreResult<()> {
    if next != confirm {
        return Err(CoreError::PasswordMismatch);
    }
    if next.chars().count() < min_len {
        return Err(CoreError::WeakPassword { min_len });
    }
    Ok(())
}

impl Credential {
    pub fn new(full_name: &str, email: &str, role: Role, password: &str) -> Self {
        let salt = random_hex(16);
        Self {
            full_name: full_name.trim().to_string(),
            email: email.trim().to_lowercase(),
            role,
            password_hash: salted_sha256(&salt, password),
            salt,
            verified: false,
            otp: None,
            created_at: Utc::now(),
        }
    }

    pub fn check_password(&self, password: &str) -> bool {
        salted_sha256(&self.salt, password) == self.password_hash
    }

    /// Re-salt and store a new password
    pub fn set_password(&mut self, password: &str) {
        self.salt = random_hex(16);
        self.password_hash = salted_sha256(&self.salt, password);
    }

    /// Issue a fresh 6-digit code, replacing any pending one
    pub fn issue_otp(&mut self, ttl: Duration, now: DateTime<Utc>) -> Registration {
        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32));
        let expires_at = now + ttl;
        self.otp = Some(PendingOtp {
            code: code.clone(),
            expires_at,
        });
        Registration {
            email: self.email.clone(),
            otp: code,
            expires_at,
        }
    }

    /// Mark the email verified if `code` matches an unexpired OTP
    pub fn verify_otp(&mut self, code: &str, now: DateTime<Utc>) -> CoreResult<()> {
        let pending = self.otp.as_ref().ok_or(CoreError::InvalidOtp)?;
        if pending.code != code.trim() {
            return Err(CoreError::InvalidOtp);
        }
        if now > pending.expires_at {
            return Err(CoreError::OtpExpired);
        }
        self.verified = true;
        self.otp = None;
        Ok(())
    }

    pub fn identity(&self) -> Identity {
        Identity::new(&self.full_name, &self.email, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("u@x.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@x.com").is_err());
        assert!(validate_email("u@localhost").is_err());
        assert!(validate_email("u@x.com.").is_err());
    }

    #[test]
    fn test_validate_new_password_order() {
        assert_eq!(
            validate_new_password("short", "other", 8),
            Err(CoreError::PasswordMismatch)
        );
        assert_eq!(
            validate_new_password("short", "short", 8),
            Err(CoreError::WeakPassword { min_len: 8 })
        );
        assert!(validate_new_password("long enough", "long enough", 8).is_ok());
    }

    #[test]
    fn test_password_roundtrip() {
        let mut cred = Credential::new("An", "An@X.com", Role::User, "password123");
        assert_eq!(cred.email, "an@x.com");
        assert!(cred.check_password("password123"));
        assert!(!cred.check_password("password124"));

        cred.set_password("new-password");
        assert!(cred.check_password("new-password"));
        assert!(!cred.check_password("password123"));
    }

    #[test]
    fn test_otp_flow() {
        let mut cred = Credential::new("An", "an@x.com", Role::User, "password123");
        let now = Utc::now();
        let reg = cred.issue_otp(Duration::minutes(5), now);
        assert_eq!(reg.otp.len(), 6);

        assert_eq!(cred.verify_otp("not-it", now), Err(CoreError::InvalidOtp));
        assert!(!cred.verified);

        cred.verify_otp(&reg.otp, now).unwrap();
        assert!(cred.verified);
        assert!(cred.otp.is_none());
    }

    #[test]
    fn test_otp_expired() {
        let mut cred = Credential::new("An", "an@x.com", Role::User, "password123");
        let now = Utc::now();
        let reg = cred.issue_otp(Duration::minutes(5), now);
        let later = now + Duration::minutes(6);
        assert_eq!(cred.verify_otp(&reg.otp, later), Err(CoreError::OtpExpired));
    }
}

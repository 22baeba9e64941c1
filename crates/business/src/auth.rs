//! Authentication flows - register, OTP, login, logout
//!
//! Credential lưu theo email viết thường trong snapshot `credentials`.

use crate::context::{Ack, KycContext, SnapshotCell};
use crate::error::ServiceResult;
use crate::identity::IdentityService;
use chrono::Utc;
use kycdesk_core::credential::{validate_email, validate_new_password};
use kycdesk_core::{CoreError, Credential, Identity, Registration, Role};
use kycdesk_persistence::keys;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

type CredentialBook = BTreeMap<String, Credential>;

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct AuthService {
    ctx: Arc<KycContext>,
    identity: IdentityService,
    credentials: SnapshotCell<CredentialBook>,
}

impl AuthService {
    pub fn new(ctx: Arc<KycContext>, identity: IdentityService) -> Self {
        Self {
            ctx,
            identity,
            credentials: SnapshotCell::new(keys::CREDENTIALS),
        }
    }

    /// Create an unverified account and issue its first OTP
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> ServiceResult<Registration> {
        self.ctx.simulate_latency().await;
        if full_name.trim().is_empty() {
            return Err(CoreError::Validation("Full name is required".to_string()).into());
        }
        validate_email(email)?;
        validate_new_password(password, password, self.ctx.config().min_password_len)?;

        let key = normalize(email);
        let ttl = self.ctx.config().otp_ttl();
        let registration = self
            .credentials
            .update(self.ctx.store(), CredentialBook::new, |book| {
                if book.contains_key(&key) {
                    return Err(CoreError::AlreadyRegistered(key.clone()).into());
                }
                let mut credential = Credential::new(full_name, &key, role, password);
                let registration = credential.issue_otp(ttl, Utc::now());
                book.insert(key.clone(), credential);
                Ok(registration)
            })
            .await?;

        info!(email = %registration.email, role = %role, "Account registered");
        Ok(registration)
    }

    pub async fn verify_otp(&self, email: &str, code: &str) -> ServiceResult<Ack> {
        self.ctx.simulate_latency().await;
        let key = normalize(email);
        self.credentials
            .update(self.ctx.store(), CredentialBook::new, |book| {
                let credential = book
                    .get_mut(&key)
                    .ok_or_else(|| CoreError::not_found("Account", &key))?;
                credential.verify_otp(code, Utc::now())?;
                Ok(())
            })
            .await?;

        info!(email = %key, "Email verified");
        Ok(Ack::ok())
    }

    /// Replace the pending OTP with a fresh one
    pub async fn resend_otp(&self, email: &str) -> ServiceResult<Registration> {
        self.ctx.simulate_latency().await;
        let key = normalize(email);
        let ttl = self.ctx.config().otp_ttl();
        let registration = self
            .credentials
            .update(self.ctx.store(), CredentialBook::new, |book| {
                let credential = book
                    .get_mut(&key)
                    .ok_or_else(|| CoreError::not_found("Account", &key))?;
                if credential.verified {
                    return Err(CoreError::Validation(format!(
                        "Email already verified: {}",
                        key
                    ))
                    .into());
                }
                Ok(credential.issue_otp(ttl, Utc::now()))
            })
            .await?;

        info!(email = %key, "OTP re-issued");
        Ok(registration)
    }

    /// Check the password and make the account the current identity
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<Identity> {
        self.ctx.simulate_latency().await;
        let key = normalize(email);
        let book = self
            .credentials
            .read(self.ctx.store(), CredentialBook::new)
            .await?;

        let credential = book
            .get(&key)
            .filter(|c| c.check_password(password))
            .ok_or(CoreError::InvalidCredentials)?;
        if !credential.verified {
            return Err(CoreError::EmailNotVerified(key).into());
        }

        let identity = credential.identity();
        self.identity.set(&identity).await?;
        info!(identity = %identity, "Logged in");
        Ok(identity)
    }

    pub async fn logout(&self) -> ServiceResult<Ack> {
        self.ctx.simulate_latency().await;
        self.identity.clear().await?;
        info!("Logged out");
        Ok(Ack::ok())
    }

    /// Verify `current` and store `next`. `Ok(false)` when no credential is on file.
    pub async fn change_password(
        &self,
        email: &str,
        current: &str,
        next: &str,
    ) -> ServiceResult<bool> {
        let key = normalize(email);
        self.credentials
            .update(self.ctx.store(), CredentialBook::new, |book| {
                let Some(credential) = book.get_mut(&key) else {
                    return Ok(false);
                };
                if !credential.check_password(current) {
                    return Err(CoreError::InvalidCredentials.into());
                }
                credential.set_password(next);
                Ok(true)
            })
            .await
    }

    /// Carry a profile rename over to the credential. `Ok(false)` when none exists.
    pub async fn rename_account(
        &self,
        old_email: &str,
        full_name: &str,
        new_email: &str,
    ) -> ServiceResult<bool> {
        let old_key = normalize(old_email);
        let new_key = normalize(new_email);
        let renamed = self
            .credentials
            .update(self.ctx.store(), CredentialBook::new, |book| {
                if old_key != new_key && book.contains_key(&new_key) {
                    return Err(CoreError::AlreadyRegistered(new_key.clone()).into());
                }
                let Some(mut credential) = book.remove(&old_key) else {
                    return Ok(false);
                };
                credential.full_name = full_name.to_string();
                credential.email = new_key.clone();
                book.insert(new_key.clone(), credential);
                Ok(true)
            })
            .await?;

        if renamed {
            info!(from = %old_key, to = %new_key, "Account renamed");
        }
        Ok(renamed)
    }

    pub async fn is_registered(&self, email: &str) -> ServiceResult<bool> {
        let book = self
            .credentials
            .read(self.ctx.store(), CredentialBook::new)
            .await?;
        Ok(book.contains_key(&normalize(email)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_context;

    fn service() -> AuthService {
        let ctx = memory_context();
        AuthService::new(ctx.clone(), IdentityService::new(ctx))
    }

    #[tokio::test]
    async fn test_register_verify_login() {
        let auth = service();
        let reg = auth
            .register("Nguyen Van An", "An@X.com", "password123", Role::User)
            .await
            .unwrap();
        assert_eq!(reg.email, "an@x.com");
        assert_eq!(reg.otp.len(), 6);

        let err = auth.login("an@x.com", "password123").await.unwrap_err();
        assert_eq!(err.code(), "EMAIL_NOT_VERIFIED");

        auth.verify_otp("an@x.com", &reg.otp).await.unwrap();
        let identity = auth.login("AN@x.com", "password123").await.unwrap();
        assert_eq!(identity.name, "Nguyen Van An");
        assert_eq!(identity.email, "an@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let auth = service();
        auth.register("A", "a@x.com", "password123", Role::User)
            .await
            .unwrap();
        let err = auth
            .register("B", "A@x.com", "password456", Role::Bank)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let auth = service();
        let err = auth
            .register("A", "a@x.com", "short", Role::User)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(!auth.is_registered("a@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_otp_and_password() {
        let auth = service();
        let reg = auth
            .register("A", "a@x.com", "password123", Role::User)
            .await
            .unwrap();
        let wrong = if reg.otp == "000000" { "111111" } else { "000000" };
        assert_eq!(
            auth.verify_otp("a@x.com", wrong).await.unwrap_err().code(),
            "INVALID_OTP"
        );

        auth.verify_otp("a@x.com", &reg.otp).await.unwrap();
        assert_eq!(
            auth.login("a@x.com", "nope-nope").await.unwrap_err().code(),
            "INVALID_CREDENTIALS"
        );
        assert_eq!(
            auth.login("ghost@x.com", "password123").await.unwrap_err().code(),
            "INVALID_CREDENTIALS"
        );
    }

    #[tokio::test]
    async fn test_resend_after_verify_fails() {
        let auth = service();
        let reg = auth
            .register("A", "a@x.com", "password123", Role::User)
            .await
            .unwrap();
        let again = auth.resend_otp("a@x.com").await.unwrap();
        assert_eq!(again.email, reg.email);

        auth.verify_otp("a@x.com", &again.otp).await.unwrap();
        assert!(auth.resend_otp("a@x.com").await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_change_password() {
        let auth = service();
        assert!(!auth.change_password("none@x.com", "a", "b").await.unwrap());

        auth.register("A", "a@x.com", "password123", Role::User)
            .await
            .unwrap();
        let err = auth
            .change_password("a@x.com", "wrong", "newpassword")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_CREDENTIALS");
        assert!(auth
            .change_password("a@x.com", "password123", "newpassword")
            .await
            .unwrap());
    }
}

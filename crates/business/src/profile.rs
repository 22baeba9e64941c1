//! Profile store
//!
//! Một ProfileState duy nhất. Mỗi lần đọc đều đồng bộ lại
//! `full_name`/`email`/`role` từ identity và ghi snapshot xuống storage.

use crate::auth::AuthService;
use crate::context::{Ack, KycContext, SnapshotCell};
use crate::error::ServiceResult;
use crate::identity::IdentityService;
use chrono::Utc;
use kycdesk_core::credential::{validate_email, validate_new_password};
use kycdesk_core::{
    Identity, Preferences, PreferencesPatch, ProfileState, ProfileUser, SecuritySettings,
    UserPatch,
};
use kycdesk_persistence::keys;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// IP recorded for activity originating from this process
pub const LOCAL_IP: &str = "127.0.0.1";

pub struct ProfileStore {
    ctx: Arc<KycContext>,
    identity: IdentityService,
    auth: Arc<AuthService>,
    profile: SnapshotCell<ProfileState>,
}

impl ProfileStore {
    pub fn new(ctx: Arc<KycContext>, identity: IdentityService, auth: Arc<AuthService>) -> Self {
        Self {
            ctx,
            identity,
            auth,
            profile: SnapshotCell::new(keys::PROFILE),
        }
    }

    /// Apply `f` to the identity-synced profile and persist
    async fn mutate<F, R>(&self, f: F) -> ServiceResult<R>
    where
        F: FnOnce(&mut ProfileState) -> ServiceResult<R>,
    {
        let identity = self.identity.current().await?;
        let now = Utc::now();
        self.profile
            .update(
                self.ctx.store(),
                || ProfileState::defaults(identity.as_ref(), now),
                |state| {
                    if let Some(ref identity) = identity {
                        state.sync_identity(identity);
                    }
                    f(state)
                },
            )
            .await
    }

    pub async fn get_profile(&self) -> ServiceResult<ProfileState> {
        self.ctx.simulate_latency().await;
        let state = self.mutate(|state| Ok(state.clone())).await?;
        debug!(email = %state.user.email, "Profile read");
        Ok(state)
    }

    /// Merge user fields; name/email changes also go to identity and credential.
    ///
    /// The credential is renamed first so an email clash fails before anything
    /// is written. A later failure puts the credential and identity back.
    pub async fn update_profile(&self, patch: &UserPatch) -> ServiceResult<ProfileUser> {
        self.ctx.simulate_latency().await;
        if let Some(ref email) = patch.email {
            validate_email(email)?;
        }

        let renames_identity = patch.full_name.is_some() || patch.email.is_some();
        let previous = if renames_identity {
            self.identity.current().await?
        } else {
            None
        };

        let mut renamed = false;
        if let Some(ref identity) = previous {
            let name = patch.full_name.as_deref().unwrap_or(&identity.name);
            let email = patch.email.as_deref().unwrap_or(&identity.email);
            renamed = self.auth.rename_account(&identity.email, name, email).await?;
            if let Err(e) = self
                .identity
                .apply_patch(patch.full_name.as_deref(), patch.email.as_deref())
                .await
            {
                self.restore_account(identity, email, renamed).await;
                return Err(e);
            }
        }

        let outcome = self
            .mutate(|state| {
                patch.apply(&mut state.user);
                Ok(state.user.clone())
            })
            .await;
        let user = match outcome {
            Ok(user) => user,
            Err(e) => {
                if let Some(ref identity) = previous {
                    let email = patch.email.as_deref().unwrap_or(&identity.email);
                    self.restore_account(identity, email, renamed).await;
                }
                return Err(e);
            }
        };
        info!(email = %user.email, "Profile updated");
        Ok(user)
    }

    /// Undo a rename: credential back under the old email, identity rewritten
    async fn restore_account(&self, previous: &Identity, renamed_email: &str, renamed: bool) {
        if renamed {
            if let Err(e) = self
                .auth
                .rename_account(renamed_email, &previous.name, &previous.email)
                .await
            {
                warn!(error = %e, email = %previous.email, "Credential rename not rolled back");
            }
        }
        if let Err(e) = self.identity.set(previous).await {
            warn!(error = %e, email = %previous.email, "Identity not restored");
        }
    }

    pub async fn update_preferences(&self, patch: &PreferencesPatch) -> ServiceResult<Preferences> {
        self.ctx.simulate_latency().await;
        let prefs = self
            .mutate(|state| {
                patch.apply(&mut state.preferences);
                Ok(state.preferences.clone())
            })
            .await?;
        info!(theme = ?prefs.theme, language = %prefs.language, "Preferences updated");
        Ok(prefs)
    }

    /// `next == confirm`, length floor, then `current` when a credential exists
    pub async fn update_password(
        &self,
        current: &str,
        next: &str,
        confirm: &str,
    ) -> ServiceResult<Ack> {
        self.ctx.simulate_latency().await;
        validate_new_password(next, confirm, self.ctx.config().min_password_len)?;

        if let Some(identity) = self.identity.current().await? {
            let checked = self.auth.change_password(&identity.email, current, next).await?;
            debug!(checked, "Password change");
        }

        // Credential is already committed; the activity entry is best-effort
        if let Err(e) = self.record_activity("Password changed", "success").await {
            warn!(error = %e, "Password change activity not recorded");
        }
        info!("Password updated");
        Ok(Ack::ok())
    }

    pub async fn set_two_factor(&self, enabled: bool) -> ServiceResult<SecuritySettings> {
        self.ctx.simulate_latency().await;
        let security = self
            .mutate(|state| {
                state.security.two_factor_enabled = enabled;
                let action = if enabled { "2FA enabled" } else { "2FA disabled" };
                state.record_activity(action, "success", LOCAL_IP, Utc::now());
                Ok(state.security.clone())
            })
            .await?;
        info!(enabled, "Two-factor setting changed");
        Ok(security)
    }

    /// Always succeeds, whether or not the session existed
    pub async fn logout_session(&self, session_id: &str) -> ServiceResult<Ack> {
        self.ctx.simulate_latency().await;
        let removed = self.mutate(|state| Ok(state.remove_session(session_id))).await?;
        info!(session_id, removed, "Session logged out");
        Ok(Ack::ok())
    }

    pub async fn deactivate_account(&self) -> ServiceResult<Ack> {
        self.ctx.simulate_latency().await;
        info!("Account deactivation requested");
        Ok(Ack::ok())
    }

    pub async fn delete_account(&self) -> ServiceResult<Ack> {
        self.ctx.simulate_latency().await;
        info!("Account deletion requested");
        Ok(Ack::ok())
    }

    pub async fn record_activity(&self, action: &str, status: &str) -> ServiceResult<()> {
        self.mutate(|state| {
            state.record_activity(action, status, LOCAL_IP, Utc::now());
            Ok(())
        })
        .await
    }
}

//! Identity resolution
//!
//! Identity hiện tại luôn được đọc lại từ storage (key `user`), không cache,
//! để mọi store cùng thấy một người dùng.

use crate::context::KycContext;
use crate::error::ServiceResult;
use kycdesk_core::{CoreError, Identity};
use kycdesk_persistence::{keys, load_json, save_json};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct IdentityService {
    ctx: Arc<KycContext>,
}

impl IdentityService {
    pub fn new(ctx: Arc<KycContext>) -> Self {
        Self { ctx }
    }

    /// The signed-in identity, if any. An unreadable record counts as absent.
    pub async fn current(&self) -> ServiceResult<Option<Identity>> {
        match load_json::<Identity>(self.ctx.store(), keys::USER).await {
            Ok(identity) => Ok(identity),
            Err(e) if e.is_serialization() => {
                warn!(error = %e, "Unreadable identity record ignored");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Like `current`, failing with `AuthenticationRequired` when absent
    pub async fn require(&self, operation: &str) -> ServiceResult<Identity> {
        self.current()
            .await?
            .ok_or_else(|| CoreError::AuthenticationRequired(operation.to_string()).into())
    }

    pub async fn set(&self, identity: &Identity) -> ServiceResult<()> {
        save_json(self.ctx.store(), keys::USER, identity).await?;
        info!(identity = %identity, "Identity set");
        Ok(())
    }

    /// Forget the identity; returns whether one was stored
    pub async fn clear(&self) -> ServiceResult<bool> {
        let existed = self.ctx.store().remove(keys::USER).await?;
        debug!(existed, "Identity cleared");
        Ok(existed)
    }

    /// Mirror a renamed name/email into the stored identity, if there is one
    pub async fn apply_patch(
        &self,
        name: Option<&str>,
        email: Option<&str>,
    ) -> ServiceResult<Option<Identity>> {
        let Some(mut identity) = self.current().await? else {
            return Ok(None);
        };
        if let Some(name) = name {
            identity.name = name.to_string();
        }
        if let Some(email) = email {
            identity.email = email.to_string();
        }
        self.set(&identity).await?;
        Ok(Some(identity))
    }
}

//! Consent registry
//!
//! Một danh sách consent dùng chung. Grant ghi thêm một entry
//! `consent_granted` vào verification log khi có identity.

use crate::context::{KycContext, SnapshotCell};
use crate::error::ServiceResult;
use crate::identity::IdentityService;
use crate::logs::VerificationLogRegistry;
use chrono::Utc;
use kycdesk_core::consent::{grant, revoke};
use kycdesk_core::{ConsentRecord, GrantOutcome, LogAction, LogStatus, VerificationLogEntry};
use kycdesk_persistence::keys;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ConsentRegistry {
    ctx: Arc<KycContext>,
    identity: IdentityService,
    logs: Arc<VerificationLogRegistry>,
    consents: SnapshotCell<Vec<ConsentRecord>>,
}

impl ConsentRegistry {
    pub fn new(
        ctx: Arc<KycContext>,
        identity: IdentityService,
        logs: Arc<VerificationLogRegistry>,
    ) -> Self {
        Self {
            ctx,
            identity,
            logs,
            consents: SnapshotCell::new(keys::CONSENTS),
        }
    }

    pub async fn get_consents(&self) -> ServiceResult<Vec<ConsentRecord>> {
        self.ctx.simulate_latency().await;
        self.consents.read(self.ctx.store(), Vec::new).await
    }

    /// Create, or flip a revoked record back to granted (same id)
    pub async fn grant_consent(&self, institution_name: &str) -> ServiceResult<ConsentRecord> {
        self.ctx.simulate_latency().await;
        let now = Utc::now();
        let (record, outcome) = self
            .consents
            .update(self.ctx.store(), Vec::new, |consents| {
                Ok(grant(consents, institution_name, now)?)
            })
            .await?;

        info!(
            institution = %record.institution_name,
            id = %record.id,
            regranted = outcome == GrantOutcome::Regranted,
            "Consent granted"
        );

        self.audit(&record, LogAction::ConsentGranted, LogStatus::Success)
            .await;
        Ok(record)
    }

    pub async fn revoke_consent(&self, institution_name: &str) -> ServiceResult<ConsentRecord> {
        self.ctx.simulate_latency().await;
        let now = Utc::now();
        let record = self
            .consents
            .update(self.ctx.store(), Vec::new, |consents| {
                Ok(revoke(consents, institution_name, now)?)
            })
            .await?;

        info!(institution = %record.institution_name, id = %record.id, "Consent revoked");

        if self.ctx.config().audit_all_actions {
            self.audit(&record, LogAction::ConsentRevoked, LogStatus::Warning)
                .await;
        }
        Ok(record)
    }

    /// Best-effort log entry: the consent change is already committed
    async fn audit(&self, record: &ConsentRecord, action: LogAction, status: LogStatus) {
        let identity = match self.identity.current().await {
            Ok(Some(identity)) => identity,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Identity lookup failed, consent not logged");
                return;
            }
        };
        let entry = VerificationLogEntry::for_identity(
            &identity,
            action,
            &record.institution_name,
            status,
            record.last_updated,
        );
        if let Err(e) = self.logs.append(entry).await {
            warn!(error = %e, institution = %record.institution_name, "Consent log not written");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_context;
    use kycdesk_core::{ConsentStatus, Identity, LogQuery, Role};

    fn registry() -> (ConsentRegistry, IdentityService, Arc<VerificationLogRegistry>) {
        let ctx = memory_context();
        let identity = IdentityService::new(ctx.clone());
        let logs = Arc::new(VerificationLogRegistry::new(ctx.clone()));
        (
            ConsentRegistry::new(ctx, identity.clone(), logs.clone()),
            identity,
            logs,
        )
    }

    #[tokio::test]
    async fn test_grant_without_identity_skips_log() {
        let (consents, _, logs) = registry();
        consents.grant_consent("Vietcombank").await.unwrap();

        let page = logs.get_verification_logs(&LogQuery::new()).await.unwrap();
        assert_eq!(page.total, 4);
    }

    #[tokio::test]
    async fn test_grant_with_identity_logs() {
        let (consents, identity, logs) = registry();
        identity
            .set(&Identity::new("An", "an@x.com", Role::User))
            .await
            .unwrap();
        consents.grant_consent("HDFC Bank").await.unwrap();

        let page = logs.get_verification_logs(&LogQuery::new()).await.unwrap();
        assert_eq!(page.total, 5);
        let first = &page.items[0];
        assert_eq!(first.action, LogAction::ConsentGranted);
        assert_eq!(first.admin, "HDFC Bank");
        assert_eq!(first.user_name, "An");
    }

    #[tokio::test]
    async fn test_revoke_then_regrant_keeps_id() {
        let (consents, _, _) = registry();
        let first = consents.grant_consent("X").await.unwrap();
        let revoked = consents.revoke_consent("x").await.unwrap();
        assert_eq!(revoked.status, ConsentStatus::Revoked);

        let again = consents.grant_consent("X").await.unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.status, ConsentStatus::Granted);
        assert_eq!(consents.get_consents().await.unwrap().len(), 1);
    }
}

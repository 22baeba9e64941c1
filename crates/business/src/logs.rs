//! Verification log registry
//!
//! Audit trail dùng chung, mới nhất đứng đầu. Các store khác ghi thêm entry
//! qua `append`.

use crate::context::{KycContext, SnapshotCell};
use crate::error::ServiceResult;
use kycdesk_core::log::seed_logs;
use kycdesk_core::{CoreError, LogDetails, LogQuery, Page, VerificationLogEntry};
use kycdesk_persistence::keys;
use std::sync::Arc;
use tracing::{debug, info};

pub struct VerificationLogRegistry {
    ctx: Arc<KycContext>,
    logs: SnapshotCell<Vec<VerificationLogEntry>>,
}

impl VerificationLogRegistry {
    pub fn new(ctx: Arc<KycContext>) -> Self {
        Self {
            ctx,
            logs: SnapshotCell::new(keys::VERIFICATION_LOGS),
        }
    }

    /// Filtered page; `total` counts every match before paging
    pub async fn get_verification_logs(
        &self,
        query: &LogQuery,
    ) -> ServiceResult<Page<VerificationLogEntry>> {
        self.ctx.simulate_latency().await;
        let logs = self.logs.read(self.ctx.store(), seed_logs).await?;
        let page = query.apply(&logs);
        debug!(total = page.total, returned = page.items.len(), "Verification logs queried");
        Ok(page)
    }

    pub async fn get_log_details(&self, log_id: &str) -> ServiceResult<LogDetails> {
        self.ctx.simulate_latency().await;
        let logs = self.logs.read(self.ctx.store(), seed_logs).await?;
        let entry = logs
            .iter()
            .find(|e| e.id == log_id)
            .ok_or_else(|| CoreError::not_found("Log", log_id))?;
        Ok(LogDetails::expand(entry, &self.ctx.config().explorer_base_url))
    }

    /// Prepend an entry
    pub async fn append(&self, entry: VerificationLogEntry) -> ServiceResult<VerificationLogEntry> {
        let stored = entry.clone();
        self.logs
            .update(self.ctx.store(), seed_logs, move |logs| {
                logs.insert(0, entry);
                Ok(())
            })
            .await?;
        info!(id = %stored.id, action = %stored.action, "Verification log appended");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_context;
    use chrono::Utc;
    use kycdesk_core::{LogAction, LogStatus};

    #[tokio::test]
    async fn test_seeded_logs() {
        let registry = VerificationLogRegistry::new(memory_context());
        let page = registry.get_verification_logs(&LogQuery::new()).await.unwrap();
        assert_eq!(page.total, 4);
        assert!(page.items.windows(2).all(|w| w[0].ts >= w[1].ts));
    }

    #[tokio::test]
    async fn test_append_goes_first() {
        let registry = VerificationLogRegistry::new(memory_context());
        let entry = VerificationLogEntry::new(
            "USR-1001",
            "Nguyen Van An",
            LogAction::Flagged,
            "Bank Officer",
            LogStatus::Warning,
            Utc::now(),
        );
        registry.append(entry.clone()).await.unwrap();

        let page = registry.get_verification_logs(&LogQuery::new()).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items[0].id, entry.id);
    }

    #[tokio::test]
    async fn test_details_explorer_url() {
        let registry = VerificationLogRegistry::new(memory_context());
        let details = registry.get_log_details("LOG-0003").await.unwrap();
        assert!(details.explorer_url.ends_with(&details.entry.tx));
        assert!(details.fraud.is_some());

        let err = registry.get_log_details("nonexistent-id").await.unwrap_err();
        assert!(err.to_string().contains("Log not found"));
    }
}

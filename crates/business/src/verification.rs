//! Verification workflow (bank role)
//!
//! Roster applicant với query/filter/phân trang, kiểm tra digest và chấm
//! điểm gian lận qua capability, và quyết định xác minh có ghi history.
//! Kiểm tra và chấm điểm chỉ đọc, không ghi gì vào roster.

use crate::context::{Ack, KycContext, SnapshotCell};
use crate::error::ServiceResult;
use crate::logs::VerificationLogRegistry;
use chrono::Utc;
use kycdesk_core::applicant::{decide, seed_roster};
use kycdesk_core::{
    sha256_hex, Applicant, ApplicantDocument, CoreError, DocumentVerification, FraudAnalysis,
    FraudStatus, HistoryEntry, LogAction, LogStatus, Page, UserQuery, VerificationLogEntry,
    VerificationStatus,
};
use kycdesk_persistence::keys;
use std::sync::Arc;
use tracing::{debug, info, warn};

fn seed() -> Vec<Applicant> {
    seed_roster(Utc::now())
}

fn find_document<'a>(
    roster: &'a [Applicant],
    user_id: &str,
    doc_id: &str,
) -> ServiceResult<&'a ApplicantDocument> {
    let applicant = roster
        .iter()
        .find(|a| a.id == user_id)
        .ok_or_else(|| CoreError::not_found("User", user_id))?;
    Ok(applicant
        .find_document(doc_id)
        .ok_or_else(|| CoreError::not_found("Document", doc_id))?)
}

pub struct VerificationWorkflow {
    ctx: Arc<KycContext>,
    logs: Arc<VerificationLogRegistry>,
    roster: SnapshotCell<Vec<Applicant>>,
}

impl VerificationWorkflow {
    pub fn new(ctx: Arc<KycContext>, logs: Arc<VerificationLogRegistry>) -> Self {
        Self {
            ctx,
            logs,
            roster: SnapshotCell::new(keys::VERIFICATION_USERS),
        }
    }

    async fn snapshot(&self) -> ServiceResult<Vec<Applicant>> {
        self.roster.read(self.ctx.store(), seed).await
    }

    /// Filtered page of applicants; `total` is the pre-paging count
    pub async fn get_users(&self, query: &UserQuery) -> ServiceResult<Page<Applicant>> {
        self.ctx.simulate_latency().await;
        let page = query.apply(&self.snapshot().await?);
        debug!(total = page.total, returned = page.items.len(), "Applicants queried");
        Ok(page)
    }

    /// Documents of an applicant; empty for an unknown id
    pub async fn get_user_documents(&self, user_id: &str) -> ServiceResult<Vec<ApplicantDocument>> {
        self.ctx.simulate_latency().await;
        Ok(self
            .snapshot()
            .await?
            .into_iter()
            .find(|a| a.id == user_id)
            .map(|a| a.documents)
            .unwrap_or_default())
    }

    /// Integrity check of the stored digest through the configured checker
    pub async fn verify_document(
        &self,
        user_id: &str,
        doc_id: &str,
    ) -> ServiceResult<DocumentVerification> {
        self.ctx.simulate_latency().await;
        let roster = self.snapshot().await?;
        let doc = find_document(&roster, user_id, doc_id)?;

        let result = self.ctx.integrity().compare(&doc.sha256, &doc.sha256).await;
        info!(
            user_id,
            doc_id,
            checker = self.ctx.integrity().name(),
            result = ?result,
            "Document verified"
        );
        Ok(DocumentVerification {
            result,
            blockchain_tx: doc.blockchain_tx.clone(),
        })
    }

    /// Recompute the digest from `bytes` and compare with the stored one
    pub async fn verify_document_bytes(
        &self,
        user_id: &str,
        doc_id: &str,
        bytes: &[u8],
    ) -> ServiceResult<DocumentVerification> {
        self.ctx.simulate_latency().await;
        let roster = self.snapshot().await?;
        let doc = find_document(&roster, user_id, doc_id)?;

        let recomputed = sha256_hex(bytes);
        let result = self.ctx.integrity().compare(&doc.sha256, &recomputed).await;
        info!(user_id, doc_id, result = ?result, "Document bytes verified");
        Ok(DocumentVerification {
            result,
            blockchain_tx: doc.blockchain_tx.clone(),
        })
    }

    /// Score through the classifier, then apply the status thresholds
    pub async fn analyze_fraud(&self, user_id: &str, doc_id: &str) -> ServiceResult<FraudAnalysis> {
        self.ctx.simulate_latency().await;
        let roster = self.snapshot().await?;
        let doc = find_document(&roster, user_id, doc_id)?;

        let raw = self.ctx.classifier().score(doc).await;
        let score = raw.score.min(100);
        let status = FraudStatus::from_score(score);

        let mut flags: Vec<String> = status.flag().map(str::to_string).into_iter().collect();
        flags.extend(raw.flags);

        info!(user_id, doc_id, score, status = %status, "Fraud analysis");
        Ok(FraudAnalysis {
            score,
            status,
            flags,
        })
    }

    /// Set the status and prepend a history entry
    pub async fn update_verification(
        &self,
        user_id: &str,
        status: VerificationStatus,
    ) -> ServiceResult<Ack> {
        self.ctx.simulate_latency().await;
        let reviewer = self.ctx.config().reviewer_name.clone();
        let now = Utc::now();
        let (entry, user_name) = self
            .roster
            .update(self.ctx.store(), seed, |roster| {
                let entry = decide(roster, user_id, status, &reviewer, now)?;
                let name = roster
                    .iter()
                    .find(|a| a.id == user_id)
                    .map(|a| a.full_name.clone())
                    .unwrap_or_default();
                Ok((entry, name))
            })
            .await?;

        info!(user_id, status = %status, history_id = %entry.id, "Verification decided");

        if self.ctx.config().audit_all_actions {
            self.audit(user_id, &user_name, status, &reviewer).await;
        }
        Ok(Ack::ok())
    }

    /// Newest first; empty for an unknown id
    pub async fn get_verification_history(
        &self,
        user_id: &str,
    ) -> ServiceResult<Vec<HistoryEntry>> {
        self.ctx.simulate_latency().await;
        Ok(self
            .snapshot()
            .await?
            .into_iter()
            .find(|a| a.id == user_id)
            .map(|a| a.history)
            .unwrap_or_default())
    }

    async fn audit(&self, user_id: &str, user_name: &str, status: VerificationStatus, admin: &str) {
        let (action, log_status) = match status {
            VerificationStatus::Verified => (LogAction::Approved, LogStatus::Success),
            VerificationStatus::Flagged => (LogAction::Flagged, LogStatus::Warning),
            VerificationStatus::Pending => return,
        };
        let entry =
            VerificationLogEntry::new(user_id, user_name, action, admin, log_status, Utc::now());
        if let Err(e) = self.logs.append(entry).await {
            warn!(error = %e, user_id, "Decision log not written");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{DigestIntegrityChecker, FraudClassifier, FraudScore};
    use crate::config::KycConfig;
    use crate::context::KycContext;
    use async_trait::async_trait;
    use kycdesk_core::{HistoryAction, IntegrityResult, LogQuery};
    use kycdesk_persistence::MemoryStore;

    struct FixedClassifier(u8);

    #[async_trait]
    impl FraudClassifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn score(&self, _document: &ApplicantDocument) -> FraudScore {
            FraudScore {
                score: self.0,
                flags: vec!["extra".to_string()],
            }
        }
    }

    fn workflow(
        score: u8,
        audit_all_actions: bool,
    ) -> (VerificationWorkflow, Arc<VerificationLogRegistry>) {
        let config = KycConfig {
            audit_all_actions,
            ..Default::default()
        };
        let ctx = Arc::new(KycContext::new(
            Arc::new(MemoryStore::new()),
            config,
            Arc::new(DigestIntegrityChecker),
            Arc::new(FixedClassifier(score)),
        ));
        let logs = Arc::new(VerificationLogRegistry::new(ctx.clone()));
        (VerificationWorkflow::new(ctx, logs.clone()), logs)
    }

    #[tokio::test]
    async fn test_filter_by_status() {
        let (wf, _) = workflow(30, false);
        let page = wf
            .get_users(&UserQuery::new().status(VerificationStatus::Pending).page(1, 1))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert!(page
            .items
            .iter()
            .all(|a| a.verification_status == VerificationStatus::Pending));
    }

    #[tokio::test]
    async fn test_unknown_user_reads_empty() {
        let (wf, _) = workflow(30, false);
        assert!(wf.get_user_documents("USR-0000").await.unwrap().is_empty());
        assert!(wf.get_verification_history("USR-0000").await.unwrap().is_empty());
        assert_eq!(wf.get_user_documents("USR-1001").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_verify_document() {
        let (wf, _) = workflow(30, false);
        let out = wf.verify_document("USR-1001", "DOC-2001").await.unwrap();
        assert_eq!(out.result, IntegrityResult::Match);
        assert!(out.blockchain_tx.starts_with("0x"));

        let bad = wf
            .verify_document_bytes("USR-1001", "DOC-2001", b"tampered")
            .await
            .unwrap();
        assert_eq!(bad.result, IntegrityResult::Mismatch);

        let user = wf.verify_document("USR-0000", "DOC-2001").await.unwrap_err();
        assert!(user.to_string().contains("User not found"));
        let doc = wf.verify_document("USR-1001", "DOC-9999").await.unwrap_err();
        assert!(doc.to_string().contains("Document not found"));
    }

    #[tokio::test]
    async fn test_analyze_thresholds() {
        for (score, status) in [
            (50, FraudStatus::Safe),
            (51, FraudStatus::Suspicious),
            (75, FraudStatus::Suspicious),
            (76, FraudStatus::Fraud),
        ] {
            let (wf, _) = workflow(score, false);
            let out = wf.analyze_fraud("USR-1001", "DOC-2001").await.unwrap();
            assert_eq!(out.status, status);
            assert_eq!(out.flags.last().map(String::as_str), Some("extra"));
            assert_eq!(out.flags.len(), if status == FraudStatus::Safe { 1 } else { 2 });
        }
    }

    #[tokio::test]
    async fn test_score_is_capped() {
        let (wf, _) = workflow(250, false);
        let out = wf.analyze_fraud("USR-1001", "DOC-2001").await.unwrap();
        assert_eq!(out.score, 100);
        assert_eq!(out.status, FraudStatus::Fraud);
    }

    #[tokio::test]
    async fn test_decision_history_and_audit() {
        let (wf, logs) = workflow(30, true);
        wf.update_verification("USR-1001", VerificationStatus::Flagged)
            .await
            .unwrap();

        let history = wf.get_verification_history("USR-1001").await.unwrap();
        assert_eq!(history[0].action, HistoryAction::Flagged);
        assert_eq!(history[0].admin, "Bank Officer");

        let page = logs
            .get_verification_logs(&LogQuery::new().action(LogAction::Flagged))
            .await
            .unwrap();
        assert_eq!(page.items[0].user_id, "USR-1001");

        let err = wf
            .update_verification("USR-0000", VerificationStatus::Verified)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

//! # Applicant Module
//!
//! Hồ sơ KYC phía ngân hàng: roster người nộp, tài liệu đính kèm,
//! lịch sử quyết định (mới nhất trước) và các kết quả phân tích.

use crate::consent::ConsentStatus;
use crate::digest::sha256_hex;
use crate::document::DocumentStatus;
use crate::error::{CoreError, CoreResult};
use crate::page::{paginate, Page, DEFAULT_PAGE_SIZE};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Flagged,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Flagged => "flagged",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantDocument {
    pub document_id: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub file_name: String,
    pub sha256: String,
    pub blockchain_tx: String,
    pub status: DocumentStatus,
}

/// Action recorded in an applicant's history: a decision or `created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Created,
    Pending,
    Verified,
    Flagged,
}

impl From<VerificationStatus> for HistoryAction {
    fn from(status: VerificationStatus) -> Self {
        match status {
            VerificationStatus::Pending => HistoryAction::Pending,
            VerificationStatus::Verified => HistoryAction::Verified,
            VerificationStatus::Flagged => HistoryAction::Flagged,
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HistoryAction::Created => "created",
            HistoryAction::Pending => "pending",
            HistoryAction::Verified => "verified",
            HistoryAction::Flagged => "flagged",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub admin: String,
    pub action: HistoryAction,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub consent_status: ConsentStatus,
    pub verification_status: VerificationStatus,
    pub last_updated: DateTime<Utc>,
    pub documents: Vec<ApplicantDocument>,
    /// Newest first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Applicant {
    pub fn find_document(&self, doc_id: &str) -> Option<&ApplicantDocument> {
        self.documents.iter().find(|d| d.document_id == doc_id)
    }

    fn matches_text(&self, needle: &str) -> bool {
        self.id.to_lowercase().contains(needle)
            || self.full_name.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
    }
}

/// Roster query. `None` on a filter is the `all` passthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    pub q: Option<String>,
    pub consent: Option<ConsentStatus>,
    pub status: Option<VerificationStatus>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            q: None,
            consent: None,
            status: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl UserQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, q: &str) -> Self {
        self.q = Some(q.to_string());
        self
    }

    pub fn consent(mut self, consent: ConsentStatus) -> Self {
        self.consent = Some(consent);
        self
    }

    pub fn status(mut self, status: VerificationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// Kiểm tra applicant có match query không
    pub fn matches(&self, applicant: &Applicant) -> bool {
        if let Some(ref q) = self.q {
            let needle = q.trim().to_lowercase();
            if !needle.is_empty() && !applicant.matches_text(&needle) {
                return false;
            }
        }
        if let Some(consent) = self.consent {
            if applicant.consent_status != consent {
                return false;
            }
        }
        if let Some(status) = self.status {
            if applicant.verification_status != status {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, roster: &[Applicant]) -> Page<Applicant> {
        let filtered: Vec<Applicant> = roster
            .iter()
            .filter(|a| self.matches(a))
            .cloned()
            .collect();
        paginate(filtered, self.page, self.page_size)
    }
}

/// Outcome of a document hash-integrity comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityResult {
    Match,
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVerification {
    pub result: IntegrityResult,
    pub blockchain_tx: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FraudStatus {
    Safe,
    Suspicious,
    Fraud,
}

impl FraudStatus {
    /// score > 75 => fraud, 50 < score <= 75 => suspicious, otherwise safe
    pub fn from_score(score: u8) -> Self {
        if score > 75 {
            FraudStatus::Fraud
        } else if score > 50 {
            FraudStatus::Suspicious
        } else {
            FraudStatus::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FraudStatus::Safe => "safe",
            FraudStatus::Suspicious => "suspicious",
            FraudStatus::Fraud => "fraud",
        }
    }

    /// Descriptive flag attached whenever the status is not safe
    pub fn flag(&self) -> Option<&'static str> {
        match self {
            FraudStatus::Safe => None,
            FraudStatus::Suspicious => Some("Irregular document patterns detected"),
            FraudStatus::Fraud => Some("High probability of document forgery"),
        }
    }
}

impl fmt::Display for FraudStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub const DUPLICATE_USAGE_FLAG: &str = "Document hash seen in another application (duplicate usage)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudAnalysis {
    pub score: u8,
    pub status: FraudStatus,
    pub flags: Vec<String>,
}

/// Record a decision: status, timestamp, and a history entry at the front.
pub fn decide(
    roster: &mut [Applicant],
    user_id: &str,
    status: VerificationStatus,
    admin: &str,
    now: DateTime<Utc>,
) -> CoreResult<HistoryEntry> {
    let applicant = roster
        .iter_mut()
        .find(|a| a.id == user_id)
        .ok_or_else(|| CoreError::not_found("User", user_id))?;

    let entry = HistoryEntry {
        id: format!("hist_{}", Uuid::new_v4().simple()),
        date: now,
        admin: admin.to_string(),
        action: status.into(),
        notes: String::new(),
    };
    applicant.verification_status = status;
    applicant.last_updated = now;
    applicant.history.insert(0, entry.clone());
    Ok(entry)
}

fn seed_document(id: &str, doc_type: &str, file_name: &str, tx_seed: &str) -> ApplicantDocument {
    ApplicantDocument {
        document_id: id.to_string(),
        doc_type: doc_type.to_string(),
        file_name: file_name.to_string(),
        sha256: sha256_hex(format!("{}:{}", id, file_name).as_bytes()),
        blockchain_tx: format!("0x{}", sha256_hex(tx_seed.as_bytes())),
        status: DocumentStatus::Uploaded,
    }
}

/// Roster mẫu gồm hai applicant.
pub fn seed_roster(now: DateTime<Utc>) -> Vec<Applicant> {
    let created = |days: i64, admin: &str| HistoryEntry {
        id: format!("hist_seed_{}", days),
        date: now - Duration::days(days),
        admin: admin.to_string(),
        action: HistoryAction::Created,
        notes: "Application submitted".to_string(),
    };

    vec![
        Applicant {
            id: "USR-1001".to_string(),
            full_name: "Nguyen Van An".to_string(),
            email: "an.nguyen@example.com".to_string(),
            consent_status: ConsentStatus::Granted,
            verification_status: VerificationStatus::Pending,
            last_updated: now - Duration::days(1),
            documents: vec![
                seed_document("DOC-2001", "passport", "passport_an.pdf", "tx-2001"),
                seed_document("DOC-2002", "utility_bill", "electricity_bill.pdf", "tx-2002"),
            ],
            history: vec![created(5, "System")],
        },
        Applicant {
            id: "USR-1002".to_string(),
            full_name: "Tran Thi Binh".to_string(),
            email: "binh.tran@example.com".to_string(),
            consent_status: ConsentStatus::Revoked,
            verification_status: VerificationStatus::Verified,
            last_updated: now - Duration::days(3),
            documents: vec![seed_document(
                "DOC-2003",
                "national_id",
                "national_id_binh.png",
                "tx-2003",
            )],
            history: vec![created(9, "System")],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraud_thresholds() {
        assert_eq!(FraudStatus::from_score(20), FraudStatus::Safe);
        assert_eq!(FraudStatus::from_score(50), FraudStatus::Safe);
        assert_eq!(FraudStatus::from_score(51), FraudStatus::Suspicious);
        assert_eq!(FraudStatus::from_score(75), FraudStatus::Suspicious);
        assert_eq!(FraudStatus::from_score(76), FraudStatus::Fraud);
        assert!(FraudStatus::Safe.flag().is_none());
        assert!(FraudStatus::Fraud.flag().is_some());
    }

    #[test]
    fn test_query_filters() {
        let roster = seed_roster(Utc::now());

        let pending = UserQuery::new()
            .status(VerificationStatus::Pending)
            .apply(&roster);
        assert_eq!(pending.total, 1);
        assert_eq!(pending.items[0].id, "USR-1001");

        let by_email = UserQuery::new().text("BINH.TRAN").apply(&roster);
        assert_eq!(by_email.total, 1);

        let revoked = UserQuery::new().consent(ConsentStatus::Revoked).apply(&roster);
        assert_eq!(revoked.items[0].id, "USR-1002");

        let all = UserQuery::new().text("  ").apply(&roster);
        assert_eq!(all.total, 2);
    }

    #[test]
    fn test_total_ignores_page_size() {
        let roster = seed_roster(Utc::now());
        let page = UserQuery::new().page(1, 1).apply(&roster);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_decide_prepends_history() {
        let mut roster = seed_roster(Utc::now());
        let entry = decide(
            &mut roster,
            "USR-1001",
            VerificationStatus::Flagged,
            "Bank Officer",
            Utc::now(),
        )
        .unwrap();

        assert_eq!(entry.action, HistoryAction::Flagged);
        assert_eq!(roster[0].verification_status, VerificationStatus::Flagged);
        assert_eq!(roster[0].history[0].id, entry.id);
        assert_eq!(roster[0].history.len(), 2);
    }

    #[test]
    fn test_decide_unknown_user() {
        let mut roster = seed_roster(Utc::now());
        let err = decide(
            &mut roster,
            "USR-9999",
            VerificationStatus::Verified,
            "Bank Officer",
            Utc::now(),
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }
}

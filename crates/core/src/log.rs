//! # Verification Log Module
//!
//! Audit trail toàn cục cho consent và các hành động xác minh.
//! Append-only, mới nhất trước; lọc theo text, action và khoảng thời gian.

use crate::digest::{sha256_hex, synthetic_tx_hash};
use crate::error::{CoreError, CoreResult};
use crate::identity::Identity;
use crate::page::{paginate, Page, DEFAULT_PAGE_SIZE};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    ConsentGranted,
    ConsentRevoked,
    Approved,
    Flagged,
    Upload,
    FraudAlert,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::ConsentGranted => "consent_granted",
            LogAction::ConsentRevoked => "consent_revoked",
            LogAction::Approved => "approved",
            LogAction::Flagged => "flagged",
            LogAction::Upload => "upload",
            LogAction::FraudAlert => "fraud_alert",
        }
    }


    /// Human-readable sentence for detail views
    pub fn describe(&self, user_name: &str, admin: &str) -> String {
        match self {
            LogAction::ConsentGranted => {
                format!("{} granted {} access to their KYC data", user_name, admin)
            }
            LogAction::ConsentRevoked => {
                format!("{} revoked {}'s access to their KYC data", user_name, admin)
            }
            LogAction::Approved => format!("{} approved the KYC submission of {}", admin, user_name),
            LogAction::Flagged => format!("{} flagged the KYC submission of {}", admin, user_name),
            LogAction::Upload => format!("{} uploaded a new document", user_name),
            LogAction::FraudAlert => format!("Fraud alert raised on a document of {}", user_name),
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Warning,
    Critical,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Success => "success",
            LogStatus::Warning => "warning",
            LogStatus::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationLogEntry {
    pub id: String,
    pub ts: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
    pub doc_type: Option<String>,
    pub action: LogAction,
    /// Actor display name or institution name
    pub admin: String,
    pub tx: String,
    pub status: LogStatus,
}

impl VerificationLogEntry {
    /// New entry with a fresh id and synthetic transaction hash
    pub fn new(
        user_id: &str,
        user_name: &str,
        action: LogAction,
        admin: &str,
        status: LogStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("LOG-{}", Uuid::new_v4().simple()),
            ts: now,
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            doc_type: None,
            action,
            admin: admin.to_string(),
            tx: synthetic_tx_hash(),
            status,
        }
    }

    /// Entry attributed to the signed-in identity (keyed by email)
    pub fn for_identity(
        identity: &Identity,
        action: LogAction,
        admin: &str,
        status: LogStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(&identity.email, &identity.name, action, admin, status, now)
    }

    pub fn with_doc_type(mut self, doc_type: &str) -> Self {
        self.doc_type = Some(doc_type.to_string());
        self
    }
}

/// Parse a query bound: RFC 3339 instant, or a `YYYY-MM-DD` date taken as
/// start of day (`from`) or end of day (`to`), UTC.
pub fn parse_bound(value: &str, end_of_day: bool) -> CoreResult<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| CoreError::Validation(format!("Invalid date '{}': {}", value, e)))?;
    let time = if end_of_day {
        NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| CoreError::Validation(format!("Invalid date '{}'", value)))?;
    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}

/// Log query. `None` bounds are unbounded; `action: None` is `all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub q: Option<String>,
    pub action: Option<LogAction>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            q: None,
            action: None,
            from: None,
            to: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl LogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, q: &str) -> Self {
        self.q = Some(q.to_string());
        self
    }

    pub fn action(mut self, action: LogAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Set bounds from strings as the UI sends them
    pub fn range(mut self, from: Option<&str>, to: Option<&str>) -> CoreResult<Self> {
        self.from = from.map(|s| parse_bound(s, false)).transpose()?;
        self.to = to.map(|s| parse_bound(s, true)).transpose()?;
        Ok(self)
    }

    pub fn page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn matches(&self, entry: &VerificationLogEntry) -> bool {
        if let Some(ref q) = self.q {
            let needle = q.trim().to_lowercase();
            if !needle.is_empty()
                && !(entry.user_id.to_lowercase().contains(&needle)
                    || entry.user_name.to_lowercase().contains(&needle)
                    || entry.admin.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        if let Some(from) = self.from {
            if entry.ts < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if entry.ts > to {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, logs: &[VerificationLogEntry]) -> Page<VerificationLogEntry> {
        let filtered: Vec<_> = logs.iter().filter(|e| self.matches(e)).cloned().collect();
        paginate(filtered, self.page, self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDocument {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub file_name: String,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFraud {
    pub risk_score: u8,
    pub reason: String,
}

/// Expanded view of one log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDetails {
    #[serde(flatten)]
    pub entry: VerificationLogEntry,
    pub user: LogUser,
    pub document: LogDocument,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraud: Option<LogFraud>,
    pub explorer_url: String,
}

impl LogDetails {
    /// Synthesize the detail view. Derived fields are a pure function of the entry.
    pub fn expand(entry: &VerificationLogEntry, explorer_base_url: &str) -> Self {
        let email = if entry.user_id.contains('@') {
            entry.user_id.clone()
        } else {
            format!(
                "{}@example.com",
                entry.user_name.to_lowercase().replace(' ', ".")
            )
        };
        let doc_type = entry
            .doc_type
            .clone()
            .unwrap_or_else(|| "kyc_bundle".to_string());
        let fraud = (entry.action == LogAction::FraudAlert).then(|| LogFraud {
            risk_score: 82,
            reason: "AI model detected inconsistencies between document fields".to_string(),
        });

        Self {
            user: LogUser {
                id: entry.user_id.clone(),
                name: entry.user_name.clone(),
                email,
            },
            document: LogDocument {
                file_name: format!("{}.pdf", doc_type),
                sha256: sha256_hex(entry.id.as_bytes()),
                doc_type,
            },
            description: entry.action.describe(&entry.user_name, &entry.admin),
            fraud,
            explorer_url: format!("{}/tx/{}", explorer_base_url.trim_end_matches('/'), entry.tx),
            entry: entry.clone(),
        }
    }
}

fn seed_ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Bốn log mẫu, mới nhất trước.
pub fn seed_logs() -> Vec<VerificationLogEntry> {
    let entry = |id: &str,
                 ts: &str,
                 user_id: &str,
                 user_name: &str,
                 doc_type: Option<&str>,
                 action: LogAction,
                 admin: &str,
                 status: LogStatus| VerificationLogEntry {
        id: id.to_string(),
        ts: seed_ts(ts),
        user_id: user_id.to_string(),
        user_name: user_name.to_string(),
        doc_type: doc_type.map(str::to_string),
        action,
        admin: admin.to_string(),
        tx: format!("0x{}", sha256_hex(id.as_bytes())),
        status,
    };

    vec![
        entry(
            "LOG-0004",
            "2025-01-10T08:15:00Z",
            "USR-1002",
            "Tran Thi Binh",
            None,
            LogAction::ConsentGranted,
            "Vietcombank",
            LogStatus::Success,
        ),
        entry(
            "LOG-0003",
            "2024-07-20T14:42:00Z",
            "USR-1001",
            "Nguyen Van An",
            Some("passport"),
            LogAction::FraudAlert,
            "AI Screening",
            LogStatus::Critical,
        ),
        entry(
            "LOG-0002",
            "2024-05-02T09:05:00Z",
            "USR-1002",
            "Tran Thi Binh",
            Some("national_id"),
            LogAction::Approved,
            "Bank Officer",
            LogStatus::Success,
        ),
        entry(
            "LOG-0001",
            "2024-03-15T10:30:00Z",
            "USR-1001",
            "Nguyen Van An",
            None,
            LogAction::ConsentGranted,
            "HDFC Bank",
            LogStatus::Success,
        ),
    ]
}

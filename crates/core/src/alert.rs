//! # Fraud Alert Module
//!
//! FraudAlertRecord với vòng đời new -> under_review -> resolved.

use crate::digest::sha256_hex;
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of alert kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertType {
    #[serde(rename = "Document Tampering")]
    DocumentTampering,
    #[serde(rename = "Multiple Access Attempts")]
    MultipleAccessAttempts,
    #[serde(rename = "Suspicious Consent")]
    SuspiciousConsent,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::DocumentTampering => "Document Tampering",
            AlertType::MultipleAccessAttempts => "Multiple Access Attempts",
            AlertType::SuspiciousConsent => "Suspicious Consent",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Forward-only: new -> under_review -> resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    New,
    UnderReview,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::New => "new",
            AlertStatus::UnderReview => "under_review",
            AlertStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffectedKind {
    Document,
    Institution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affected {
    #[serde(rename = "type")]
    pub kind: AffectedKind,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockchainVerification {
    Verified,
    Failed,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_name: Option<String>,
    /// 0..=100
    pub ai_risk_score: u8,
    pub blockchain_verification: BlockchainVerification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudAlertRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    pub status: AlertStatus,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub affected: Affected,
    pub details: AlertDetails,
}

/// Ba alert mẫu, mỗi loại một alert với severity khác nhau.
pub fn seed_alerts(now: DateTime<Utc>) -> Vec<FraudAlertRecord> {
    vec![
        FraudAlertRecord {
            id: "FA-1001".to_string(),
            alert_type: AlertType::DocumentTampering,
            severity: Severity::High,
            status: AlertStatus::New,
            timestamp: now - Duration::hours(2),
            description: "Pixel-level inconsistencies detected in the uploaded passport scan"
                .to_string(),
            affected: Affected {
                kind: AffectedKind::Document,
                name: "passport_scan.pdf".to_string(),
            },
            details: AlertDetails {
                document_hash: Some(sha256_hex(b"passport_scan.pdf")),
                institution_name: None,
                ai_risk_score: 87,
                blockchain_verification: BlockchainVerification::Failed,
            },
        },
        FraudAlertRecord {
            id: "FA-1002".to_string(),
            alert_type: AlertType::MultipleAccessAttempts,
            severity: Severity::Medium,
            status: AlertStatus::UnderReview,
            timestamp: now - Duration::days(1),
            description: "Repeated access attempts to KYC data from an unrecognized location"
                .to_string(),
            affected: Affected {
                kind: AffectedKind::Institution,
                name: "Global Finance Corp".to_string(),
            },
            details: AlertDetails {
                document_hash: None,
                institution_name: Some("Global Finance Corp".to_string()),
                ai_risk_score: 64,
                blockchain_verification: BlockchainVerification::Verified,
            },
        },
        FraudAlertRecord {
            id: "FA-1003".to_string(),
            alert_type: AlertType::SuspiciousConsent,
            severity: Severity::Low,
            status: AlertStatus::New,
            timestamp: now - Duration::days(3),
            description: "Consent requested by an institution outside the usual region"
                .to_string(),
            affected: Affected {
                kind: AffectedKind::Institution,
                name: "QuickLoan Services".to_string(),
            },
            details: AlertDetails {
                document_hash: None,
                institution_name: Some("QuickLoan Services".to_string()),
                ai_risk_score: 38,
                blockchain_verification: BlockchainVerification::Pending,
            },
        },
    ]
}

/// Move a `new` alert to `under_review`. Later states are left untouched.
pub fn start_review(
    alerts: &mut [FraudAlertRecord],
    id: &str,
    now: DateTime<Utc>,
) -> CoreResult<FraudAlertRecord> {
    let alert = alerts
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| CoreError::not_found("Alert", id))?;
    if alert.status == AlertStatus::New {
        alert.status = AlertStatus::UnderReview;
        alert.timestamp = now;
    }
    Ok(alert.clone())
}

/// Force the alert to `resolved` and re-stamp it. Repeating is harmless.
pub fn resolve(
    alerts: &mut [FraudAlertRecord],
    id: &str,
    now: DateTime<Utc>,
) -> CoreResult<FraudAlertRecord> {
    let alert = alerts
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| CoreError::not_found("Alert", id))?;
    alert.status = AlertStatus::Resolved;
    alert.timestamp = now;
    Ok(alert.clone())
}

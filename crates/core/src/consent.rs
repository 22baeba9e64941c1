//! # Consent Module
//!
//! ConsentRecord và các chuyển trạng thái grant/revoke.
//! Mỗi institution (so khớp không phân biệt hoa thường) có tối đa một record.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentStatus {
    Granted,
    Revoked,
}

impl ConsentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentStatus::Granted => "granted",
            ConsentStatus::Revoked => "revoked",
        }
    }
}

impl fmt::Display for ConsentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's permission grant to one named institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    pub id: String,
    pub institution_name: String,
    pub status: ConsentStatus,
    pub last_updated: DateTime<Utc>,
}

/// Outcome of a grant: a brand-new record, or a revoked one flipped back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    Created,
    Regranted,
}

fn position(consents: &[ConsentRecord], institution: &str) -> Option<usize> {
    let needle = institution.trim().to_lowercase();
    consents
        .iter()
        .position(|c| c.institution_name.to_lowercase() == needle)
}

/// Grant consent.
///
/// - already `granted` -> `DuplicateConsent`, list untouched
/// - `revoked` -> flipped in place, same id
/// - absent -> new record inserted at the front
pub fn grant(
    consents: &mut Vec<ConsentRecord>,
    institution: &str,
    now: DateTime<Utc>,
) -> CoreResult<(ConsentRecord, GrantOutcome)> {
    let name = institution.trim();
    if name.is_empty() {
        return Err(CoreError::Validation(
            "Institution name is required".to_string(),
        ));
    }

    match position(consents, name) {
        Some(i) => {
            let record = &mut consents[i];
            if record.status == ConsentStatus::Granted {
                return Err(CoreError::DuplicateConsent(record.institution_name.clone()));
            }
            record.status = ConsentStatus::Granted;
            record.last_updated = now;
            Ok((record.clone(), GrantOutcome::Regranted))
        }
        None => {
            let record = ConsentRecord {
                id: format!("consent_{}", Uuid::new_v4().simple()),
                institution_name: name.to_string(),
                status: ConsentStatus::Granted,
                last_updated: now,
            };
            consents.insert(0, record.clone());
            Ok((record, GrantOutcome::Created))
        }
    }
}

/// Revoke consent; `NotFound` if the institution was never granted.
pub fn revoke(
    consents: &mut [ConsentRecord],
    institution: &str,
    now: DateTime<Utc>,
) -> CoreResult<ConsentRecord> {
    let i = position(consents, institution)
        .ok_or_else(|| CoreError::not_found("Consent", institution.trim()))?;
    let record = &mut consents[i];
    record.status = ConsentStatus::Revoked;
    record.last_updated = now;
    Ok(record.clone())
}

//! # Document Module
//!
//! Định nghĩa DocumentRecord và AiReport cho tài liệu người dùng tải lên.

use crate::digest::{sha256_hex, synthetic_tx_hash};
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Trạng thái tài liệu: `processing` -> `uploaded` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Processing,
    Uploaded,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Processing => "processing",
            DocumentStatus::Uploaded => "uploaded",
        }
    }

    /// Forward-only; `uploaded` is terminal
    pub fn can_become(&self, next: DocumentStatus) -> bool {
        *self == next || (*self == DocumentStatus::Processing && next == DocumentStatus::Uploaded)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synthetic AI screening report attached at upload time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiReport {
    /// In [0, 0.3)
    pub anomaly_score: f64,
    /// In [0, 0.2)
    pub forgery_probability: f64,
    pub duplicate_detected: bool,
    pub face_mismatch: bool,
    pub tamper_detected: bool,
    /// In [0.95, 1.0)
    pub confidence: f64,
}

impl AiReport {
    /// Generate a clean-looking report in the fixed score ranges
    pub fn synthetic<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            anomaly_score: rng.gen_range(0.0..0.3),
            forgery_probability: rng.gen_range(0.0..0.2),
            duplicate_detected: false,
            face_mismatch: false,
            tamper_detected: false,
            confidence: rng.gen_range(0.95..1.0),
        }
    }
}

/// A file as handed over by the uploader: raw bytes plus metadata.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub file_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: &str, file_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            file_type: file_type.to_string(),
            bytes,
        }
    }

    /// Content digest shown to the user before submission
    pub fn sha256(&self) -> String {
        sha256_hex(&self.bytes)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// One uploaded file belonging to exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub document_id: String,
    pub sha256: String,
    pub file_name: String,
    /// Free-form category tag ("passport", "utility_bill", ...)
    #[serde(rename = "type")]
    pub doc_type: String,
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_tx: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_report: Option<AiReport>,
    pub uploaded_at: DateTime<Utc>,
    pub file_size: u64,
    pub file_type: String,
    pub user_email: String,
}

impl DocumentRecord {
    /// Build the `uploaded` record for a file.
    ///
    /// The digest is computed from the raw bytes before anything else is derived.
    pub fn from_upload(file: &UploadFile, doc_type: &str, user_email: &str) -> Self {
        let sha256 = file.sha256();
        let mut rng = rand::thread_rng();

        Self {
            document_id: format!("doc_{}", Uuid::new_v4().simple()),
            sha256,
            file_name: file.file_name.clone(),
            doc_type: doc_type.to_string(),
            status: DocumentStatus::Uploaded,
            blockchain_tx: Some(synthetic_tx_hash()),
            ai_report: Some(AiReport::synthetic(&mut rng)),
            uploaded_at: Utc::now(),
            file_size: file.size(),
            file_type: file.file_type.clone(),
            user_email: user_email.to_string(),
        }
    }
}

/// Partial update of a stored document (update-by-id).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub file_name: Option<String>,
    pub status: Option<DocumentStatus>,
}

impl DocumentPatch {
    /// Nothing is written when the status move is rejected.
    pub fn apply(&self, doc: &mut DocumentRecord) -> CoreResult<()> {
        if let Some(status) = self.status {
            if !doc.status.can_become(status) {
                return Err(CoreError::Validation(format!(
                    "Document {} cannot move from {} to {}",
                    doc.document_id, doc.status, status
                )));
            }
        }
        if let Some(ref v) = self.doc_type {
            doc.doc_type = v.clone();
        }
        if let Some(ref v) = self.file_name {
            doc.file_name = v.clone();
        }
        if let Some(status) = self.status {
            doc.status = status;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::is_sha256_hex;

    #[test]
    fn test_from_upload() {
        let file = UploadFile::new("a.pdf", "application/pdf", b"0123456789".to_vec());
        let doc = DocumentRecord::from_upload(&file, "passport", "u@x.com");

        assert_eq!(doc.status, DocumentStatus::Uploaded);
        assert_eq!(doc.file_name, "a.pdf");
        assert_eq!(doc.doc_type, "passport");
        assert_eq!(doc.user_email, "u@x.com");
        assert_eq!(doc.file_size, 10);
        assert!(is_sha256_hex(&doc.sha256));
        assert!(doc.blockchain_tx.is_some());
    }

    #[test]
    fn test_ai_report_ranges() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let report = AiReport::synthetic(&mut rng);
            assert!((0.0..0.3).contains(&report.anomaly_score));
            assert!((0.0..0.2).contains(&report.forgery_probability));
            assert!((0.95..1.0).contains(&report.confidence));
        }
    }

    #[test]
    fn test_digest_ignores_metadata() {
        let a = UploadFile::new("a.pdf", "application/pdf", b"same".to_vec());
        let b = UploadFile::new("b.png", "image/png", b"same".to_vec());
        assert_eq!(a.sha256(), b.sha256());
    }

    #[test]
    fn test_patch_leaves_digest_alone() {
        let file = UploadFile::new("a.pdf", "application/pdf", b"x".to_vec());
        let mut doc = DocumentRecord::from_upload(&file, "passport", "u@x.com");
        let digest = doc.sha256.clone();
        DocumentPatch {
            doc_type: Some("national_id".to_string()),
            ..Default::default()
        }
        .apply(&mut doc)
        .unwrap();

        assert_eq!(doc.doc_type, "national_id");
        assert_eq!(doc.file_name, "a.pdf");
        assert_eq!(doc.sha256, digest);
    }

    #[test]
    fn test_uploaded_is_terminal() {
        let file = UploadFile::new("a.pdf", "application/pdf", b"x".to_vec());
        let mut doc = DocumentRecord::from_upload(&file, "passport", "u@x.com");
        let patch = DocumentPatch {
            file_name: Some("b.pdf".to_string()),
            status: Some(DocumentStatus::Processing),
            ..Default::default()
        };

        assert!(patch.apply(&mut doc).unwrap_err().is_validation());
        assert_eq!(doc.status, DocumentStatus::Uploaded);
        assert_eq!(doc.file_name, "a.pdf");

        doc.status = DocumentStatus::Processing;
        DocumentPatch {
            status: Some(DocumentStatus::Uploaded),
            ..Default::default()
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.status, DocumentStatus::Uploaded);
    }

    #[test]
    fn test_json_shape() {
        let file = UploadFile::new("a.pdf", "application/pdf", b"x".to_vec());
        let doc = DocumentRecord::from_upload(&file, "passport", "u@x.com");
        let json = serde_json::to_value(&doc).unwrap();

        assert!(json.get("documentId").is_some());
        assert_eq!(json["type"], "passport");
        assert_eq!(json["status"], "uploaded");
        assert!(json["aiReport"].get("forgeryProbability").is_some());
    }
}

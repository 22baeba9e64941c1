//! Integration tests for the store layer: consent, documents, bank
//! verification and logs wired through `KycApp`

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use kycdesk_business::{
    DigestIntegrityChecker, FraudClassifier, FraudScore, KycApp, KycConfig, ServiceError,
};
use kycdesk_core::{
    sha256_hex, ApplicantDocument, ConsentStatus, FraudStatus, HistoryAction, Identity,
    IntegrityResult, LogAction, LogQuery, Role, UploadFile, UserQuery, VerificationStatus,
};
use kycdesk_persistence::{JsonDirStore, MemoryStore, SnapshotStore, SqliteStore};

/// Deterministic classifier: cycles through the given scores
struct ScriptedClassifier {
    scores: Vec<u8>,
    next: std::sync::atomic::AtomicUsize,
}

impl ScriptedClassifier {
    fn new(scores: Vec<u8>) -> Self {
        Self {
            scores,
            next: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FraudClassifier for ScriptedClassifier {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn score(&self, _document: &ApplicantDocument) -> FraudScore {
        let i = self.next.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        FraudScore {
            score: self.scores[i % self.scores.len()],
            flags: Vec::new(),
        }
    }
}

fn create_app(store: Arc<dyn SnapshotStore>) -> KycApp {
    KycApp::builder()
        .store(store)
        .integrity(Arc::new(DigestIntegrityChecker))
        .classifier(Arc::new(ScriptedClassifier::new(vec![20, 50, 51, 75, 76, 89])))
        .build()
}

fn memory_app() -> KycApp {
    create_app(Arc::new(MemoryStore::new()))
}

async fn sign_in(app: &KycApp, name: &str, email: &str) {
    app.identity()
        .set(&Identity::new(name, email, Role::User))
        .await
        .unwrap();
}

fn ten_byte_pdf() -> UploadFile {
    UploadFile::new("a.pdf", "application/pdf", b"0123456789".to_vec())
}

// === Digest ===

#[test]
fn test_digest_is_content_only() {
    let a = UploadFile::new("a.pdf", "application/pdf", b"same bytes".to_vec());
    let b = UploadFile::new("b.png", "image/png", b"same bytes".to_vec());
    let c = UploadFile::new("a.pdf", "application/pdf", b"same byteS".to_vec());

    assert_eq!(a.sha256(), a.sha256());
    assert_eq!(a.sha256(), b.sha256());
    assert_ne!(a.sha256(), c.sha256());
    assert_eq!(a.sha256(), sha256_hex(b"same bytes"));
}

// === Consent ===

#[tokio::test]
async fn test_grant_leaves_single_granted_record() {
    let app = memory_app();
    app.consents().grant_consent("HDFC Bank").await.unwrap();

    let consents = app.consents().get_consents().await.unwrap();
    let matching: Vec<_> = consents
        .iter()
        .filter(|c| c.institution_name.eq_ignore_ascii_case("hdfc bank"))
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].status, ConsentStatus::Granted);
}

#[tokio::test]
async fn test_second_grant_is_duplicate_and_changes_nothing() {
    let app = memory_app();
    app.consents().grant_consent("Vietcombank").await.unwrap();
    let before = app.consents().get_consents().await.unwrap();

    let err = app.consents().grant_consent("VIETCOMBANK").await.unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_CONSENT");
    assert_eq!(app.consents().get_consents().await.unwrap(), before);
}

#[tokio::test]
async fn test_revoke_unknown_is_not_found() {
    let app = memory_app();
    app.consents().grant_consent("A").await.unwrap();
    let before = app.consents().get_consents().await.unwrap();

    let err = app.consents().revoke_consent("Never Granted").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(app.consents().get_consents().await.unwrap(), before);
}

#[tokio::test]
async fn test_regrant_keeps_id() {
    let app = memory_app();
    let first = app.consents().grant_consent("X").await.unwrap();
    app.consents().revoke_consent("X").await.unwrap();
    let again = app.consents().grant_consent("X").await.unwrap();

    assert_eq!(again.status, ConsentStatus::Granted);
    assert_eq!(again.id, first.id);
}

#[tokio::test]
async fn test_concurrent_grants_only_one_wins() {
    let config = KycConfig {
        latency_ms: 5,
        ..Default::default()
    };
    let app = KycApp::builder()
        .config(config)
        .integrity(Arc::new(DigestIntegrityChecker))
        .build();

    let (a, b) = tokio::join!(
        app.consents().grant_consent("Techcombank"),
        app.consents().grant_consent("techcombank"),
    );
    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(ServiceError::is_conflict));
    assert_eq!(app.consents().get_consents().await.unwrap().len(), 1);
}

// === Documents ===

#[tokio::test]
async fn test_upload_scenario() {
    let app = memory_app();
    sign_in(&app, "U", "u@x.com").await;

    let doc = app
        .documents()
        .post_upload(&ten_byte_pdf(), "passport")
        .await
        .unwrap();
    assert_eq!(doc.status.as_str(), "uploaded");
    assert_eq!(doc.file_name, "a.pdf");
    assert_eq!(doc.doc_type, "passport");
    assert_eq!(doc.user_email, "u@x.com");
    assert_eq!(doc.file_size, 10);
    assert_eq!(doc.sha256.len(), 64);
    assert!(doc.sha256.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_users_never_see_each_other() {
    let app = memory_app();

    sign_in(&app, "Alice", "alice@x.com").await;
    let alice_doc = app
        .documents()
        .post_upload(&ten_byte_pdf(), "passport")
        .await
        .unwrap();

    sign_in(&app, "Bob", "bob@x.com").await;
    app.documents()
        .post_upload(&ten_byte_pdf(), "national_id")
        .await
        .unwrap();
    let bob_docs = app.documents().get_documents().await.unwrap();
    assert_eq!(bob_docs.len(), 1);
    assert!(bob_docs.iter().all(|d| d.user_email == "bob@x.com"));
    assert!(app
        .documents()
        .get_document(&alice_doc.document_id)
        .await
        .unwrap()
        .is_none());
    assert!(!app
        .documents()
        .delete_document(&alice_doc.document_id)
        .await
        .unwrap());

    sign_in(&app, "Alice", "alice@x.com").await;
    let alice_docs = app.documents().get_documents().await.unwrap();
    assert_eq!(alice_docs.len(), 1);
    assert_eq!(alice_docs[0].document_id, alice_doc.document_id);
}

// === Bank verification ===

#[tokio::test]
async fn test_status_filter_total_ignores_page_size() {
    let app = memory_app();
    for page_size in [1, 2, 10] {
        let page = app
            .verification()
            .get_users(&UserQuery::new().status(VerificationStatus::Pending).page(1, page_size))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert!(page
            .items
            .iter()
            .all(|a| a.verification_status == VerificationStatus::Pending));
    }
}

#[tokio::test]
async fn test_flag_shows_first_in_history() {
    let app = memory_app();
    app.verification()
        .update_verification("USR-1002", VerificationStatus::Flagged)
        .await
        .unwrap();

    let history = app
        .verification()
        .get_verification_history("USR-1002")
        .await
        .unwrap();
    assert_eq!(history[0].action, HistoryAction::Flagged);
    assert!(history.windows(2).all(|w| w[0].date >= w[1].date));

    let page = app
        .verification()
        .get_users(&UserQuery::new().status(VerificationStatus::Flagged))
        .await
        .unwrap();
    assert_eq!(page.items[0].id, "USR-1002");
}

#[tokio::test]
async fn test_fraud_status_follows_thresholds() {
    let app = memory_app();
    for _ in 0..6 {
        let out = app
            .verification()
            .analyze_fraud("USR-1001", "DOC-2001")
            .await
            .unwrap();
        assert!((20..90).contains(&out.score));
        assert_eq!(out.status, FraudStatus::from_score(out.score));
        let expected = if out.score > 75 {
            FraudStatus::Fraud
        } else if out.score > 50 {
            FraudStatus::Suspicious
        } else {
            FraudStatus::Safe
        };
        assert_eq!(out.status, expected);
    }
}

#[tokio::test]
async fn test_verify_does_not_touch_roster() {
    let app = memory_app();
    let before = app
        .verification()
        .get_user_documents("USR-1001")
        .await
        .unwrap();

    let out = app
        .verification()
        .verify_document("USR-1001", "DOC-2002")
        .await
        .unwrap();
    assert_eq!(out.result, IntegrityResult::Match);
    app.verification()
        .analyze_fraud("USR-1001", "DOC-2002")
        .await
        .unwrap();

    assert_eq!(
        app.verification().get_user_documents("USR-1001").await.unwrap(),
        before
    );
}

// === Logs ===

#[tokio::test]
async fn test_log_date_range_is_inclusive() {
    let app = memory_app();
    let query = LogQuery::new()
        .action(LogAction::ConsentGranted)
        .range(Some("2024-01-01"), Some("2024-12-31"))
        .unwrap();
    let page = app.logs().get_verification_logs(&query).await.unwrap();

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    assert!(page.total >= 1);
    assert!(page
        .items
        .iter()
        .all(|e| e.action == LogAction::ConsentGranted && e.ts >= start && e.ts < end));
    assert!(page.items.iter().all(|e| e.id != "LOG-0004"));
}

#[tokio::test]
async fn test_missing_log_details() {
    let app = memory_app();
    let err = app.logs().get_log_details("nonexistent-id").await.unwrap_err();
    assert!(err.to_string().contains("Log not found"));
}

#[tokio::test]
async fn test_grant_appends_log_for_identity() {
    let app = memory_app();
    sign_in(&app, "Nguyen Van An", "an@x.com").await;
    let record = app.consents().grant_consent("ACB").await.unwrap();

    let page = app
        .logs()
        .get_verification_logs(&LogQuery::new().text("ACB"))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].admin, record.institution_name);
    assert_eq!(page.items[0].user_name, "Nguyen Van An");
}

// === Durability ===

#[tokio::test]
async fn test_json_dir_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let app = create_app(Arc::new(JsonDirStore::new(dir.path()).unwrap()));
        sign_in(&app, "U", "u@x.com").await;
        app.consents().grant_consent("Sacombank").await.unwrap();
        app.documents()
            .post_upload(&ten_byte_pdf(), "passport")
            .await
            .unwrap();
    }

    let app = create_app(Arc::new(JsonDirStore::new(dir.path()).unwrap()));
    assert_eq!(app.consents().get_consents().await.unwrap().len(), 1);
    assert_eq!(app.documents().get_documents().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sqlite_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kycdesk.db");
    {
        let store = Arc::new(SqliteStore::open(&path).await.unwrap());
        let app = create_app(store.clone());
        app.verification()
            .update_verification("USR-1001", VerificationStatus::Verified)
            .await
            .unwrap();
        store.close().await;
    }

    let app = create_app(Arc::new(SqliteStore::open(&path).await.unwrap()));
    let history = app
        .verification()
        .get_verification_history("USR-1001")
        .await
        .unwrap();
    assert_eq!(history[0].action, HistoryAction::Verified);
}

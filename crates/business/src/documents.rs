//! Document store
//!
//! Tài liệu được phân vùng theo email của identity hiện tại: mỗi user một
//! snapshot `documents:<email>`, không có đường đọc/ghi chéo giữa các user.

use crate::context::{KycContext, SnapshotCell};
use crate::error::ServiceResult;
use crate::identity::IdentityService;
use crate::logs::VerificationLogRegistry;
use kycdesk_core::{
    DocumentPatch, DocumentRecord, Identity, LogAction, LogStatus, UploadFile,
    VerificationLogEntry,
};
use kycdesk_persistence::keys;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

type DocumentList = Vec<DocumentRecord>;

pub struct DocumentStore {
    ctx: Arc<KycContext>,
    identity: IdentityService,
    logs: Arc<VerificationLogRegistry>,
    partitions: Mutex<HashMap<String, Arc<SnapshotCell<DocumentList>>>>,
}

impl DocumentStore {
    pub fn new(
        ctx: Arc<KycContext>,
        identity: IdentityService,
        logs: Arc<VerificationLogRegistry>,
    ) -> Self {
        Self {
            ctx,
            identity,
            logs,
            partitions: Mutex::new(HashMap::new()),
        }
    }

    async fn partition(&self, identity: &Identity) -> Arc<SnapshotCell<DocumentList>> {
        let owner = identity.partition_key();
        let mut partitions = self.partitions.lock().await;
        partitions
            .entry(owner)
            .or_insert_with_key(|owner| Arc::new(SnapshotCell::new(keys::documents(owner))))
            .clone()
    }

    /// Hash the bytes, build the record and put it first in the user's list
    pub async fn post_upload(
        &self,
        file: &UploadFile,
        doc_type: &str,
    ) -> ServiceResult<DocumentRecord> {
        self.ctx.simulate_latency().await;
        let identity = self.identity.require("upload").await?;
        let record = DocumentRecord::from_upload(file, doc_type, &identity.email);

        let cell = self.partition(&identity).await;
        let stored = record.clone();
        cell.update(self.ctx.store(), DocumentList::new, move |docs| {
            docs.insert(0, stored);
            Ok(())
        })
        .await?;

        info!(
            owner = %identity.email,
            id = %record.document_id,
            sha256 = %record.sha256,
            size = record.file_size,
            "Document uploaded"
        );

        if self.ctx.config().audit_all_actions {
            let entry = VerificationLogEntry::for_identity(
                &identity,
                LogAction::Upload,
                &identity.name,
                LogStatus::Success,
                record.uploaded_at,
            )
            .with_doc_type(&record.doc_type);
            if let Err(e) = self.logs.append(entry).await {
                warn!(error = %e, "Upload log not written");
            }
        }
        Ok(record)
    }

    /// Current user's documents, newest first; empty without an identity
    pub async fn get_documents(&self) -> ServiceResult<Vec<DocumentRecord>> {
        self.ctx.simulate_latency().await;
        let Some(identity) = self.identity.current().await? else {
            debug!("No identity, no documents");
            return Ok(Vec::new());
        };
        self.partition(&identity)
            .await
            .read(self.ctx.store(), DocumentList::new)
            .await
    }

    pub async fn get_document(&self, document_id: &str) -> ServiceResult<Option<DocumentRecord>> {
        let docs = self.get_documents().await?;
        Ok(docs.into_iter().find(|d| d.document_id == document_id))
    }

    /// Patch a document of the current user; `None` if not found or signed out
    pub async fn update_document(
        &self,
        document_id: &str,
        patch: &DocumentPatch,
    ) -> ServiceResult<Option<DocumentRecord>> {
        self.ctx.simulate_latency().await;
        let Some(identity) = self.identity.current().await? else {
            return Ok(None);
        };
        let updated = self
            .partition(&identity)
            .await
            .update(self.ctx.store(), DocumentList::new, |docs| {
                let Some(doc) = docs.iter_mut().find(|d| d.document_id == document_id) else {
                    return Ok(None);
                };
                patch.apply(doc)?;
                Ok(Some(doc.clone()))
            })
            .await?;

        if updated.is_some() {
            info!(owner = %identity.email, id = document_id, "Document updated");
        }
        Ok(updated)
    }

    /// `true` if a record was removed
    pub async fn delete_document(&self, document_id: &str) -> ServiceResult<bool> {
        self.ctx.simulate_latency().await;
        let Some(identity) = self.identity.current().await? else {
            return Ok(false);
        };
        let removed = self
            .partition(&identity)
            .await
            .update(self.ctx.store(), DocumentList::new, |docs| {
                let before = docs.len();
                docs.retain(|d| d.document_id != document_id);
                Ok(docs.len() != before)
            })
            .await?;

        if removed {
            info!(owner = %identity.email, id = document_id, "Document deleted");
        }
        Ok(removed)
    }
}

//! Document commands

use anyhow::{Context, Result};
use kycdesk_business::KycApp;
use kycdesk_core::{DocumentPatch, UploadFile};
use std::path::Path;

use super::print_json;
use crate::DocAction;

/// Handle doc subcommands
pub async fn handle(app: &KycApp, action: DocAction) -> Result<()> {
    match action {
        DocAction::Hash { path } => {
            let file = read_upload(&path)?;
            println!("{}  {}", file.sha256(), file.file_name);
        }
        DocAction::Upload { path, doc_type } => {
            let file = read_upload(&path)?;
            let doc = app.documents().post_upload(&file, &doc_type).await?;
            println!("✅ Uploaded {} ({})", doc.file_name, doc.document_id);
            println!("   SHA-256: {}", doc.sha256);
            if let Some(ref tx) = doc.blockchain_tx {
                println!("   Tx: {}", tx);
            }
        }
        DocAction::List => {
            let docs = app.documents().get_documents().await?;
            if docs.is_empty() {
                println!("No documents");
            }
            for doc in &docs {
                println!(
                    "{:<38} {:<14} {:<10} {:>8} B  {}",
                    doc.document_id,
                    doc.doc_type,
                    doc.status.as_str(),
                    doc.file_size,
                    doc.file_name
                );
            }
        }
        DocAction::Show { id } => match app.documents().get_document(&id).await? {
            Some(doc) => print_json(&doc)?,
            None => println!("❌ Document not found: {}", id),
        },
        DocAction::Update {
            id,
            doc_type,
            file_name,
        } => {
            let patch = DocumentPatch {
                doc_type,
                file_name,
                status: None,
            };
            match app.documents().update_document(&id, &patch).await? {
                Some(doc) => println!(
                    "✅ Updated {} ({}, {})",
                    doc.document_id, doc.doc_type, doc.file_name
                ),
                None => println!("❌ Document not found: {}", id),
            }
        }
        DocAction::Delete { id } => {
            if app.documents().delete_document(&id).await? {
                println!("🗑️  Deleted {}", id);
            } else {
                println!("❌ Document not found: {}", id);
            }
        }
    }
    Ok(())
}

fn read_upload(path: &Path) -> Result<UploadFile> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadFile::new(&file_name, mime_for(path), bytes))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

//! Bank verification commands

use anyhow::{Context, Result};
use kycdesk_business::KycApp;
use kycdesk_core::{IntegrityResult, UserQuery};

use crate::BankAction;

/// Handle bank subcommands
pub async fn handle(app: &KycApp, action: BankAction) -> Result<()> {
    let workflow = app.verification();
    match action {
        BankAction::Users {
            q,
            consent,
            status,
            page,
            page_size,
        } => {
            let query = UserQuery {
                q,
                consent: consent.to_core_type(),
                status: status.to_core_type(),
                page,
                page_size,
            };
            let result = workflow.get_users(&query).await?;
            for a in &result.items {
                println!(
                    "{:<10} {:<20} {:<28} consent={:<8} status={}",
                    a.id,
                    a.full_name,
                    a.email,
                    a.consent_status.as_str(),
                    a.verification_status.as_str()
                );
            }
            println!(
                "-- {} of {} applicant(s), page {}",
                result.items.len(),
                result.total,
                page.max(1)
            );
        }
        BankAction::Docs { user_id } => {
            let docs = workflow.get_user_documents(&user_id).await?;
            if docs.is_empty() {
                println!("No documents for {}", user_id);
            }
            for d in &docs {
                println!(
                    "📄 {:<10} {:<14} {:<24} {}",
                    d.document_id, d.doc_type, d.file_name, d.sha256
                );
            }
        }
        BankAction::Verify {
            user_id,
            doc_id,
            file,
        } => {
            let outcome = match file {
                Some(path) => {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("Failed to read {:?}", path))?;
                    workflow.verify_document_bytes(&user_id, &doc_id, &bytes).await?
                }
                None => workflow.verify_document(&user_id, &doc_id).await?,
            };
            let icon = match outcome.result {
                IntegrityResult::Match => "✅ match",
                IntegrityResult::Mismatch => "❌ mismatch",
            };
            println!("{}  tx {}", icon, outcome.blockchain_tx);
        }
        BankAction::Analyze { user_id, doc_id } => {
            let analysis = workflow.analyze_fraud(&user_id, &doc_id).await?;
            println!("🤖 score {} -> {}", analysis.score, analysis.status);
            for flag in &analysis.flags {
                println!("   ⚠️  {}", flag);
            }
        }
        BankAction::Decide { user_id, status } => {
            let status = status.to_core_type();
            workflow.update_verification(&user_id, status).await?;
            println!("✅ {} marked {}", user_id, status);
        }
        BankAction::History { user_id } => {
            let history = workflow.get_verification_history(&user_id).await?;
            if history.is_empty() {
                println!("No history for {}", user_id);
            }
            for h in &history {
                println!(
                    "{}  {:<9} by {}{}",
                    h.date.format("%Y-%m-%d %H:%M"),
                    h.action.to_string(),
                    h.admin,
                    if h.notes.is_empty() { String::new() } else { format!(" - {}", h.notes) }
                );
            }
        }
    }
    Ok(())
}

//! Verification log commands

use anyhow::Result;
use kycdesk_business::KycApp;
use kycdesk_core::LogQuery;

use super::print_json;
use crate::LogsAction;

/// Handle logs subcommands
pub async fn handle(app: &KycApp, action: LogsAction) -> Result<()> {
    match action {
        LogsAction::List {
            q,
            action,
            from,
            to,
            page,
            page_size,
        } => {
            let mut query = LogQuery::new()
                .page(page, page_size)
                .range(from.as_deref(), to.as_deref())?;
            query.q = q;
            query.action = action.to_core_type();

            let result = app.logs().get_verification_logs(&query).await?;
            for e in &result.items {
                println!(
                    "{}  {:<16} {:<16} {:<10} {:<20} {}",
                    e.ts.format("%Y-%m-%d %H:%M"),
                    e.action.as_str(),
                    e.user_name,
                    e.user_id,
                    e.admin,
                    e.id
                );
            }
            println!("-- {} of {} entries", result.items.len(), result.total);
        }
        LogsAction::Show { id } => {
            let details = app.logs().get_log_details(&id).await?;
            print_json(&details)?;
        }
    }
    Ok(())
}

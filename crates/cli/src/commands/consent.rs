//! Consent commands

use anyhow::Result;
use kycdesk_business::KycApp;
use kycdesk_core::ConsentStatus;

use crate::ConsentAction;

/// Handle consent subcommands
pub async fn handle(app: &KycApp, action: ConsentAction) -> Result<()> {
    match action {
        ConsentAction::List => {
            let consents = app.consents().get_consents().await?;
            if consents.is_empty() {
                println!("No consents");
            }
            for c in &consents {
                let icon = match c.status {
                    ConsentStatus::Granted => "✅",
                    ConsentStatus::Revoked => "⛔",
                };
                println!(
                    "{} {:<28} {:<8} {}",
                    icon,
                    c.institution_name,
                    c.status.as_str(),
                    c.last_updated.format("%Y-%m-%d %H:%M")
                );
            }
        }
        ConsentAction::Grant { institution } => {
            let record = app.consents().grant_consent(&institution).await?;
            println!("✅ Consent granted to {} ({})", record.institution_name, record.id);
        }
        ConsentAction::Revoke { institution } => {
            let record = app.consents().revoke_consent(&institution).await?;
            println!("⛔ Consent revoked for {}", record.institution_name);
        }
    }
    Ok(())
}

//! Fraud alert commands

use anyhow::Result;
use kycdesk_business::KycApp;

use crate::AlertAction;

/// Handle alert subcommands
pub async fn handle(app: &KycApp, action: AlertAction) -> Result<()> {
    match action {
        AlertAction::List => {
            for alert in app.alerts().get_fraud_alerts().await? {
                println!(
                    "🚨 {} [{:<6}] {:<12} {:<26} risk {:>3}  {}",
                    alert.id,
                    alert.severity.as_str(),
                    alert.status.as_str(),
                    alert.alert_type.as_str(),
                    alert.details.ai_risk_score,
                    alert.affected.name
                );
            }
        }
        AlertAction::Resolve { id } => {
            let alert = app.alerts().resolve_alert(&id).await?;
            println!("✅ {} resolved at {}", alert.id, alert.timestamp);
        }
        AlertAction::Review { id } => {
            let alert = app.alerts().review_alert(&id).await?;
            println!("🔎 {} is {}", alert.id, alert.status);
        }
        AlertAction::Report { id } => {
            app.alerts().report_alert(&id).await?;
            println!("📨 {} reported", id);
        }
    }
    Ok(())
}

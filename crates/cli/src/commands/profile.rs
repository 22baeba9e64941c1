//! Profile commands

use anyhow::Result;
use kycdesk_business::KycApp;
use kycdesk_core::{PreferencesPatch, UserPatch};

use super::print_json;
use crate::ProfileAction;

/// Handle profile subcommands
pub async fn handle(app: &KycApp, action: ProfileAction) -> Result<()> {
    let profile = app.profile();
    match action {
        ProfileAction::Show => {
            print_json(&profile.get_profile().await?)?;
        }
        ProfileAction::Update {
            name,
            email,
            phone,
            address,
        } => {
            let patch = UserPatch {
                full_name: name,
                email,
                phone,
                address,
                profile_image: None,
            };
            if patch.is_empty() {
                println!("Nothing to update");
                return Ok(());
            }
            let user = profile.update_profile(&patch).await?;
            println!("✅ Profile updated: {} <{}>", user.full_name, user.email);
        }
        ProfileAction::Prefs {
            theme,
            email_alerts,
            fraud_alerts,
            language,
        } => {
            let patch = PreferencesPatch {
                theme: theme.map(|t| t.to_core_type()),
                email_alerts,
                fraud_alerts,
                language,
            };
            let prefs = profile.update_preferences(&patch).await?;
            print_json(&prefs)?;
        }
        ProfileAction::Password {
            current,
            new,
            confirm,
        } => {
            profile.update_password(&current, &new, &confirm).await?;
            println!("✅ Password updated");
        }
        ProfileAction::TwoFactor { enabled } => {
            let security = profile.set_two_factor(enabled).await?;
            println!(
                "🔐 Two-factor authentication {}",
                if security.two_factor_enabled { "enabled" } else { "disabled" }
            );
        }
        ProfileAction::LogoutSession { session_id } => {
            profile.logout_session(&session_id).await?;
            println!("👋 Session {} logged out", session_id);
        }
        ProfileAction::Deactivate => {
            profile.deactivate_account().await?;
            println!("⏸️  Account deactivation requested");
        }
        ProfileAction::Delete => {
            profile.delete_account().await?;
            println!("🗑️  Account deletion requested");
        }
    }
    Ok(())
}

//! Account commands - register, OTP, login, logout

use anyhow::Result;
use kycdesk_business::KycApp;

use crate::RoleArg;

pub async fn register(
    app: &KycApp,
    name: &str,
    email: &str,
    password: &str,
    role: RoleArg,
) -> Result<()> {
    let registration = app
        .auth()
        .register(name, email, password, role.to_core_type())
        .await?;

    println!("✅ Registered {}", registration.email);
    println!("   OTP: {} (expires {})", registration.otp, registration.expires_at);
    println!("   Run: kycdesk verify-otp {} <code>", registration.email);
    Ok(())
}

pub async fn verify_otp(app: &KycApp, email: &str, code: &str) -> Result<()> {
    app.auth().verify_otp(email, code).await?;
    println!("✅ Email verified: {}", email);
    Ok(())
}

pub async fn resend_otp(app: &KycApp, email: &str) -> Result<()> {
    let registration = app.auth().resend_otp(email).await?;
    println!("📨 New OTP for {}: {}", registration.email, registration.otp);
    Ok(())
}

pub async fn login(app: &KycApp, email: &str, password: &str) -> Result<()> {
    let identity = app.login(email, password).await?;
    println!("✅ Logged in as {}", identity);
    Ok(())
}

pub async fn logout(app: &KycApp) -> Result<()> {
    app.logout().await?;
    println!("👋 Logged out");
    Ok(())
}

pub async fn whoami(app: &KycApp) -> Result<()> {
    match app.identity().current().await? {
        Some(identity) => println!("👤 {}", identity),
        None => println!("Not logged in"),
    }
    Ok(())
}

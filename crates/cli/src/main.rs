//! Kycdesk CLI - KYC dashboard operations from command line
//!
//! Usage:
//! ```bash
//! kycdesk register --name "Nguyen Van An" --email an@example.com --password secret123
//! kycdesk verify-otp an@example.com 123456
//! kycdesk login an@example.com secret123
//! kycdesk doc upload ./passport.pdf --type passport
//! kycdesk consent grant "HDFC Bank"
//! kycdesk bank users --status pending
//! kycdesk logs list --action consent_granted --from 2024-01-01 --to 2024-12-31
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kycdesk_business::{KycApp, KycConfig};
use std::path::PathBuf;

mod commands;
mod store;

use commands::{alert, auth, bank, consent, document, logs, profile};

/// Kycdesk - KYC dashboard backend: documents, consents, fraud alerts, bank verification
#[derive(Parser)]
#[command(name = "kycdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (JSON snapshots or SQLite file)
    #[arg(long, default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Snapshot store backend
    #[arg(long, default_value = "json", global = true)]
    pub store: StoreKind,

    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a new account (prints the email OTP)
    Register {
        #[arg(long, short)]
        name: String,
        #[arg(long, short)]
        email: String,
        #[arg(long, short)]
        password: String,
        #[arg(long, short, default_value = "user")]
        role: RoleArg,
    },

    /// Confirm an email with its OTP
    VerifyOtp { email: String, code: String },

    /// Issue a fresh OTP
    ResendOtp { email: String },

    /// Log in as a verified account
    Login { email: String, password: String },

    /// Clear the current identity
    Logout,

    /// Show the current identity
    Whoami,

    /// Documents of the current user
    Doc {
        #[command(subcommand)]
        action: DocAction,
    },

    /// Institution consents
    Consent {
        #[command(subcommand)]
        action: ConsentAction,
    },

    /// Fraud alerts
    Alert {
        #[command(subcommand)]
        action: AlertAction,
    },

    /// Profile, preferences, password and sessions
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Bank-side applicant verification
    Bank {
        #[command(subcommand)]
        action: BankAction,
    },

    /// Verification logs
    Logs {
        #[command(subcommand)]
        action: LogsAction,
    },

    /// Show store status
    Status,
}

#[derive(Subcommand)]
pub enum DocAction {
    /// Print the SHA-256 of a file without uploading it
    Hash { path: PathBuf },
    /// Upload a file
    Upload {
        path: PathBuf,
        /// Category tag (passport, national_id, utility_bill, ...)
        #[arg(long = "type", short = 't')]
        doc_type: String,
    },
    /// List documents, newest first
    List,
    /// Show one document
    Show { id: String },
    /// Change a document's type or file name
    Update {
        id: String,
        #[arg(long = "type", short = 't')]
        doc_type: Option<String>,
        #[arg(long)]
        file_name: Option<String>,
    },
    /// Delete a document
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ConsentAction {
    List,
    Grant { institution: String },
    Revoke { institution: String },
}

#[derive(Subcommand)]
pub enum AlertAction {
    List,
    /// Mark an alert resolved
    Resolve { id: String },
    /// Start reviewing a new alert
    Review { id: String },
    /// Report an alert to the authorities
    Report { id: String },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    Show,
    /// Update personal details
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Update preferences
    Prefs {
        #[arg(long)]
        theme: Option<ThemeArg>,
        #[arg(long)]
        email_alerts: Option<bool>,
        #[arg(long)]
        fraud_alerts: Option<bool>,
        #[arg(long)]
        language: Option<String>,
    },
    /// Change password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Turn two-factor authentication on or off
    TwoFactor {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// End a session
    LogoutSession { session_id: String },
    Deactivate,
    Delete,
}

#[derive(Subcommand)]
pub enum BankAction {
    /// Query applicants
    Users {
        /// Matches id, name or email
        #[arg(long)]
        q: Option<String>,
        #[arg(long, default_value = "all")]
        consent: ConsentFilter,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        page_size: usize,
    },
    /// Documents of an applicant
    Docs { user_id: String },
    /// Check a document's digest
    Verify {
        user_id: String,
        doc_id: String,
        /// Recompute the digest from this file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// AI fraud analysis of a document
    Analyze { user_id: String, doc_id: String },
    /// Record a verification decision
    Decide { user_id: String, status: DecisionArg },
    /// Decision history, newest first
    History { user_id: String },
}

#[derive(Subcommand)]
pub enum LogsAction {
    List {
        /// Matches user id, user name or admin
        #[arg(long)]
        q: Option<String>,
        #[arg(long, default_value = "all")]
        action: ActionFilter,
        /// Inclusive start (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        from: Option<String>,
        /// Inclusive end (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        page_size: usize,
    },
    /// Expanded log entry
    Show { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StoreKind {
    Json,
    Sqlite,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RoleArg {
    User,
    Bank,
}

impl RoleArg {
    pub fn to_core_type(&self) -> kycdesk_core::Role {
        match self {
            RoleArg::User => kycdesk_core::Role::User,
            RoleArg::Bank => kycdesk_core::Role::Bank,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
    System,
}

impl ThemeArg {
    pub fn to_core_type(&self) -> kycdesk_core::Theme {
        match self {
            ThemeArg::Light => kycdesk_core::Theme::Light,
            ThemeArg::Dark => kycdesk_core::Theme::Dark,
            ThemeArg::System => kycdesk_core::Theme::System,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ConsentFilter {
    All,
    Granted,
    Revoked,
}

impl ConsentFilter {
    pub fn to_core_type(&self) -> Option<kycdesk_core::ConsentStatus> {
        match self {
            ConsentFilter::All => None,
            ConsentFilter::Granted => Some(kycdesk_core::ConsentStatus::Granted),
            ConsentFilter::Revoked => Some(kycdesk_core::ConsentStatus::Revoked),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    All,
    Pending,
    Verified,
    Flagged,
}

impl StatusFilter {
    pub fn to_core_type(&self) -> Option<kycdesk_core::VerificationStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(kycdesk_core::VerificationStatus::Pending),
            StatusFilter::Verified => Some(kycdesk_core::VerificationStatus::Verified),
            StatusFilter::Flagged => Some(kycdesk_core::VerificationStatus::Flagged),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DecisionArg {
    Pending,
    Verified,
    Flagged,
}

impl DecisionArg {
    pub fn to_core_type(&self) -> kycdesk_core::VerificationStatus {
        match self {
            DecisionArg::Pending => kycdesk_core::VerificationStatus::Pending,
            DecisionArg::Verified => kycdesk_core::VerificationStatus::Verified,
            DecisionArg::Flagged => kycdesk_core::VerificationStatus::Flagged,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum ActionFilter {
    All,
    ConsentGranted,
    ConsentRevoked,
    Approved,
    Flagged,
    Upload,
    FraudAlert,
}

impl ActionFilter {
    pub fn to_core_type(&self) -> Option<kycdesk_core::LogAction> {
        use kycdesk_core::LogAction;
        match self {
            ActionFilter::All => None,
            ActionFilter::ConsentGranted => Some(LogAction::ConsentGranted),
            ActionFilter::ConsentRevoked => Some(LogAction::ConsentRevoked),
            ActionFilter::Approved => Some(LogAction::Approved),
            ActionFilter::Flagged => Some(LogAction::Flagged),
            ActionFilter::Upload => Some(LogAction::Upload),
            ActionFilter::FraudAlert => Some(LogAction::FraudAlert),
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<KycConfig> {
    let config = match path {
        Some(path) => KycConfig::from_file(path)
            .with_context(|| format!("Failed to read config {:?}", path))?,
        None => KycConfig::default(),
    }
    .with_env_overrides();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid config: {}", e))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let store = store::open(&cli.data_dir, cli.store).await?;

    let app = KycApp::builder()
        .store(store.clone())
        .config(config)
        .build();

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
            role,
        } => {
            auth::register(&app, &name, &email, &password, role).await?;
        }

        Commands::VerifyOtp { email, code } => {
            auth::verify_otp(&app, &email, &code).await?;
        }

        Commands::ResendOtp { email } => {
            auth::resend_otp(&app, &email).await?;
        }

        Commands::Login { email, password } => {
            auth::login(&app, &email, &password).await?;
        }

        Commands::Logout => {
            auth::logout(&app).await?;
        }

        Commands::Whoami => {
            auth::whoami(&app).await?;
        }

        Commands::Doc { action } => {
            document::handle(&app, action).await?;
        }

        Commands::Consent { action } => {
            consent::handle(&app, action).await?;
        }

        Commands::Alert { action } => {
            alert::handle(&app, action).await?;
        }

        Commands::Profile { action } => {
            profile::handle(&app, action).await?;
        }

        Commands::Bank { action } => {
            bank::handle(&app, action).await?;
        }

        Commands::Logs { action } => {
            logs::handle(&app, action).await?;
        }

        Commands::Status => {
            store::show_status(store.as_ref(), &cli.data_dir).await?;
        }
    }

    Ok(())
}

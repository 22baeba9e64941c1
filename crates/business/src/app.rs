//! `KycApp` - builds one context and every store on top of it

use crate::alerts::FraudAlertRegistry;
use crate::auth::AuthService;
use crate::capability::{
    DocumentIntegrityChecker, FraudClassifier, RandomFraudClassifier, RandomIntegrityChecker,
};
use crate::config::KycConfig;
use crate::consents::ConsentRegistry;
use crate::context::{Ack, KycContext};
use crate::documents::DocumentStore;
use crate::error::ServiceResult;
use crate::identity::IdentityService;
use crate::logs::VerificationLogRegistry;
use crate::profile::ProfileStore;
use crate::verification::VerificationWorkflow;
use kycdesk_core::Identity;
use kycdesk_persistence::{MemoryStore, SnapshotStore};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct KycApp {
    ctx: Arc<KycContext>,
    identity: IdentityService,
    auth: Arc<AuthService>,
    documents: DocumentStore,
    consents: ConsentRegistry,
    alerts: FraudAlertRegistry,
    profile: ProfileStore,
    verification: VerificationWorkflow,
    logs: Arc<VerificationLogRegistry>,
}

impl KycApp {
    pub fn builder() -> KycAppBuilder {
        KycAppBuilder::default()
    }

    pub fn config(&self) -> &KycConfig {
        self.ctx.config()
    }

    pub fn identity(&self) -> &IdentityService {
        &self.identity
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn consents(&self) -> &ConsentRegistry {
        &self.consents
    }

    pub fn alerts(&self) -> &FraudAlertRegistry {
        &self.alerts
    }

    pub fn profile(&self) -> &ProfileStore {
        &self.profile
    }

    pub fn verification(&self) -> &VerificationWorkflow {
        &self.verification
    }

    pub fn logs(&self) -> &VerificationLogRegistry {
        &self.logs
    }

    /// Log in and record the attempt in the profile activity
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<Identity> {
        let outcome = self.auth.login(email, password).await;
        let status = if outcome.is_ok() { "success" } else { "failed" };
        if let Err(e) = self.profile.record_activity("Login", status).await {
            warn!(error = %e, "Login activity not recorded");
        }
        outcome
    }

    pub async fn logout(&self) -> ServiceResult<Ack> {
        if let Err(e) = self.profile.record_activity("Logout", "success").await {
            warn!(error = %e, "Logout activity not recorded");
        }
        self.auth.logout().await
    }
}

/// Builder for `KycApp`. Unset parts fall back to an in-memory store,
/// default config and the simulated capabilities.
#[derive(Default)]
pub struct KycAppBuilder {
    store: Option<Arc<dyn SnapshotStore>>,
    config: Option<KycConfig>,
    integrity: Option<Arc<dyn DocumentIntegrityChecker>>,
    classifier: Option<Arc<dyn FraudClassifier>>,
}

impl KycAppBuilder {
    pub fn store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: KycConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn integrity(mut self, integrity: Arc<dyn DocumentIntegrityChecker>) -> Self {
        self.integrity = Some(integrity);
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn FraudClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn build(self) -> KycApp {
        let config = self.config.unwrap_or_default();
        if let Err(reason) = config.validate() {
            warn!(%reason, "Config out of range; simulated rolls are clamped");
        }
        let store: Arc<dyn SnapshotStore> = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryStore::new()),
        };
        let integrity: Arc<dyn DocumentIntegrityChecker> = match self.integrity {
            Some(integrity) => integrity,
            None => Arc::new(RandomIntegrityChecker::new(config.hash_match_probability)),
        };
        let classifier: Arc<dyn FraudClassifier> = match self.classifier {
            Some(classifier) => classifier,
            None => Arc::new(RandomFraudClassifier::new(config.duplicate_flag_probability)),
        };
        debug!(
            store = store.name(),
            integrity = integrity.name(),
            classifier = classifier.name(),
            "Building KycApp"
        );

        let ctx = Arc::new(KycContext::new(store, config, integrity, classifier));
        let identity = IdentityService::new(ctx.clone());
        let logs = Arc::new(VerificationLogRegistry::new(ctx.clone()));
        let auth = Arc::new(AuthService::new(ctx.clone(), identity.clone()));

        KycApp {
            documents: DocumentStore::new(ctx.clone(), identity.clone(), logs.clone()),
            consents: ConsentRegistry::new(ctx.clone(), identity.clone(), logs.clone()),
            alerts: FraudAlertRegistry::new(ctx.clone()),
            profile: ProfileStore::new(ctx.clone(), identity.clone(), auth.clone()),
            verification: VerificationWorkflow::new(ctx.clone(), logs.clone()),
            ctx,
            identity,
            auth,
            logs,
        }
    }
}

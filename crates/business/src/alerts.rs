//! Fraud-alert registry
//!
//! Ba alert mẫu được seed khi danh sách rỗng. Trạng thái chỉ đi tới:
//! new -> under_review -> resolved.

use crate::context::{Ack, KycContext, SnapshotCell};
use crate::error::ServiceResult;
use chrono::Utc;
use kycdesk_core::alert::{resolve, seed_alerts, start_review};
use kycdesk_core::{CoreError, FraudAlertRecord};
use kycdesk_persistence::keys;
use std::sync::Arc;
use tracing::{debug, info};

pub struct FraudAlertRegistry {
    ctx: Arc<KycContext>,
    alerts: SnapshotCell<Vec<FraudAlertRecord>>,
}

fn seed() -> Vec<FraudAlertRecord> {
    seed_alerts(Utc::now())
}

impl FraudAlertRegistry {
    pub fn new(ctx: Arc<KycContext>) -> Self {
        Self {
            ctx,
            alerts: SnapshotCell::new(keys::FRAUD_ALERTS),
        }
    }

    /// All alerts; an empty list is re-seeded
    pub async fn get_fraud_alerts(&self) -> ServiceResult<Vec<FraudAlertRecord>> {
        self.ctx.simulate_latency().await;
        let alerts = self.alerts.read(self.ctx.store(), seed).await?;
        if !alerts.is_empty() {
            return Ok(alerts);
        }

        debug!("Alert list empty, seeding");
        self.alerts
            .update(self.ctx.store(), seed, |alerts| {
                if alerts.is_empty() {
                    *alerts = seed();
                }
                Ok(alerts.clone())
            })
            .await
    }

    /// Force `resolved` and re-stamp; repeating is harmless
    pub async fn resolve_alert(&self, id: &str) -> ServiceResult<FraudAlertRecord> {
        self.ctx.simulate_latency().await;
        let alert = self
            .alerts
            .update(self.ctx.store(), seed, |alerts| {
                Ok(resolve(alerts, id, Utc::now())?)
            })
            .await?;
        info!(id = %alert.id, "Alert resolved");
        Ok(alert)
    }

    /// Move a `new` alert to `under_review`
    pub async fn review_alert(&self, id: &str) -> ServiceResult<FraudAlertRecord> {
        self.ctx.simulate_latency().await;
        let alert = self
            .alerts
            .update(self.ctx.store(), seed, |alerts| {
                Ok(start_review(alerts, id, Utc::now())?)
            })
            .await?;
        info!(id = %alert.id, status = %alert.status, "Alert under review");
        Ok(alert)
    }

    /// Simulated report submission; the alert itself is unchanged
    pub async fn report_alert(&self, id: &str) -> ServiceResult<Ack> {
        self.ctx.simulate_latency().await;
        let alerts = self.alerts.read(self.ctx.store(), seed).await?;
        if !alerts.iter().any(|a| a.id == id) {
            return Err(CoreError::not_found("Alert", id).into());
        }
        info!(id, "Alert reported");
        Ok(Ack::ok())
    }
}

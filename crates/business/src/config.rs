//! Store configuration
//!
//! Mọi giá trị đều có default; có thể load từ JSON file và override
//! từng field qua biến môi trường `KYCDESK_*`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration shared by every store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KycConfig {
    // === Simulated latency ===
    /// Fixed delay before each store call returns
    #[serde(default)]
    pub latency_ms: u64,

    /// Extra random delay in [0, jitter)
    #[serde(default)]
    pub latency_jitter_ms: u64,

    // === Simulated capabilities ===
    /// Match rate of the random integrity checker
    #[serde(default = "default_hash_match_probability")]
    pub hash_match_probability: f64,

    /// Rate of the extra "duplicate usage" fraud flag
    #[serde(default = "default_duplicate_flag_probability")]
    pub duplicate_flag_probability: f64,

    // === Accounts ===
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,

    /// Lifetime of an email OTP
    #[serde(default = "default_otp_ttl_secs")]
    pub otp_ttl_secs: u64,

    // === Display ===
    #[serde(default = "default_explorer_base_url")]
    pub explorer_base_url: String,

    /// `admin` shown on verification history entries
    #[serde(default = "default_reviewer_name")]
    pub reviewer_name: String,

    /// Revoke, upload and decisions also write verification logs
    #[serde(default)]
    pub audit_all_actions: bool,
}

// Default value functions for serde
fn default_hash_match_probability() -> f64 {
    0.85
}

fn default_duplicate_flag_probability() -> f64 {
    0.30
}

fn default_min_password_len() -> usize {
    8
}

fn default_otp_ttl_secs() -> u64 {
    300 // 5 minutes
}

fn default_explorer_base_url() -> String {
    "https://explorer.kycdesk.local".to_string()
}

fn default_reviewer_name() -> String {
    "Bank Officer".to_string()
}

impl Default for KycConfig {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            latency_jitter_ms: 0,
            hash_match_probability: default_hash_match_probability(),
            duplicate_flag_probability: default_duplicate_flag_probability(),
            min_password_len: default_min_password_len(),
            otp_ttl_secs: default_otp_ttl_secs(),
            explorer_base_url: default_explorer_base_url(),
            reviewer_name: default_reviewer_name(),
            audit_all_actions: false,
        }
    }
}

impl KycConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Apply `KYCDESK_*` environment overrides on top of `self`
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Same as `with_env_overrides` with an injectable lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("KYCDESK_LATENCY_MS").and_then(|v| v.parse().ok()) {
            self.latency_ms = v;
        }
        if let Some(v) = lookup("KYCDESK_LATENCY_JITTER_MS").and_then(|v| v.parse().ok()) {
            self.latency_jitter_ms = v;
        }
        if let Some(v) = lookup("KYCDESK_HASH_MATCH_PROBABILITY").and_then(|v| v.parse().ok()) {
            self.hash_match_probability = v;
        }
        if let Some(v) = lookup("KYCDESK_EXPLORER_URL") {
            self.explorer_base_url = v;
        }
        if let Some(v) = lookup("KYCDESK_REVIEWER_NAME") {
            self.reviewer_name = v;
        }
        if let Some(v) = lookup("KYCDESK_AUDIT_ALL") {
            self.audit_all_actions = matches!(v.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        self
    }

    /// Reject values that make no sense; returns the offending field
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.hash_match_probability) {
            return Err("hash_match_probability must be within [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.duplicate_flag_probability) {
            return Err("duplicate_flag_probability must be within [0, 1]".to_string());
        }
        if self.min_password_len == 0 {
            return Err("min_password_len must be positive".to_string());
        }
        if self.otp_ttl_secs == 0 {
            return Err("otp_ttl_secs must be positive".to_string());
        }
        Ok(())
    }

    /// Fixed part of the simulated latency
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// OTP lifetime as chrono Duration
    pub fn otp_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.otp_ttl_secs as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = KycConfig::default();

        assert_eq!(config.latency_ms, 0);
        assert_eq!(config.latency_jitter_ms, 0);
        assert_eq!(config.hash_match_probability, 0.85);
        assert_eq!(config.duplicate_flag_probability, 0.30);
        assert_eq!(config.min_password_len, 8);
        assert_eq!(config.otp_ttl_secs, 300);
        assert_eq!(config.reviewer_name, "Bank Officer");
        assert!(!config.audit_all_actions);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: KycConfig = serde_json::from_str(r#"{"latency_ms": 250}"#).unwrap();
        assert_eq!(config.latency_ms, 250);
        assert_eq!(config.min_password_len, 8);
        assert_eq!(config.explorer_base_url, "https://explorer.kycdesk.local");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kycdesk.json");
        std::fs::write(&path, r#"{"reviewer_name": "Compliance Desk"}"#).unwrap();

        let config = KycConfig::from_file(&path).unwrap();
        assert_eq!(config.reviewer_name, "Compliance Desk");

        std::fs::write(&path, "not json").unwrap();
        let err = KycConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("KYCDESK_LATENCY_MS", "40"),
            ("KYCDESK_AUDIT_ALL", "true"),
            ("KYCDESK_LATENCY_JITTER_MS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let config = KycConfig::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.latency_ms, 40);
        assert!(config.audit_all_actions);
        assert_eq!(config.latency_jitter_ms, 0);
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        let config = KycConfig {
            hash_match_probability: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duration_helpers() {
        let config = KycConfig::default();
        assert_eq!(config.latency(), Duration::ZERO);
        assert_eq!(config.otp_ttl(), chrono::Duration::minutes(5));
    }
}

//! External capabilities the verification workflow depends on
//!
//! Hai interface: so khớp digest (`DocumentIntegrityChecker`) và chấm điểm
//! gian lận (`FraudClassifier`). Bản random chỉ để demo; bản digest làm
//! phép so sánh thật.

use async_trait::async_trait;
use kycdesk_core::applicant::DUPLICATE_USAGE_FLAG;
use kycdesk_core::{ApplicantDocument, IntegrityResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Compares a stored digest with a freshly computed one
#[async_trait]
pub trait DocumentIntegrityChecker: Send + Sync {
    /// Checker name for logging
    fn name(&self) -> &str;

    async fn compare(&self, stored_digest: &str, recomputed_digest: &str) -> IntegrityResult;
}

/// Raw classifier output, before thresholds are applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudScore {
    pub score: u8,
    pub flags: Vec<String>,
}

/// Scores a document for fraud risk
#[async_trait]
pub trait FraudClassifier: Send + Sync {
    fn name(&self) -> &str;

    async fn score(&self, document: &ApplicantDocument) -> FraudScore;
}

// === Digest comparison ===

/// Real comparison: match iff the two hex digests are equal
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestIntegrityChecker;

#[async_trait]
impl DocumentIntegrityChecker for DigestIntegrityChecker {
    fn name(&self) -> &str {
        "digest"
    }

    async fn compare(&self, stored_digest: &str, recomputed_digest: &str) -> IntegrityResult {
        if stored_digest.eq_ignore_ascii_case(recomputed_digest) {
            IntegrityResult::Match
        } else {
            IntegrityResult::Mismatch
        }
    }
}

// === Simulated capabilities ===

/// Out-of-range probabilities are clamped; NaN never fires
fn roll(probability: f64) -> bool {
    if probability.is_nan() {
        return false;
    }
    rand::thread_rng().gen_bool(probability.clamp(0.0, 1.0))
}

/// Ignores the digests; matches with a fixed probability
#[derive(Debug, Clone, Copy)]
pub struct RandomIntegrityChecker {
    pub match_probability: f64,
}

impl RandomIntegrityChecker {
    pub fn new(match_probability: f64) -> Self {
        Self { match_probability }
    }
}

impl Default for RandomIntegrityChecker {
    fn default() -> Self {
        Self::new(0.85)
    }
}

#[async_trait]
impl DocumentIntegrityChecker for RandomIntegrityChecker {
    fn name(&self) -> &str {
        "random"
    }

    async fn compare(&self, _stored: &str, _recomputed: &str) -> IntegrityResult {
        if roll(self.match_probability) {
            IntegrityResult::Match
        } else {
            IntegrityResult::Mismatch
        }
    }
}

/// Score in [20, 90) plus an occasional duplicate-usage flag
#[derive(Debug, Clone, Copy)]
pub struct RandomFraudClassifier {
    pub duplicate_flag_probability: f64,
}

impl RandomFraudClassifier {
    pub const MIN_SCORE: u8 = 20;
    pub const MAX_SCORE: u8 = 90;

    pub fn new(duplicate_flag_probability: f64) -> Self {
        Self {
            duplicate_flag_probability,
        }
    }

    fn sample(&self) -> FraudScore {
        let score = rand::thread_rng().gen_range(Self::MIN_SCORE..Self::MAX_SCORE);
        let mut flags = Vec::new();
        if roll(self.duplicate_flag_probability) {
            flags.push(DUPLICATE_USAGE_FLAG.to_string());
        }
        FraudScore { score, flags }
    }
}

impl Default for RandomFraudClassifier {
    fn default() -> Self {
        Self::new(0.30)
    }
}

#[async_trait]
impl FraudClassifier for RandomFraudClassifier {
    fn name(&self) -> &str {
        "random"
    }

    async fn score(&self, _document: &ApplicantDocument) -> FraudScore {
        self.sample()
    }
}

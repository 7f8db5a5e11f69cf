//! Confidence policy
//!
//! Maps a keyword-match count to a confidence in [0, 1].

use crate::error::TriageConfigError;
use serde::{Deserialize, Serialize};

/// Capped linear confidence policy
///
/// - zero matches: `no_match`
/// - `n >= 1` matches: `min(cap, base + n * increment)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidencePolicy {
    /// Offset added to the per-match increments
    pub base: f64,
    /// Gain per matched keyword
    pub increment: f64,
    /// Upper bound for matched classifications
    pub cap: f64,
    /// Confidence when nothing matched
    pub no_match: f64,
}

impl ConfidencePolicy {
    /// Confidence for a keyword-match count
    #[must_use]
    pub fn confidence(&self, score: usize) -> f64 {
        if score == 0 {
            return self.no_match.clamp(0.0, 1.0);
        }
        #[allow(clippy::cast_precision_loss)]
        let raw = self.base + score as f64 * self.increment;
        raw.min(self.cap).clamp(0.0, 1.0)
    }

    /// Check ranges and monotonicity.
    ///
    /// # Errors
    /// - `ConfidenceOutOfRange` for a constant outside [0, 1] (or a negative
    ///   increment)
    /// - `NonMonotonicConfidence` if `no_match` exceeds the one-match value
    pub fn validate(&self) -> Result<(), TriageConfigError> {
        for (field, value) in [
            ("base", self.base),
            ("increment", self.increment),
            ("cap", self.cap),
            ("no_match", self.no_match),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TriageConfigError::ConfidenceOutOfRange { field, value });
            }
        }

        let single_match = self.confidence(1);
        if self.no_match > single_match {
            return Err(TriageConfigError::NonMonotonicConfidence {
                no_match: self.no_match,
                single_match,
            });
        }
        Ok(())
    }
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            base: 0.5,
            increment: 0.1,
            cap: 0.85,
            no_match: 0.3,
        }
    }
}

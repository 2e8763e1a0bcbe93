use serde::{Deserialize, Serialize};

pub const DEFAULT_APPROVAL_THRESHOLD: f64 = 70.0;

/// Scoring policy shared by every session of a deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Minimum percentage for a candidate with misses to be sent to review instead of rejected.
    pub approval_threshold: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            approval_threshold: DEFAULT_APPROVAL_THRESHOLD,
        }
    }
}

/// Non-finite thresholds fall back to the default; anything else is clamped to 0-100.
pub fn sanitize_threshold(threshold: f64) -> f64 {
    if threshold.is_finite() {
        threshold.clamp(0.0, 100.0)
    } else {
        DEFAULT_APPROVAL_THRESHOLD
    }
}

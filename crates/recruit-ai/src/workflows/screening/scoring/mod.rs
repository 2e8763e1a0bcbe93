//! Weighted aggregation of per-question results into a session verdict.
//!
//! The aggregator is a pure function of an immutable result snapshot and the approval
//! threshold. Verdicts are recomputed from the snapshot every time; nothing patches them.

mod config;
mod policy;
mod stats;

pub use config::{sanitize_threshold, EvaluationConfig, DEFAULT_APPROVAL_THRESHOLD};
pub use policy::SessionOutcome;
pub use stats::{method_distribution, MethodDistribution, MethodStats, ScoreSummary, VerdictStats};

use serde::{Deserialize, Serialize};

use super::evaluation::{clamp_score, EvaluationResult, MAX_SCORE};
use super::finalization::can_finalize;
use policy::classify;

fn default_weight() -> f64 {
    1.0
}

/// A result joined with the weight and eliminatory flag of its question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEvaluation {
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub is_eliminatory: bool,
    #[serde(flatten)]
    pub result: EvaluationResult,
}

impl ScoredEvaluation {
    pub fn new(result: EvaluationResult, weight: f64, is_eliminatory: bool) -> Self {
        Self {
            weight,
            is_eliminatory,
            result,
        }
    }

    fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            0.0
        }
    }
}

/// Authoritative (or provisional) outcome for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionVerdict {
    pub total_score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub outcome: SessionOutcome,
    pub reason: String,
    pub eliminatory_failures: usize,
    pub stats: VerdictStats,
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `total / max` as a two-decimal percentage; zero when nothing can be scored.
pub fn percentage(total: f64, max: f64) -> f64 {
    if max > 0.0 {
        round2(total / max * 100.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringAggregator {
    threshold: f64,
}

impl Default for ScoringAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_APPROVAL_THRESHOLD)
    }
}

impl ScoringAggregator {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: sanitize_threshold(threshold),
        }
    }

    pub fn from_config(config: &EvaluationConfig) -> Self {
        Self::new(config.approval_threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Scores arriving from outside the engine are clamped to 0-100 before weighting.
    fn totals(evaluations: &[ScoredEvaluation]) -> (f64, f64) {
        let (total, max) = evaluations
            .iter()
            .fold((0.0, 0.0), |(total, max), evaluation| {
                let weight = evaluation.effective_weight();
                (
                    total + clamp_score(evaluation.result.score) * weight,
                    max + MAX_SCORE * weight,
                )
            });
        (round2(total), round2(max))
    }

    /// Score a result snapshot. Pending results count as zero; use
    /// [`ScoringAggregator::final_verdict`] when the verdict must be authoritative.
    pub fn score(&self, evaluations: &[ScoredEvaluation]) -> SessionVerdict {
        let stats = VerdictStats::collect(evaluations.iter().map(|e| &e.result));
        if evaluations.is_empty() {
            return pending_verdict("no evaluations recorded", stats);
        }

        let (total_score, max_score) = Self::totals(evaluations);
        let percentage = percentage(total_score, max_score);
        let eliminatory_failures = evaluations
            .iter()
            .filter(|evaluation| evaluation.is_eliminatory && evaluation.result.failed())
            .count();

        let (outcome, reason) = classify(
            percentage,
            self.threshold,
            eliminatory_failures,
            stats.failed,
        );

        SessionVerdict {
            total_score,
            max_score,
            percentage,
            outcome,
            reason,
            eliminatory_failures,
            stats,
        }
    }

    /// Score only once every result is final; otherwise report a pending verdict.
    pub fn final_verdict(&self, evaluations: &[ScoredEvaluation]) -> SessionVerdict {
        let check = can_finalize(evaluations.iter().map(|e| &e.result));
        if !check.allowed {
            let stats = VerdictStats::collect(evaluations.iter().map(|e| &e.result));
            return pending_verdict(check.reason, stats);
        }
        self.score(evaluations)
    }

    pub fn summary(&self, evaluations: &[ScoredEvaluation]) -> ScoreSummary {
        let stats = VerdictStats::collect(evaluations.iter().map(|e| &e.result));
        let (total_score, max_score) = Self::totals(evaluations);
        ScoreSummary {
            total_score,
            max_score,
            percentage: percentage(total_score, max_score),
            total: stats.total,
            passed: stats.passed,
            failed: stats.failed,
            pending: stats.pending,
        }
    }
}

fn pending_verdict(reason: impl Into<String>, stats: VerdictStats) -> SessionVerdict {
    SessionVerdict {
        total_score: 0.0,
        max_score: 0.0,
        percentage: 0.0,
        outcome: SessionOutcome::Pending,
        reason: reason.into(),
        eliminatory_failures: 0,
        stats,
    }
}

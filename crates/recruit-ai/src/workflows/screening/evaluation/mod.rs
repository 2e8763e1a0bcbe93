mod evaluators;
mod resolver;
mod rules;
mod validators;

pub use evaluators::{
    AiEvaluator, AiFallback, AnswerEvaluator, DisabledProvider, EvaluatorDispatch,
    GradingProvider, GradingRequest, GradingResponse, ManualEvaluator, ManualReview,
    ManualReviewError, ProviderError, RuleEvaluator,
};
pub use resolver::{resolve, UnresolvedRule};
pub use rules::{
    check_definition, ComparisonOperator, ContainsRule, EqualsRule, FormatRule, KeywordMode,
    KeywordRule, LengthRule, OptionRule, RangeBounds, RangeRule, Rule, RuleCheck, RuleKind,
    RuleParseError, RulePayload, SelectionKind,
};
pub use validators::Validate;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::domain::MethodUsed;

/// Validator-specific diagnostics attached to a result.
pub type Details = Map<String, Value>;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

pub(crate) fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(MIN_SCORE, MAX_SCORE)
    } else {
        MIN_SCORE
    }
}

/// Outcome of a single validator run, before the evaluator stamps the method on it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleVerdict {
    pub complies: bool,
    pub score: f64,
    pub reason: String,
    pub details: Details,
}

impl RuleVerdict {
    pub fn pass(reason: impl Into<String>) -> Self {
        Self {
            complies: true,
            score: MAX_SCORE,
            reason: reason.into(),
            details: Details::new(),
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            complies: false,
            score: MIN_SCORE,
            reason: reason.into(),
            details: Details::new(),
        }
    }

    /// Verdict with partial credit; the score is rounded to the nearest integer.
    pub fn scored(complies: bool, score: f64, reason: impl Into<String>) -> Self {
        Self {
            complies,
            score: clamp_score(score.round()),
            reason: reason.into(),
            details: Details::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Normalized per-question judgment. `complies == None` means the answer awaits manual review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub complies: Option<bool>,
    pub score: f64,
    pub reason: String,
    pub method_used: MethodUsed,
    #[serde(default)]
    pub details: Details,
}

impl EvaluationResult {
    pub fn from_verdict(verdict: RuleVerdict, method_used: MethodUsed) -> Self {
        Self {
            complies: Some(verdict.complies),
            score: clamp_score(verdict.score),
            reason: verdict.reason,
            method_used,
            details: verdict.details,
        }
    }

    /// Failed-closed result for input that could not be judged.
    pub fn failed_closed(
        method_used: MethodUsed,
        reason: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let mut details = Details::new();
        details.insert("error".to_string(), Value::String(error.into()));
        Self {
            complies: Some(false),
            score: MIN_SCORE,
            reason: reason.into(),
            method_used,
            details,
        }
    }

    pub fn awaiting_review() -> Self {
        Self {
            complies: None,
            score: MIN_SCORE,
            reason: "awaiting manual review".to_string(),
            method_used: MethodUsed::Manual,
            details: Details::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.complies.is_none()
    }

    pub fn passed(&self) -> bool {
        self.complies == Some(true)
    }

    pub fn failed(&self) -> bool {
        self.complies == Some(false)
    }
}

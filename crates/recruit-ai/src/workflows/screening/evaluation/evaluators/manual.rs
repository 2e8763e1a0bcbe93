use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::super::super::domain::{Answer, MethodUsed, Question};
use super::super::{Details, EvaluationResult, MAX_SCORE, MIN_SCORE};
use super::AnswerEvaluator;

/// Placeholder strategy: the answer waits for a human reviewer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualEvaluator;

#[async_trait]
impl AnswerEvaluator for ManualEvaluator {
    async fn evaluate(&self, _question: &Question, _answer: &Answer) -> EvaluationResult {
        EvaluationResult::awaiting_review()
    }
}

/// A reviewer's judgment on an answer that was queued for manual review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualReview {
    pub complies: bool,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub reviewer: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ManualReviewError {
    #[error("review score {0} is outside 0-100")]
    ScoreOutOfRange(f64),
    #[error("review must name its reviewer")]
    MissingReviewer,
}

impl ManualReview {
    /// Build the result that replaces the pending one.
    pub fn into_result(self) -> Result<EvaluationResult, ManualReviewError> {
        if !self.score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&self.score) {
            return Err(ManualReviewError::ScoreOutOfRange(self.score));
        }
        let reviewer = self.reviewer.trim();
        if reviewer.is_empty() {
            return Err(ManualReviewError::MissingReviewer);
        }

        let reason = self
            .reason
            .filter(|reason| !reason.trim().is_empty())
            .unwrap_or_else(|| format!("manually reviewed by {reviewer}"));

        let mut details = Details::new();
        details.insert("reviewer".to_string(), Value::from(reviewer));
        details.insert(
            "reviewed_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );

        Ok(EvaluationResult {
            complies: Some(self.complies),
            score: self.score,
            reason,
            method_used: MethodUsed::Manual,
            details,
        })
    }
}

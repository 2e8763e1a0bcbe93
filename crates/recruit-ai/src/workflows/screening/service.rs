use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use tracing::info;

use super::domain::{Answer, EvaluationId, Question, QuestionContractError, SessionId};
use super::evaluation::{EvaluatorDispatch, ManualReview, ManualReviewError};
use super::finalization::{can_finalize, FinalizationCheck};
use super::repository::{EvaluationRecord, EvaluationRepository, RepositoryError};
use super::scoring::{
    method_distribution, EvaluationConfig, MethodDistribution, ScoreSummary, ScoredEvaluation,
    ScoringAggregator, SessionVerdict,
};

/// Facade tying evaluator dispatch, persistence, and the scoring aggregator together.
pub struct ScreeningService<R> {
    repository: Arc<R>,
    dispatch: Arc<EvaluatorDispatch>,
    aggregator: ScoringAggregator,
}

static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_evaluation_id() -> EvaluationId {
    let id = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvaluationId(format!("eval-{id:06}"))
}

impl<R> ScreeningService<R>
where
    R: EvaluationRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        dispatch: Arc<EvaluatorDispatch>,
        config: EvaluationConfig,
    ) -> Self {
        Self {
            repository,
            dispatch,
            aggregator: ScoringAggregator::from_config(&config),
        }
    }

    pub fn aggregator(&self) -> &ScoringAggregator {
        &self.aggregator
    }

    /// Evaluate a candidate's answer and persist the result.
    pub async fn record_answer(
        &self,
        session_id: SessionId,
        question: &Question,
        answer: Answer,
    ) -> Result<EvaluationRecord, ScreeningServiceError> {
        let result = self.dispatch.evaluate(question, &answer).await?;

        let record = EvaluationRecord {
            id: next_evaluation_id(),
            session_id,
            question_id: question.id.clone(),
            weight: question.weight,
            is_eliminatory: question.is_eliminatory,
            answer,
            result,
            evaluated_at: Utc::now(),
            revision: 1,
        };

        let stored = self.repository.insert(record)?;
        Ok(stored)
    }

    /// Replace an evaluation with a reviewer's judgment.
    pub fn apply_manual_review(
        &self,
        evaluation_id: &EvaluationId,
        review: ManualReview,
    ) -> Result<EvaluationRecord, ScreeningServiceError> {
        let current = self
            .repository
            .fetch(evaluation_id)?
            .ok_or(RepositoryError::NotFound)?;
        let result = review.into_result()?;

        let replacement = current.superseded_by(result);
        let stored = self.repository.replace(replacement)?;
        info!(
            evaluation_id = %stored.id,
            session_id = %stored.session_id,
            revision = stored.revision,
            "manual review applied"
        );
        Ok(stored)
    }

    pub fn session_evaluations(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<EvaluationRecord>, ScreeningServiceError> {
        Ok(self.repository.for_session(session_id)?)
    }

    pub fn pending_reviews(
        &self,
        limit: usize,
    ) -> Result<Vec<EvaluationRecord>, ScreeningServiceError> {
        Ok(self.repository.pending_review(limit)?)
    }

    pub fn can_finalize(
        &self,
        session_id: &SessionId,
    ) -> Result<FinalizationCheck, ScreeningServiceError> {
        let records = self.repository.for_session(session_id)?;
        Ok(can_finalize(records.iter().map(|record| &record.result)))
    }

    /// Authoritative verdict; `pending` while reviews are outstanding.
    pub fn session_verdict(
        &self,
        session_id: &SessionId,
    ) -> Result<SessionVerdict, ScreeningServiceError> {
        let scored = self.scored(session_id)?;
        let verdict = self.aggregator.final_verdict(&scored);
        info!(
            session_id = %session_id,
            outcome = verdict.outcome.label(),
            percentage = verdict.percentage,
            "session verdict computed"
        );
        Ok(verdict)
    }

    pub fn score_summary(
        &self,
        session_id: &SessionId,
    ) -> Result<ScoreSummary, ScreeningServiceError> {
        let scored = self.scored(session_id)?;
        Ok(self.aggregator.summary(&scored))
    }

    pub fn method_distribution(
        &self,
        session_id: &SessionId,
    ) -> Result<MethodDistribution, ScreeningServiceError> {
        let records = self.repository.for_session(session_id)?;
        Ok(method_distribution(records.iter().map(|record| &record.result)))
    }

    /// Score a result set that is not stored here. A threshold overrides the configured one.
    pub fn score_results(
        &self,
        evaluations: &[ScoredEvaluation],
        threshold: Option<f64>,
    ) -> SessionVerdict {
        match threshold {
            Some(threshold) => ScoringAggregator::new(threshold).score(evaluations),
            None => self.aggregator.score(evaluations),
        }
    }

    fn scored(&self, session_id: &SessionId) -> Result<Vec<ScoredEvaluation>, ScreeningServiceError> {
        let records = self.repository.for_session(session_id)?;
        Ok(records.iter().map(EvaluationRecord::scored).collect())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error(transparent)]
    Contract(#[from] QuestionContractError),
    #[error(transparent)]
    Review(#[from] ManualReviewError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ScreeningServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScreeningServiceError::Contract(_) | ScreeningServiceError::Review(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ScreeningServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            ScreeningServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            ScreeningServiceError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

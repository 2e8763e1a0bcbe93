use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Answer, EvaluationId, QuestionId, SessionId};
use super::evaluation::EvaluationResult;
use super::scoring::ScoredEvaluation;

/// Persisted evaluation of one answer. Corrections replace the record by id and bump
/// `revision`; fields are never merged in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: EvaluationId,
    pub session_id: SessionId,
    pub question_id: QuestionId,
    pub weight: f64,
    pub is_eliminatory: bool,
    pub answer: Answer,
    pub result: EvaluationResult,
    pub evaluated_at: DateTime<Utc>,
    pub revision: u32,
}

impl EvaluationRecord {
    pub fn scored(&self) -> ScoredEvaluation {
        ScoredEvaluation::new(self.result.clone(), self.weight, self.is_eliminatory)
    }

    pub fn is_pending(&self) -> bool {
        self.result.is_pending()
    }

    /// New revision of this record carrying `result`.
    pub fn superseded_by(&self, result: EvaluationResult) -> Self {
        Self {
            result,
            evaluated_at: Utc::now(),
            revision: self.revision + 1,
            ..self.clone()
        }
    }
}

/// Storage abstraction so the service can be exercised without a database.
pub trait EvaluationRepository: Send + Sync {
    /// Store a new record. A second record for the same session and question is a conflict.
    fn insert(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError>;
    /// Swap the record with the same id for `record`.
    fn replace(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError>;
    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError>;
    fn for_session(&self, session_id: &SessionId) -> Result<Vec<EvaluationRecord>, RepositoryError>;
    fn pending_review(&self, limit: usize) -> Result<Vec<EvaluationRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("evaluation already recorded")]
    Conflict,
    #[error("evaluation not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

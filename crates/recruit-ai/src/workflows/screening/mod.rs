//! Candidate screening: answer evaluation, weighted scoring, and verdict finalization.
//!
//! Each answer is routed to a grading strategy (fixed rule, AI, or manual review) and
//! normalized into an [`EvaluationResult`]. A session's stored results are scored into a
//! [`SessionVerdict`] once the finalization guard confirms nothing is awaiting review.

pub mod domain;
pub mod evaluation;
pub mod finalization;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Answer, EvaluationId, EvaluationMethod, FieldType, MethodUsed, Question, QuestionContractError,
    QuestionId, SessionId,
};
pub use evaluation::{
    check_definition, AiEvaluator, AiFallback, AnswerEvaluator, DisabledProvider,
    EvaluationResult, EvaluatorDispatch, GradingProvider, GradingRequest, GradingResponse,
    ManualEvaluator, ManualReview, ManualReviewError, ProviderError, Rule, RuleCheck,
    RuleEvaluator, RuleKind, RulePayload, RuleVerdict, Validate,
};
pub use finalization::{can_finalize, FinalizationCheck};
pub use repository::{EvaluationRecord, EvaluationRepository, RepositoryError};
pub use router::{screening_router, RecordAnswerRequest, ScoringRequest};
pub use scoring::{
    method_distribution, percentage, round2, EvaluationConfig, MethodDistribution, MethodStats,
    ScoreSummary, ScoredEvaluation, ScoringAggregator, SessionOutcome, SessionVerdict,
    VerdictStats, DEFAULT_APPROVAL_THRESHOLD,
};
pub use service::{ScreeningService, ScreeningServiceError};

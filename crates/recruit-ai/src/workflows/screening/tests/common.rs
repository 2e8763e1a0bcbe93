use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::screening::domain::{
    EvaluationId, EvaluationMethod, FieldType, MethodUsed, Question, QuestionId, SessionId,
};
use crate::workflows::screening::evaluation::{
    EvaluationResult, EvaluatorDispatch, GradingProvider, GradingRequest, GradingResponse,
    ProviderError, RuleVerdict,
};
use crate::workflows::screening::repository::{
    EvaluationRecord, EvaluationRepository, RepositoryError,
};
use crate::workflows::screening::scoring::{EvaluationConfig, ScoredEvaluation};
use crate::workflows::screening::{screening_router, ScreeningService};

pub(super) fn question(id: &str, field_type: FieldType, rule: Value) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        text: format!("Question {id}"),
        field_type,
        evaluation_method: EvaluationMethod::FixedRule,
        rule: Some(rule),
        weight: 1.0,
        is_eliminatory: false,
        required: true,
        use_ai: false,
        ai_prompt: None,
        ai_criteria: None,
    }
}

pub(super) fn ai_question(id: &str, rule: Option<Value>) -> Question {
    Question {
        evaluation_method: EvaluationMethod::AiOptional,
        use_ai: true,
        rule,
        ai_prompt: Some("Grade the candidate's motivation".to_string()),
        ..question(id, FieldType::LongText, Value::Null)
    }
}

pub(super) fn manual_question(id: &str) -> Question {
    Question {
        evaluation_method: EvaluationMethod::Manual,
        rule: None,
        ..question(id, FieldType::LongText, Value::Null)
    }
}

pub(super) fn evaluation_config() -> EvaluationConfig {
    EvaluationConfig {
        approval_threshold: 70.0,
    }
}

pub(super) fn result(complies: Option<bool>, score: f64) -> EvaluationResult {
    match complies {
        Some(true) => EvaluationResult::from_verdict(
            RuleVerdict::scored(true, score, "ok"),
            MethodUsed::FixedRule,
        ),
        Some(false) => EvaluationResult::from_verdict(
            RuleVerdict::scored(false, score, "miss"),
            MethodUsed::FixedRule,
        ),
        None => EvaluationResult::awaiting_review(),
    }
}

pub(super) fn scored(complies: Option<bool>, score: f64, weight: f64) -> ScoredEvaluation {
    ScoredEvaluation::new(result(complies, score), weight, false)
}

pub(super) fn eliminatory(complies: Option<bool>, score: f64, weight: f64) -> ScoredEvaluation {
    ScoredEvaluation::new(result(complies, score), weight, true)
}

pub(super) fn session(id: &str) -> SessionId {
    SessionId(id.to_string())
}

pub(super) fn build_service() -> (ScreeningService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = ScreeningService::new(
        repository.clone(),
        Arc::new(EvaluatorDispatch::rule_based()),
        evaluation_config(),
    );
    (service, repository)
}

pub(super) fn screening_router_with_service<R>(service: ScreeningService<R>) -> axum::Router
where
    R: EvaluationRepository + 'static,
{
    screening_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<EvaluationId, EvaluationRecord>>>,
}

impl EvaluationRepository for MemoryRepository {
    fn insert(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let duplicate = guard.values().any(|existing| {
            existing.session_id == record.session_id && existing.question_id == record.question_id
        });
        if duplicate || guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn replace(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_session(&self, session_id: &SessionId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<_> = guard
            .values()
            .filter(|record| &record.session_id == session_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    fn pending_review(&self, limit: usize) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<_> = guard
            .values()
            .filter(|record| record.is_pending())
            .cloned()
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records.truncate(limit);
        Ok(records)
    }
}

pub(super) struct ConflictRepository;

impl EvaluationRepository for ConflictRepository {
    fn insert(&self, _record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn replace(&self, _record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Ok(None)
    }

    fn for_session(&self, _session_id: &SessionId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Ok(Vec::new())
    }

    fn pending_review(&self, _limit: usize) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl EvaluationRepository for UnavailableRepository {
    fn insert(&self, _record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn replace(&self, _record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_session(&self, _session_id: &SessionId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending_review(&self, _limit: usize) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Provider that always returns the same grade.
pub(super) struct FixedProvider(pub(super) GradingResponse);

#[async_trait]
impl GradingProvider for FixedProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn grade(&self, _request: GradingRequest) -> Result<GradingResponse, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Provider that always fails with the given error.
pub(super) struct FailingProvider(pub(super) ProviderError);

#[async_trait]
impl GradingProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn grade(&self, _request: GradingRequest) -> Result<GradingResponse, ProviderError> {
        Err(self.0.clone())
    }
}

/// Provider that answers only after `delay`.
pub(super) struct SlowProvider(pub(super) Duration);

#[async_trait]
impl GradingProvider for SlowProvider {
    fn name(&self) -> &str {
        "slow"
    }

    async fn grade(&self, _request: GradingRequest) -> Result<GradingResponse, ProviderError> {
        tokio::time::sleep(self.0).await;
        Ok(GradingResponse {
            complies: true,
            score: 90.0,
            reason: "late but positive".to_string(),
        })
    }
}

/// Provider that records every request it receives.
#[derive(Default)]
pub(super) struct RecordingProvider {
    pub(super) requests: Mutex<Vec<GradingRequest>>,
}

#[async_trait]
impl GradingProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn grade(&self, request: GradingRequest) -> Result<GradingResponse, ProviderError> {
        self.requests
            .lock()
            .expect("provider mutex poisoned")
            .push(request);
        Ok(GradingResponse {
            complies: true,
            score: 80.0,
            reason: "clear motivation".to_string(),
        })
    }
}

pub(super) fn assert_conflict_response(response: Response) {
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

use metrics_exporter_prometheus::PrometheusHandle;
use recruit_ai::config::AiConfig;
use recruit_ai::workflows::screening::{
    AiEvaluator, DisabledProvider, EvaluationId, EvaluationRecord, EvaluationRepository,
    EvaluatorDispatch, GradingProvider, RepositoryError, ScoredEvaluation, SessionId,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local evaluation store keyed by evaluation id.
#[derive(Default, Clone)]
pub(crate) struct InMemoryEvaluationRepository {
    records: Arc<Mutex<BTreeMap<EvaluationId, EvaluationRecord>>>,
}

impl InMemoryEvaluationRepository {
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<EvaluationId, EvaluationRecord>>, RepositoryError>
    {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl EvaluationRepository for InMemoryEvaluationRepository {
    fn insert(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.lock()?;
        let answered = guard.values().any(|existing| {
            existing.session_id == record.session_id && existing.question_id == record.question_id
        });
        if answered || guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn replace(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record.clone());
            Ok(record)
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn for_session(&self, session_id: &SessionId) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Ok(self
            .lock()?
            .values()
            .filter(|record| &record.session_id == session_id)
            .cloned()
            .collect())
    }

    fn pending_review(&self, limit: usize) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Ok(self
            .lock()?
            .values()
            .filter(|record| record.is_pending())
            .take(limit)
            .cloned()
            .collect())
    }
}

/// No language-model client ships with the service yet, so AI questions always go through
/// the configured fallback.
pub(crate) fn grading_provider(config: &AiConfig) -> Arc<dyn GradingProvider> {
    if config.enabled {
        warn!(
            provider = %config.provider,
            model = %config.model,
            "no grading client available for provider; AI questions use the configured fallback"
        );
    }
    Arc::new(DisabledProvider)
}

pub(crate) fn build_dispatch(config: &AiConfig) -> EvaluatorDispatch {
    let evaluator = AiEvaluator::from_config(grading_provider(config), config);
    EvaluatorDispatch::new(Arc::new(evaluator))
}

/// Result sets accepted by `score --input`: a bare array or an object with a threshold.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ScoringInput {
    Bare(Vec<ScoredEvaluation>),
    WithThreshold {
        evaluations: Vec<ScoredEvaluation>,
        #[serde(default)]
        threshold: Option<f64>,
    },
}

impl ScoringInput {
    pub(crate) fn into_parts(self) -> (Vec<ScoredEvaluation>, Option<f64>) {
        match self {
            ScoringInput::Bare(evaluations) => (evaluations, None),
            ScoringInput::WithThreshold {
                evaluations,
                threshold,
            } => (evaluations, threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recruit_ai::workflows::screening::{
        Answer, EvaluationResult, QuestionId, SessionOutcome, ScoringAggregator,
    };
    use serde_json::json;

    fn record(id: &str, session: &str, question: &str, result: EvaluationResult) -> EvaluationRecord {
        EvaluationRecord {
            id: EvaluationId(id.to_string()),
            session_id: SessionId(session.to_string()),
            question_id: QuestionId(question.to_string()),
            weight: 1.0,
            is_eliminatory: false,
            answer: Answer::from("..."),
            result,
            evaluated_at: chrono::Utc::now(),
            revision: 1,
        }
    }

    #[test]
    fn repository_rejects_second_answer_to_a_question() {
        let repository = InMemoryEvaluationRepository::default();
        repository
            .insert(record("eval-1", "s-1", "q-1", EvaluationResult::awaiting_review()))
            .expect("first insert");

        assert!(matches!(
            repository.insert(record("eval-2", "s-1", "q-1", EvaluationResult::awaiting_review())),
            Err(RepositoryError::Conflict)
        ));
        assert_eq!(repository.pending_review(10).expect("pending").len(), 1);
    }

    #[test]
    fn replace_requires_an_existing_record() {
        let repository = InMemoryEvaluationRepository::default();
        assert!(matches!(
            repository.replace(record("eval-9", "s-1", "q-1", EvaluationResult::awaiting_review())),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn scoring_input_accepts_both_shapes() {
        let bare: ScoringInput = serde_json::from_value(json!([
            { "complies": true, "score": 100, "reason": "ok", "method_used": "fixed_rule" }
        ]))
        .expect("bare array");
        let (evaluations, threshold) = bare.into_parts();
        assert_eq!(evaluations.len(), 1);
        assert!(threshold.is_none());

        let wrapped: ScoringInput = serde_json::from_value(json!({
            "threshold": 90,
            "evaluations": [
                { "complies": false, "score": 80, "reason": "close", "method_used": "ai" }
            ]
        }))
        .expect("wrapped object");
        let (evaluations, threshold) = wrapped.into_parts();
        assert_eq!(threshold, Some(90.0));
        assert_eq!(
            ScoringAggregator::new(90.0).score(&evaluations).outcome,
            SessionOutcome::Rejected
        );
    }

    #[tokio::test]
    async fn disabled_ai_falls_back_to_rules() {
        let dispatch = build_dispatch(&AiConfig::default());
        let question = serde_json::from_value(json!({
            "id": "motivation",
            "text": "Why us?",
            "field_type": "long_text",
            "evaluation_method": "ai_optional",
            "use_ai": true,
            "rule": { "keywords": ["team"] },
        }))
        .expect("question parses");

        let result = dispatch
            .evaluate(&question, &Answer::from("A strong team"))
            .await
            .expect("contract holds");
        assert_eq!(result.complies, Some(true));
        assert!(result.details.contains_key("ai_error"));
    }
}

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Answer, EvaluationId, Question, SessionId};
use super::evaluation::ManualReview;
use super::finalization::can_finalize;
use super::repository::EvaluationRepository;
use super::scoring::ScoredEvaluation;
use super::service::{ScreeningService, ScreeningServiceError};

const DEFAULT_PENDING_LIMIT: usize = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct RecordAnswerRequest {
    pub question: Question,
    pub answer: Answer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringRequest {
    pub evaluations: Vec<ScoredEvaluation>,
    #[serde(default)]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PendingQuery {
    pub limit: Option<usize>,
}

/// Router builder exposing evaluation, review, and scoring endpoints.
pub fn screening_router<R>(service: Arc<ScreeningService<R>>) -> Router
where
    R: EvaluationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/sessions/:session_id/evaluations",
            post(record_answer_handler::<R>).get(list_evaluations_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/finalization",
            get(finalization_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/verdict",
            get(verdict_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/statistics",
            get(statistics_handler::<R>),
        )
        .route(
            "/api/v1/evaluations/pending",
            get(pending_reviews_handler::<R>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/review",
            put(review_handler::<R>),
        )
        .route("/api/v1/scoring", post(scoring_handler::<R>))
        .with_state(service)
}

fn error_response(error: ScreeningServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (error.status_code(), axum::Json(payload)).into_response()
}

pub(crate) async fn record_answer_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<RecordAnswerRequest>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    let session_id = SessionId(session_id);
    match service
        .record_answer(session_id, &request.question, request.answer)
        .await
    {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_evaluations_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.session_evaluations(&SessionId(session_id)) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn finalization_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.can_finalize(&SessionId(session_id)) {
        Ok(check) => (StatusCode::OK, axum::Json(check)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn verdict_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.session_verdict(&SessionId(session_id)) {
        Ok(verdict) => (StatusCode::OK, axum::Json(verdict)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn statistics_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    let session_id = SessionId(session_id);
    let summary = match service.score_summary(&session_id) {
        Ok(summary) => summary,
        Err(error) => return error_response(error),
    };
    match service.method_distribution(&session_id) {
        Ok(distribution) => {
            let payload = json!({
                "session_id": session_id,
                "summary": summary,
                "methods": distribution,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn pending_reviews_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Query(query): Query<PendingQuery>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_PENDING_LIMIT);
    match service.pending_reviews(limit) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Path(evaluation_id): Path<String>,
    axum::Json(review): axum::Json<ManualReview>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.apply_manual_review(&EvaluationId(evaluation_id), review) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn scoring_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    axum::Json(request): axum::Json<ScoringRequest>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    let verdict = service.score_results(&request.evaluations, request.threshold);
    let finalization = can_finalize(request.evaluations.iter().map(|e| &e.result));
    let payload = json!({
        "verdict": verdict,
        "finalization": finalization,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

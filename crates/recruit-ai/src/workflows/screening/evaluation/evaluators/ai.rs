use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::super::super::domain::{Answer, MethodUsed, Question, QuestionId};
use super::super::{EvaluationResult, MAX_SCORE, MIN_SCORE};
use super::rule::RuleEvaluator;
use super::AnswerEvaluator;
use crate::config::AiConfig;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// What the AI strategy does when the provider cannot produce a usable grade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AiFallback {
    /// Record a failed result attributed to the AI strategy.
    FailClosed,
    /// Grade with the question's fixed rule when it has one.
    #[default]
    RuleBased,
}

/// Payload handed to a grading provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradingRequest {
    pub question_id: QuestionId,
    pub question: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Value>,
    pub model: String,
    pub max_tokens: u32,
}

/// Grade returned by a provider; checked before it becomes a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResponse {
    pub complies: bool,
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("AI grading is disabled")]
    Disabled,
    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),
    #[error("provider transport failed: {0}")]
    Transport(String),
    #[error("provider returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Outbound seam to a language-model grader.
#[async_trait]
pub trait GradingProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn grade(&self, request: GradingRequest) -> Result<GradingResponse, ProviderError>;
}

/// Provider used while AI grading is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProvider;

#[async_trait]
impl GradingProvider for DisabledProvider {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn grade(&self, _request: GradingRequest) -> Result<GradingResponse, ProviderError> {
        Err(ProviderError::Disabled)
    }
}

/// AI strategy bounded by a timeout with a configurable fallback.
pub struct AiEvaluator {
    provider: Arc<dyn GradingProvider>,
    model: String,
    max_tokens: u32,
    timeout: Duration,
    fallback: AiFallback,
    rules: RuleEvaluator,
}

impl AiEvaluator {
    pub fn new(provider: Arc<dyn GradingProvider>) -> Self {
        Self {
            provider,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
            fallback: AiFallback::default(),
            rules: RuleEvaluator,
        }
    }

    pub fn from_config(provider: Arc<dyn GradingProvider>, config: &AiConfig) -> Self {
        Self::new(provider)
            .with_model(config.model.clone())
            .with_max_tokens(config.max_tokens)
            .with_timeout(config.timeout)
            .with_fallback(config.fallback)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fallback(mut self, fallback: AiFallback) -> Self {
        self.fallback = fallback;
        self
    }

    fn request_for(&self, question: &Question, answer: &Answer) -> GradingRequest {
        GradingRequest {
            question_id: question.id.clone(),
            question: question.text.clone(),
            answer: answer.as_text().into_owned(),
            prompt: question.ai_prompt.clone(),
            criteria: question.ai_criteria.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
        }
    }

    async fn grade(&self, request: GradingRequest) -> Result<GradingResponse, ProviderError> {
        let response = tokio::time::timeout(self.timeout, self.provider.grade(request))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))??;

        if !response.score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&response.score) {
            return Err(ProviderError::InvalidResponse(format!(
                "score {} is outside 0-100",
                response.score
            )));
        }
        Ok(response)
    }

    fn recover(&self, question: &Question, answer: &Answer, err: ProviderError) -> EvaluationResult {
        warn!(
            question_id = %question.id,
            provider = self.provider.name(),
            error = %err,
            "AI grading failed"
        );

        if self.fallback == AiFallback::RuleBased && question.has_rule() {
            let mut result = self.rules.apply(question, answer);
            result
                .details
                .insert("ai_error".to_string(), Value::String(err.to_string()));
            return result;
        }

        EvaluationResult::failed_closed(
            MethodUsed::Ai,
            format!("AI evaluation failed: {err}"),
            err.to_string(),
        )
    }
}

#[async_trait]
impl AnswerEvaluator for AiEvaluator {
    async fn evaluate(&self, question: &Question, answer: &Answer) -> EvaluationResult {
        let request = self.request_for(question, answer);
        match self.grade(request).await {
            Ok(response) => {
                let mut result = EvaluationResult {
                    complies: Some(response.complies),
                    score: response.score,
                    reason: response.reason,
                    method_used: MethodUsed::Ai,
                    details: Default::default(),
                };
                result.details.insert(
                    "provider".to_string(),
                    Value::from(self.provider.name()),
                );
                result
                    .details
                    .insert("model".to_string(), Value::from(self.model.as_str()));
                result
            }
            Err(err) => self.recover(question, answer, err),
        }
    }
}

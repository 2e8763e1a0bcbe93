//! Grading strategies and the dispatch that picks one per question.

mod ai;
mod manual;
mod rule;

pub use ai::{
    AiEvaluator, AiFallback, DisabledProvider, GradingProvider, GradingRequest, GradingResponse,
    ProviderError,
};
pub use manual::{ManualEvaluator, ManualReview, ManualReviewError};
pub use rule::RuleEvaluator;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::super::domain::{Answer, MethodUsed, Question, QuestionContractError};
use super::EvaluationResult;

/// Shared contract for every grading strategy. Implementations never fail: problems with the
/// candidate's input or an upstream provider are folded into a failed-closed result.
#[async_trait]
pub trait AnswerEvaluator: Send + Sync {
    async fn evaluate(&self, question: &Question, answer: &Answer) -> EvaluationResult;
}

/// Routes each question to the strategy its configuration resolves to.
pub struct EvaluatorDispatch {
    rule: RuleEvaluator,
    ai: Arc<dyn AnswerEvaluator>,
    manual: ManualEvaluator,
}

impl EvaluatorDispatch {
    pub fn new(ai: Arc<dyn AnswerEvaluator>) -> Self {
        Self {
            rule: RuleEvaluator,
            ai,
            manual: ManualEvaluator,
        }
    }

    /// Dispatch whose AI strategy is switched off and falls back to fixed rules.
    pub fn rule_based() -> Self {
        Self::new(Arc::new(AiEvaluator::new(Arc::new(DisabledProvider))))
    }

    pub fn strategy(&self, method: MethodUsed) -> &dyn AnswerEvaluator {
        match method {
            MethodUsed::FixedRule => &self.rule,
            MethodUsed::Ai => self.ai.as_ref(),
            MethodUsed::Manual => &self.manual,
        }
    }

    /// Judge one answer. The only error is a broken question contract, which is a caller bug.
    pub async fn evaluate(
        &self,
        question: &Question,
        answer: &Answer,
    ) -> Result<EvaluationResult, QuestionContractError> {
        question.check_contract()?;

        let method = question.effective_method();
        let result = self.strategy(method).evaluate(question, answer).await;

        debug!(
            question_id = %question.id,
            configured = ?question.evaluation_method,
            effective = method.label(),
            method_used = result.method_used.label(),
            complies = ?result.complies,
            score = result.score,
            "answer evaluated"
        );

        Ok(result)
    }
}

impl Default for EvaluatorDispatch {
    fn default() -> Self {
        Self::rule_based()
    }
}

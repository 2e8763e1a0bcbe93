use async_trait::async_trait;
use serde_json::Value;

use super::super::super::domain::{Answer, MethodUsed, Question};
use super::super::resolver::resolve;
use super::super::rules::RulePayload;
use super::super::validators::Validate;
use super::super::{EvaluationResult, RuleVerdict};
use super::AnswerEvaluator;

/// Fixed-rule strategy: resolve the validator from the question and run it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEvaluator;

impl RuleEvaluator {
    pub fn apply(&self, question: &Question, answer: &Answer) -> EvaluationResult {
        EvaluationResult::from_verdict(self.verdict(question, answer), MethodUsed::FixedRule)
    }

    fn verdict(&self, question: &Question, answer: &Answer) -> RuleVerdict {
        let raw = match &question.rule {
            Some(raw) if !raw.is_null() => raw,
            _ => return RuleVerdict::fail("no rule defined"),
        };

        let payload = match RulePayload::from_value(raw) {
            Ok(payload) => payload,
            Err(err) => {
                return RuleVerdict::fail(format!("invalid rule definition: {err}"))
                    .with_detail("error", err.to_string())
            }
        };

        let rule = match resolve(&question.field_type, &payload) {
            Ok(rule) => rule,
            Err(unresolved) => {
                let verdict = RuleVerdict::fail(unresolved.to_string());
                return match unresolved.tag {
                    Some(tag) => verdict.with_detail("rule_tag", tag),
                    None => verdict,
                };
            }
        };

        rule.validate(answer)
            .with_detail("rule_type", rule.kind().label())
            .with_detail("rule", rule_snapshot(raw))
            .with_detail("answer", answer.to_json())
    }
}

fn rule_snapshot(raw: &Value) -> Value {
    match raw {
        Value::String(text) => serde_json::from_str(text).unwrap_or_else(|_| raw.clone()),
        other => other.clone(),
    }
}

#[async_trait]
impl AnswerEvaluator for RuleEvaluator {
    async fn evaluate(&self, question: &Question, answer: &Answer) -> EvaluationResult {
        self.apply(question, answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::screening::domain::{FieldType, QuestionId};
    use serde_json::json;

    fn question(field_type: FieldType, rule: Option<Value>) -> Question {
        Question {
            id: QuestionId("q-rule".to_string()),
            text: "How many years of experience do you have?".to_string(),
            field_type,
            evaluation_method: Default::default(),
            rule,
            weight: 1.0,
            is_eliminatory: false,
            required: true,
            use_ai: false,
            ai_prompt: None,
            ai_criteria: None,
        }
    }

    #[test]
    fn missing_rule_fails_closed() {
        for rule in [None, Some(Value::Null)] {
            let result = RuleEvaluator.apply(&question(FieldType::Number, rule), &"4".into());
            assert_eq!(result.complies, Some(false));
            assert_eq!(result.score, 0.0);
            assert_eq!(result.reason, "no rule defined");
            assert_eq!(result.method_used, MethodUsed::FixedRule);
        }
    }

    #[test]
    fn malformed_rule_text_fails_closed() {
        let q = question(FieldType::Number, Some(json!("{\"operator\": \">=\"")));
        let result = RuleEvaluator.apply(&q, &"4".into());
        assert_eq!(result.complies, Some(false));
        assert!(result.reason.starts_with("invalid rule definition"));
        assert!(result.details.contains_key("error"));
    }

    #[test]
    fn unknown_tag_on_unknown_field_fails_closed() {
        let q = question(FieldType::parse("date"), Some(json!({ "tag": "calendar" })));
        let result = RuleEvaluator.apply(&q, &"2024-01-01".into());
        assert_eq!(result.complies, Some(false));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.reason, "unknown rule type");
    }

    #[test]
    fn successful_run_records_rule_context() {
        let q = question(
            FieldType::Number,
            Some(json!(r#"{"tag":"range","operator":">=","value":2}"#)),
        );
        let result = RuleEvaluator.apply(&q, &"3 years".into());
        assert_eq!(result.complies, Some(true));
        assert_eq!(result.details.get("rule_type"), Some(&json!("range")));
        assert_eq!(result.details.get("rule"), Some(&json!({"tag":"range","operator":">=","value":2})));
        assert_eq!(result.details.get("answer"), Some(&json!("3 years")));
    }
}

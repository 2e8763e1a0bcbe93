use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier wrapper for configured screening questions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub String);

/// Identifier wrapper for candidate screening sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Identifier wrapper for persisted evaluation records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Input widget a question is answered through. Unrecognized names are kept verbatim so the
/// resolver can fall back to the rule's own tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    ShortText,
    LongText,
    Number,
    YesNo,
    SingleChoice,
    MultiChoice,
    Email,
    Phone,
    Other(String),
}

impl FieldType {
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "text" => Self::Text,
            "shorttext" => Self::ShortText,
            "longtext" => Self::LongText,
            "number" | "numeric" => Self::Number,
            "yesno" | "boolean" => Self::YesNo,
            "singlechoice" => Self::SingleChoice,
            "multichoice" | "multiplechoice" => Self::MultiChoice,
            "email" => Self::Email,
            "phone" | "telephone" => Self::Phone,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::ShortText => "short_text",
            FieldType::LongText => "long_text",
            FieldType::Number => "number",
            FieldType::YesNo => "yes_no",
            FieldType::SingleChoice => "single_choice",
            FieldType::MultiChoice => "multi_choice",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Other(name) => name,
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldType::Text | FieldType::ShortText | FieldType::LongText
        )
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.label().to_string()
    }
}

/// Grading strategy configured on a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMethod {
    #[default]
    #[serde(alias = "fixedRule")]
    FixedRule,
    #[serde(alias = "aiOptional")]
    AiOptional,
    Manual,
}

impl EvaluationMethod {
    /// Resolve the configured method to the strategy that actually runs.
    pub fn effective(self, use_ai: bool) -> MethodUsed {
        match self {
            EvaluationMethod::FixedRule => MethodUsed::FixedRule,
            EvaluationMethod::AiOptional if use_ai => MethodUsed::Ai,
            EvaluationMethod::AiOptional => MethodUsed::FixedRule,
            EvaluationMethod::Manual => MethodUsed::Manual,
        }
    }
}

/// Strategy that produced an evaluation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodUsed {
    #[serde(alias = "fixedRule")]
    FixedRule,
    Ai,
    Manual,
}

impl MethodUsed {
    pub const fn label(self) -> &'static str {
        match self {
            MethodUsed::FixedRule => "fixed_rule",
            MethodUsed::Ai => "ai",
            MethodUsed::Manual => "manual",
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

/// Screening question as configured by recruiters. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub evaluation_method: EvaluationMethod,
    /// Rule payload exactly as stored upstream: a JSON object, JSON text, or null.
    #[serde(default)]
    pub rule: Option<Value>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub is_eliminatory: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub use_ai: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_criteria: Option<Value>,
}

impl Question {
    pub fn effective_method(&self) -> MethodUsed {
        self.evaluation_method.effective(self.use_ai)
    }

    /// A stored `null` counts as no rule.
    pub fn has_rule(&self) -> bool {
        matches!(&self.rule, Some(rule) if !rule.is_null())
    }

    /// Verify the caller honoured the question contract. Failures here are caller bugs, not
    /// candidate input, and are never folded into an evaluation result.
    pub fn check_contract(&self) -> Result<(), QuestionContractError> {
        if self.id.0.trim().is_empty() {
            return Err(QuestionContractError::MissingId);
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(QuestionContractError::InvalidWeight {
                question_id: self.id.clone(),
                weight: self.weight,
            });
        }
        Ok(())
    }
}

/// Programmer errors on the question contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuestionContractError {
    #[error("question is missing its identifier")]
    MissingId,
    #[error("question {question_id} has invalid weight {weight}; weights must be finite and >= 0")]
    InvalidWeight { question_id: QuestionId, weight: f64 },
}

/// Candidate answer: free text or the list of selected options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, from = "RawAnswer")]
pub enum Answer {
    Text(String),
    Selections(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAnswer {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    Selections(Vec<Value>),
}

impl From<RawAnswer> for Answer {
    fn from(value: RawAnswer) -> Self {
        match value {
            RawAnswer::Text(text) => Answer::Text(text),
            RawAnswer::Number(number) => Answer::Text(number.to_string()),
            RawAnswer::Flag(flag) => Answer::Text(flag.to_string()),
            RawAnswer::Selections(items) => Answer::Selections(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(text) => text,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
        }
    }
}

impl Answer {
    /// Single text view of the answer; selections are joined with `", "`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Answer::Text(text) => Cow::Borrowed(text),
            Answer::Selections(items) => Cow::Owned(items.join(", ")),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Answer::Text(text) => Value::String(text.clone()),
            Answer::Selections(items) => Value::from(items.clone()),
        }
    }

    pub fn selections(&self) -> Vec<&str> {
        match self {
            Answer::Text(text) => vec![text.as_str()],
            Answer::Selections(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Answer::Text(value.to_string())
    }
}

impl From<String> for Answer {
    fn from(value: String) -> Self {
        Answer::Text(value)
    }
}

impl From<Vec<&str>> for Answer {
    fn from(value: Vec<&str>) -> Self {
        Answer::Selections(value.into_iter().map(str::to_string).collect())
    }
}

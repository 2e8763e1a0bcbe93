use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::super::domain::FieldType;

/// Loosely shaped rule payload as stored upstream. Every field is optional because the
/// resolver decides which ones matter from the question's field type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulePayload {
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, alias = "validOptions", skip_serializing_if = "Option::is_none")]
    pub valid_options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(
        default,
        alias = "correct_answer",
        alias = "correctAnswer",
        skip_serializing_if = "Option::is_none"
    )]
    pub expected: Option<Value>,
    #[serde(default, alias = "requiredValues", skip_serializing_if = "Option::is_none")]
    pub required_values: Option<Vec<String>>,
}

/// Reasons a stored rule could not be read at all.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleParseError {
    #[error("rule text is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("rule must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("rule fields have the wrong shape: {0}")]
    Shape(String),
}

impl RulePayload {
    /// Accept either an already parsed JSON object or the raw JSON text of one.
    pub fn from_value(raw: &Value) -> Result<Self, RuleParseError> {
        match raw {
            Value::String(text) => {
                let parsed: Value = serde_json::from_str(text)
                    .map_err(|err| RuleParseError::InvalidJson(err.to_string()))?;
                match parsed {
                    Value::Object(_) => Self::from_object(parsed),
                    other => Err(RuleParseError::NotAnObject(json_kind(&other))),
                }
            }
            Value::Object(_) => Self::from_object(raw.clone()),
            other => Err(RuleParseError::NotAnObject(json_kind(other))),
        }
    }

    fn from_object(value: Value) -> Result<Self, RuleParseError> {
        serde_json::from_value(value).map_err(|err| RuleParseError::Shape(err.to_string()))
    }

    pub fn has_keywords(&self) -> bool {
        self.keywords
            .as_ref()
            .map(|keywords| !keywords.is_empty())
            .unwrap_or(false)
    }

    pub fn declared_kind(&self) -> Option<RuleKind> {
        self.tag.as_deref().and_then(RuleKind::from_tag)
    }

    fn numeric_value(&self) -> Option<f64> {
        match self.value.as_ref()? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Validator families a rule can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Range,
    Keyword,
    Options,
    Format,
    Length,
    Equals,
    Contains,
}

impl RuleKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "range" | "number" => Some(Self::Range),
            "keyword" | "keywords" => Some(Self::Keyword),
            "option" | "options" => Some(Self::Options),
            "format" => Some(Self::Format),
            "length" => Some(Self::Length),
            "equals" | "equal" | "equal_to" | "equality" => Some(Self::Equals),
            "contains" => Some(Self::Contains),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RuleKind::Range => "range",
            RuleKind::Keyword => "keyword",
            RuleKind::Options => "option",
            RuleKind::Format => "format",
            RuleKind::Length => "length",
            RuleKind::Equals => "equals",
            RuleKind::Contains => "contains",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonOperator {
    GreaterOrEqual,
    Greater,
    LessOrEqual,
    Less,
    Equal,
    Unsupported(String),
}

impl ComparisonOperator {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            ">=" => Self::GreaterOrEqual,
            ">" => Self::Greater,
            "<=" => Self::LessOrEqual,
            "<" => Self::Less,
            "==" | "=" => Self::Equal,
            other => Self::Unsupported(other.to_string()),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::Greater => ">",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::Less => "<",
            ComparisonOperator::Equal => "==",
            ComparisonOperator::Unsupported(raw) => raw,
        }
    }

    /// `None` for operators the range validator does not understand.
    pub fn compare(&self, lhs: f64, rhs: f64) -> Option<bool> {
        match self {
            ComparisonOperator::GreaterOrEqual => Some(lhs >= rhs),
            ComparisonOperator::Greater => Some(lhs > rhs),
            ComparisonOperator::LessOrEqual => Some(lhs <= rhs),
            ComparisonOperator::Less => Some(lhs < rhs),
            ComparisonOperator::Equal => Some(lhs == rhs),
            ComparisonOperator::Unsupported(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RangeBounds {
    Compare {
        operator: ComparisonOperator,
        value: f64,
    },
    Between {
        min: f64,
        max: f64,
    },
    AtLeast(f64),
    AtMost(f64),
    Unspecified,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeRule {
    pub bounds: RangeBounds,
}

impl RangeRule {
    fn from_payload(payload: &RulePayload) -> Self {
        let comparison = payload
            .operator
            .as_deref()
            .zip(payload.numeric_value())
            .map(|(operator, value)| RangeBounds::Compare {
                operator: ComparisonOperator::parse(operator),
                value,
            });

        let bounds = comparison.unwrap_or(match (payload.min, payload.max) {
            (Some(min), Some(max)) => RangeBounds::Between { min, max },
            (Some(min), None) => RangeBounds::AtLeast(min),
            (None, Some(max)) => RangeBounds::AtMost(max),
            (None, None) => RangeBounds::Unspecified,
        });

        Self { bounds }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeywordMode {
    #[default]
    Any,
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRule {
    pub keywords: Vec<String>,
    pub mode: KeywordMode,
}

impl KeywordRule {
    fn from_payload(payload: &RulePayload) -> Self {
        let mode = match payload.mode.as_deref().map(str::trim) {
            Some(mode) if mode.eq_ignore_ascii_case("all") => KeywordMode::All,
            _ => KeywordMode::Any,
        };
        Self {
            keywords: payload.keywords.clone().unwrap_or_default(),
            mode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Single,
    Multiple,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionRule {
    pub valid_options: Vec<String>,
    pub kind: SelectionKind,
}

impl OptionRule {
    fn from_payload(payload: &RulePayload, field_type: &FieldType) -> Self {
        let declared = payload
            .kind
            .as_deref()
            .map(|kind| kind.trim().to_ascii_lowercase());
        let kind = match declared.as_deref() {
            Some("multiple" | "multi") => SelectionKind::Multiple,
            Some("single" | "unique") => SelectionKind::Single,
            _ if *field_type == FieldType::MultiChoice => SelectionKind::Multiple,
            _ => SelectionKind::Single,
        };
        Self {
            valid_options: payload.valid_options.clone().unwrap_or_default(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatRule {
    pub format: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LengthRule {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EqualsRule {
    pub expected: Option<String>,
}

impl EqualsRule {
    fn from_payload(payload: &RulePayload) -> Self {
        let expected = payload
            .expected
            .as_ref()
            .and_then(text_of)
            .or_else(|| payload.value.as_ref().and_then(text_of));
        Self { expected }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainsRule {
    pub required_values: Vec<String>,
}

/// A rule narrowed to exactly one validator family.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Range(RangeRule),
    Keyword(KeywordRule),
    Options(OptionRule),
    Format(FormatRule),
    Length(LengthRule),
    Equals(EqualsRule),
    Contains(ContainsRule),
}

impl Rule {
    /// Project the loose payload onto the fields `kind` reads.
    pub fn build(kind: RuleKind, payload: &RulePayload, field_type: &FieldType) -> Self {
        match kind {
            RuleKind::Range => Rule::Range(RangeRule::from_payload(payload)),
            RuleKind::Keyword => Rule::Keyword(KeywordRule::from_payload(payload)),
            RuleKind::Options => Rule::Options(OptionRule::from_payload(payload, field_type)),
            RuleKind::Format => Rule::Format(FormatRule {
                format: payload.format.clone().unwrap_or_default(),
            }),
            RuleKind::Length => Rule::Length(LengthRule {
                min: payload.min,
                max: payload.max,
            }),
            RuleKind::Equals => Rule::Equals(EqualsRule::from_payload(payload)),
            RuleKind::Contains => Rule::Contains(ContainsRule {
                required_values: payload.required_values.clone().unwrap_or_default(),
            }),
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Range(_) => RuleKind::Range,
            Rule::Keyword(_) => RuleKind::Keyword,
            Rule::Options(_) => RuleKind::Options,
            Rule::Format(_) => RuleKind::Format,
            Rule::Length(_) => RuleKind::Length,
            Rule::Equals(_) => RuleKind::Equals,
            Rule::Contains(_) => RuleKind::Contains,
        }
    }
}

/// Authoring-time lint result for a rule definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleCheck {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Lint a stored rule the way the question editor does before saving it.
pub fn check_definition(raw: &Value) -> RuleCheck {
    let payload = match RulePayload::from_value(raw) {
        Ok(payload) => payload,
        Err(err) => {
            return RuleCheck {
                valid: false,
                errors: vec![err.to_string()],
            }
        }
    };

    let mut errors = Vec::new();
    match payload.tag.as_deref() {
        None => errors.push("rule must declare a type tag".to_string()),
        Some(tag) => match RuleKind::from_tag(tag) {
            None => errors.push(format!("unknown rule type: {tag}")),
            Some(RuleKind::Range) => {
                let comparison = payload.operator.is_some() && payload.value.is_some();
                let bounded = payload.min.is_some() && payload.max.is_some();
                if !comparison && !bounded {
                    errors.push(
                        "range rule needs an operator with a value, or both min and max"
                            .to_string(),
                    );
                }
            }
            Some(RuleKind::Keyword) if payload.keywords.is_none() => {
                errors.push("keyword rule needs a keywords array".to_string())
            }
            Some(RuleKind::Options) if payload.valid_options.is_none() => {
                errors.push("option rule needs valid_options".to_string())
            }
            Some(RuleKind::Format) if payload.format.is_none() => {
                errors.push("format rule must name its format".to_string())
            }
            Some(_) => {}
        },
    }

    RuleCheck {
        valid: errors.is_empty(),
        errors,
    }
}

use super::super::domain::FieldType;
use super::rules::{FormatRule, Rule, RuleKind, RulePayload};

/// The payload named no validator the engine knows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rule type")]
pub struct UnresolvedRule {
    pub tag: Option<String>,
}

/// Pick the validator for a question. The field type wins over the payload's own tag so
/// payloads with a stale or missing tag still resolve.
pub fn resolve(field_type: &FieldType, payload: &RulePayload) -> Result<Rule, UnresolvedRule> {
    let kind = match field_type {
        FieldType::Number => RuleKind::Range,
        FieldType::YesNo => RuleKind::Equals,
        FieldType::Text | FieldType::ShortText | FieldType::LongText => {
            if payload.has_keywords() {
                RuleKind::Keyword
            } else {
                RuleKind::Length
            }
        }
        FieldType::SingleChoice | FieldType::MultiChoice => RuleKind::Options,
        FieldType::Email => return Ok(forced_format("email")),
        FieldType::Phone => return Ok(forced_format("phone")),
        FieldType::Other(_) => payload.declared_kind().ok_or_else(|| UnresolvedRule {
            tag: payload.tag.clone(),
        })?,
    };

    Ok(Rule::build(kind, payload, field_type))
}

fn forced_format(format: &str) -> Rule {
    Rule::Format(FormatRule {
        format: format.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(raw: serde_json::Value) -> RulePayload {
        RulePayload::from_value(&raw).expect("payload parses")
    }

    #[test]
    fn field_type_overrides_mismatched_tag() {
        let rule = resolve(
            &FieldType::Number,
            &payload(json!({ "tag": "keyword", "operator": ">=", "value": 2 })),
        )
        .expect("number resolves");
        assert_eq!(rule.kind(), RuleKind::Range);
    }

    #[test]
    fn text_uses_keywords_only_when_present() {
        let with_keywords = payload(json!({ "keywords": ["rust"] }));
        let without = payload(json!({ "keywords": [], "min": 10 }));

        assert_eq!(
            resolve(&FieldType::LongText, &with_keywords).map(|r| r.kind()),
            Ok(RuleKind::Keyword)
        );
        assert_eq!(
            resolve(&FieldType::Text, &without).map(|r| r.kind()),
            Ok(RuleKind::Length)
        );
    }

    #[test]
    fn contact_fields_force_their_own_format() {
        let stated = payload(json!({ "tag": "format", "format": "url" }));
        match resolve(&FieldType::Email, &stated) {
            Ok(Rule::Format(rule)) => assert_eq!(rule.format, "email"),
            other => panic!("expected forced email format, got {other:?}"),
        }
        match resolve(&FieldType::Phone, &RulePayload::default()) {
            Ok(Rule::Format(rule)) => assert_eq!(rule.format, "phone"),
            other => panic!("expected forced phone format, got {other:?}"),
        }
    }

    #[test]
    fn unknown_field_type_falls_back_to_tag() {
        let field = FieldType::parse("date");
        assert_eq!(
            resolve(&field, &payload(json!({ "type": "contains", "requiredValues": ["x"] })))
                .map(|r| r.kind()),
            Ok(RuleKind::Contains)
        );

        let err = resolve(&field, &payload(json!({ "tag": "regex" }))).unwrap_err();
        assert_eq!(err.to_string(), "unknown rule type");
        assert_eq!(err.tag.as_deref(), Some("regex"));
    }
}

use serde_json::Value;

use super::super::super::domain::Answer;
use super::super::rules::ContainsRule;
use super::super::RuleVerdict;
use super::{ratio_score, Validate};

impl Validate for ContainsRule {
    fn validate(&self, answer: &Answer) -> RuleVerdict {
        if self.required_values.is_empty() {
            return RuleVerdict::fail("no required values specified");
        }

        let haystacks: Vec<String> = answer
            .selections()
            .into_iter()
            .map(str::to_lowercase)
            .collect();
        let (found, missing): (Vec<&String>, Vec<&String>) =
            self.required_values.iter().partition(|required| {
                let needle = required.to_lowercase();
                haystacks.iter().any(|haystack| haystack.contains(&needle))
            });

        let total = self.required_values.len();
        let complies = missing.is_empty();
        let reason = if complies {
            "all required values present".to_string()
        } else {
            format!(
                "missing required values: {}",
                missing
                    .iter()
                    .map(|value| value.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        };

        RuleVerdict::scored(complies, ratio_score(found.len(), total), reason)
            .with_detail(
                "found",
                Value::from(found.iter().map(|v| v.as_str()).collect::<Vec<_>>()),
            )
            .with_detail("total", total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(values: &[&str]) -> ContainsRule {
        ContainsRule {
            required_values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn every_value_must_appear() {
        let rule = rule(&["docker", "kubernetes"]);
        let verdict = rule.validate(&Answer::from("Docker and Kubernetes in prod"));
        assert!(verdict.complies);
        assert_eq!(verdict.score, 100.0);
    }

    #[test]
    fn partial_match_earns_partial_credit() {
        let rule = rule(&["docker", "kubernetes", "terraform"]);
        let verdict = rule.validate(&Answer::from(vec!["Docker", "Terraform Cloud"]));
        assert!(!verdict.complies);
        assert_eq!(verdict.score, 67.0);
        assert!(verdict.reason.contains("kubernetes"));
    }

    #[test]
    fn empty_requirement_list_fails() {
        let verdict = rule(&[]).validate(&Answer::from("anything"));
        assert!(!verdict.complies);
        assert_eq!(verdict.reason, "no required values specified");
    }
}

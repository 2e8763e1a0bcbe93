use serde_json::Value;

use super::super::super::domain::Answer;
use super::super::rules::{OptionRule, SelectionKind};
use super::super::RuleVerdict;
use super::{ratio_score, Validate};

impl Validate for OptionRule {
    fn validate(&self, answer: &Answer) -> RuleVerdict {
        if self.valid_options.is_empty() {
            return RuleVerdict::fail("no valid options specified");
        }

        let valid: Vec<String> = self
            .valid_options
            .iter()
            .map(|option| option.trim().to_lowercase())
            .collect();
        let selected: Vec<String> = answer
            .selections()
            .into_iter()
            .map(|choice| choice.trim().to_lowercase())
            .filter(|choice| !choice.is_empty())
            .collect();

        match self.kind {
            SelectionKind::Single => {
                let complies = selected.len() == 1 && valid.contains(&selected[0]);
                if complies {
                    RuleVerdict::pass(format!("option '{}' is valid", selected[0]))
                } else {
                    RuleVerdict::fail(format!(
                        "option '{}' is not valid; expected one of: {}",
                        selected.join(", "),
                        self.valid_options.join(", ")
                    ))
                }
            }
            SelectionKind::Multiple => {
                if selected.is_empty() {
                    return RuleVerdict::fail("no option selected").with_detail("total", 0);
                }
                let accepted: Vec<&String> = selected
                    .iter()
                    .filter(|choice| valid.contains(choice))
                    .collect();
                let complies = !accepted.is_empty();
                let reason = if complies {
                    format!("{} of {} options are valid", accepted.len(), selected.len())
                } else {
                    "no valid option selected".to_string()
                };

                RuleVerdict::scored(complies, ratio_score(accepted.len(), selected.len()), reason)
                    .with_detail(
                        "valid",
                        Value::from(accepted.iter().map(|c| c.as_str()).collect::<Vec<_>>()),
                    )
                    .with_detail("total", selected.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(options: &[&str], kind: SelectionKind) -> OptionRule {
        OptionRule {
            valid_options: options.iter().map(|o| o.to_string()).collect(),
            kind,
        }
    }

    #[test]
    fn single_requires_one_valid_choice() {
        let rule = rule(&["Remote", "Hybrid"], SelectionKind::Single);
        assert!(rule.validate(&Answer::from("remote")).complies);
        assert!(!rule.validate(&Answer::from("On-site")).complies);
        assert!(!rule.validate(&Answer::from(vec!["remote", "hybrid"])).complies);
    }

    #[test]
    fn multiple_scores_by_selected_count() {
        let rule = rule(&["rust", "go", "kotlin"], SelectionKind::Multiple);

        let verdict = rule.validate(&Answer::from(vec!["Rust", "PHP", "Go"]));
        assert!(verdict.complies);
        assert_eq!(verdict.score, 67.0);
        assert_eq!(verdict.details.get("total"), Some(&Value::from(3)));

        let verdict = rule.validate(&Answer::from(vec!["PHP"]));
        assert!(!verdict.complies);
        assert_eq!(verdict.score, 0.0);
    }

    #[test]
    fn over_selecting_valid_options_keeps_full_credit() {
        let rule = rule(&["a", "b", "c", "d"], SelectionKind::Multiple);
        let verdict = rule.validate(&Answer::from(vec!["a"]));
        assert_eq!(verdict.score, 100.0);
    }
}

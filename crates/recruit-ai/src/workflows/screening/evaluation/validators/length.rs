use super::super::super::domain::Answer;
use super::super::rules::LengthRule;
use super::super::RuleVerdict;
use super::Validate;

const OVER_MAX_SCORE: f64 = 50.0;

impl Validate for LengthRule {
    fn validate(&self, answer: &Answer) -> RuleVerdict {
        let length = answer.as_text().chars().count();
        let chars = length as f64;

        let verdict = match (self.min, self.max) {
            (Some(min), _) if chars < min => RuleVerdict::scored(
                false,
                if min > 0.0 { chars / min * 100.0 } else { 0.0 },
                format!("answer is too short ({length} characters, minimum {min})"),
            ),
            (_, Some(max)) if chars > max => RuleVerdict::scored(
                false,
                OVER_MAX_SCORE,
                format!("answer is too long ({length} characters, maximum {max})"),
            ),
            _ => RuleVerdict::pass(format!("answer length is acceptable ({length} characters)")),
        };

        verdict.with_detail("length", length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(min: Option<f64>, max: Option<f64>) -> LengthRule {
        LengthRule { min, max }
    }

    #[test]
    fn under_minimum_earns_proportional_credit() {
        let verdict = rule(Some(20.0), None).validate(&Answer::from("too short"));
        assert!(!verdict.complies);
        assert_eq!(verdict.score, 45.0);
    }

    #[test]
    fn over_maximum_earns_flat_half_credit() {
        let verdict = rule(None, Some(5.0)).validate(&Answer::from("far beyond five characters"));
        assert!(!verdict.complies);
        assert_eq!(verdict.score, 50.0);
    }

    #[test]
    fn within_bounds_passes() {
        let verdict = rule(Some(3.0), Some(40.0)).validate(&Answer::from("I enjoy backend work"));
        assert!(verdict.complies);
        assert_eq!(verdict.score, 100.0);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let verdict = rule(Some(4.0), Some(4.0)).validate(&Answer::from("café"));
        assert!(verdict.complies);
    }

    #[test]
    fn surrounding_whitespace_counts_toward_length() {
        let verdict = rule(Some(10.0), None).validate(&Answer::from("   rust   "));
        assert!(verdict.complies);
        assert_eq!(verdict.details["length"], 10);

        let verdict = rule(None, Some(4.0)).validate(&Answer::from(" rust "));
        assert!(!verdict.complies);
        assert_eq!(verdict.score, 50.0);
    }

    #[test]
    fn unbounded_rule_accepts_anything() {
        assert!(rule(None, None).validate(&Answer::from("")).complies);
    }
}

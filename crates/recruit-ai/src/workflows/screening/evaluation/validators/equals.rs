use super::super::super::domain::Answer;
use super::super::rules::EqualsRule;
use super::super::RuleVerdict;
use super::Validate;

impl Validate for EqualsRule {
    fn validate(&self, answer: &Answer) -> RuleVerdict {
        let Some(expected) = self.expected.as_deref() else {
            return RuleVerdict::fail("no expected value specified");
        };

        let given = answer.as_text();
        if given.trim().to_lowercase() == expected.trim().to_lowercase() {
            RuleVerdict::pass(format!("answer matches '{expected}'"))
        } else {
            RuleVerdict::fail(format!("expected '{expected}', got '{}'", given.trim()))
        }
    }
}

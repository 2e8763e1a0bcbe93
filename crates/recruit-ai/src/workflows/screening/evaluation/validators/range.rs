use std::sync::LazyLock;

use regex::Regex;

use super::super::super::domain::Answer;
use super::super::rules::{RangeBounds, RangeRule};
use super::super::RuleVerdict;
use super::Validate;

// Leading numeric prefix, so "3 years" reads as 3.
static NUMBER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number pattern")
});

pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let matched = NUMBER_PREFIX.find(raw.trim_start())?;
    matched.as_str().parse::<f64>().ok().filter(|n| n.is_finite())
}

impl Validate for RangeRule {
    fn validate(&self, answer: &Answer) -> RuleVerdict {
        let text = answer.as_text();
        let Some(number) = parse_number(&text) else {
            return RuleVerdict::fail(format!("answer '{text}' is not a valid number"));
        };

        let verdict = match &self.bounds {
            RangeBounds::Compare { operator, value } => match operator.compare(number, *value) {
                Some(true) => {
                    RuleVerdict::pass(format!("{number} satisfies {} {value}", operator.symbol()))
                }
                Some(false) => RuleVerdict::fail(format!(
                    "{number} does not satisfy {} {value}",
                    operator.symbol()
                )),
                None => RuleVerdict::fail(format!(
                    "unsupported operator '{}'",
                    operator.symbol()
                )),
            },
            RangeBounds::Between { min, max } => {
                if number >= *min && number <= *max {
                    RuleVerdict::pass(format!("{number} is within [{min}, {max}]"))
                } else {
                    RuleVerdict::fail(format!("{number} is outside [{min}, {max}]"))
                }
            }
            RangeBounds::AtLeast(min) => {
                if number >= *min {
                    RuleVerdict::pass(format!("{number} is at least {min}"))
                } else {
                    RuleVerdict::fail(format!("{number} is below {min}"))
                }
            }
            RangeBounds::AtMost(max) => {
                if number <= *max {
                    RuleVerdict::pass(format!("{number} is at most {max}"))
                } else {
                    RuleVerdict::fail(format!("{number} is above {max}"))
                }
            }
            RangeBounds::Unspecified => RuleVerdict::fail("invalid range rule: no bounds"),
        };

        verdict.with_detail("parsed_value", number)
    }
}

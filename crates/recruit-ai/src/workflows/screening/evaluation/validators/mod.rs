//! Stateless validators, one per rule family.
//!
//! Every validator judges a single answer against a single rule shape and reports a
//! [`RuleVerdict`]. Partial credit is rounded to the nearest integer here; weighting and
//! two-decimal rounding happen later in the scoring aggregator.

mod contains;
mod equals;
mod format;
mod keyword;
mod length;
mod option;
mod range;

use super::super::domain::Answer;
use super::rules::Rule;
use super::RuleVerdict;

/// Judge an answer against one rule shape.
pub trait Validate {
    fn validate(&self, answer: &Answer) -> RuleVerdict;
}

impl Validate for Rule {
    fn validate(&self, answer: &Answer) -> RuleVerdict {
        match self {
            Rule::Range(rule) => rule.validate(answer),
            Rule::Keyword(rule) => rule.validate(answer),
            Rule::Options(rule) => rule.validate(answer),
            Rule::Format(rule) => rule.validate(answer),
            Rule::Length(rule) => rule.validate(answer),
            Rule::Equals(rule) => rule.validate(answer),
            Rule::Contains(rule) => rule.validate(answer),
        }
    }
}

/// `found / total` as a 0-100 percentage; zero when there is nothing to find.
pub(crate) fn ratio_score(found: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    found as f64 / total as f64 * 100.0
}

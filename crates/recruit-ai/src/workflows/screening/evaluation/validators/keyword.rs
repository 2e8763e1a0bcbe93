use serde_json::Value;

use super::super::super::domain::Answer;
use super::super::rules::{KeywordMode, KeywordRule};
use super::super::RuleVerdict;
use super::{ratio_score, Validate};

impl Validate for KeywordRule {
    fn validate(&self, answer: &Answer) -> RuleVerdict {
        if self.keywords.is_empty() {
            return RuleVerdict::fail("no keywords specified");
        }

        let haystack = answer.as_text().to_lowercase();
        let (found, missing): (Vec<&String>, Vec<&String>) = self
            .keywords
            .iter()
            .partition(|keyword| haystack.contains(&keyword.to_lowercase()));

        let total = self.keywords.len();
        let (complies, score) = match self.mode {
            KeywordMode::All => {
                let complete = missing.is_empty();
                (complete, if complete { 100.0 } else { 0.0 })
            }
            KeywordMode::Any => (!found.is_empty(), ratio_score(found.len(), total)),
        };

        let reason = if missing.is_empty() {
            format!("keywords found: {}", join(&found))
        } else if complies {
            format!(
                "keywords found: {}; missing: {}",
                join(&found),
                join(&missing)
            )
        } else {
            format!("missing keywords: {}", join(&missing))
        };

        RuleVerdict::scored(complies, score, reason)
            .with_detail(
                "found",
                Value::from(found.iter().map(|k| k.as_str()).collect::<Vec<_>>()),
            )
            .with_detail("total", total)
    }
}

fn join(keywords: &[&String]) -> String {
    keywords
        .iter()
        .map(|keyword| keyword.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

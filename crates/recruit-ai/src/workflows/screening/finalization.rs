use serde::{Deserialize, Serialize};

use super::evaluation::EvaluationResult;

/// Whether a session's results may become its authoritative verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizationCheck {
    pub allowed: bool,
    pub pending_count: usize,
    pub total: usize,
    pub reason: String,
}

/// Refuse finalization while any result awaits manual review, or when there are none.
pub fn can_finalize<'a, I>(results: I) -> FinalizationCheck
where
    I: IntoIterator<Item = &'a EvaluationResult>,
{
    let (total, pending_count) = results.into_iter().fold((0, 0), |(total, pending), result| {
        (total + 1, pending + usize::from(result.is_pending()))
    });

    let (allowed, reason) = if total == 0 {
        (false, "no evaluations recorded".to_string())
    } else if pending_count > 0 {
        (
            false,
            format!("{pending_count} evaluation(s) awaiting manual review"),
        )
    } else {
        (true, format!("all {total} evaluation(s) are final"))
    };

    FinalizationCheck {
        allowed,
        pending_count,
        total,
        reason,
    }
}

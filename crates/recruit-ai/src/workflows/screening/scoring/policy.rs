use serde::{Deserialize, Serialize};

/// Three-way hiring classification, plus `Pending` while the verdict cannot be trusted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    Approved,
    Review,
    Rejected,
    Pending,
}

impl SessionOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            SessionOutcome::Approved => "approved",
            SessionOutcome::Review => "review",
            SessionOutcome::Rejected => "rejected",
            SessionOutcome::Pending => "pending",
        }
    }
}

/// Order matters: eliminatory failures override the percentage entirely.
pub(crate) fn classify(
    percentage: f64,
    threshold: f64,
    eliminatory_failures: usize,
    failed: usize,
) -> (SessionOutcome, String) {
    if eliminatory_failures > 0 {
        return (
            SessionOutcome::Rejected,
            "failed one or more eliminatory questions".to_string(),
        );
    }

    if failed == 0 {
        (
            SessionOutcome::Approved,
            format!("approved: answered every question correctly ({percentage}%)"),
        )
    } else if percentage >= threshold {
        (
            SessionOutcome::Review,
            format!(
                "for review: reached {percentage}% but failed {failed} non-eliminatory question(s)"
            ),
        )
    } else {
        (
            SessionOutcome::Rejected,
            format!("rejected: scored {percentage}% (required threshold: {threshold}%)"),
        )
    }
}

use serde::{Deserialize, Serialize};

use super::super::domain::MethodUsed;
use super::super::evaluation::EvaluationResult;
use super::round2;

/// Pass/fail counters attached to every verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerdictStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub pass_percentage: f64,
}

impl VerdictStats {
    pub fn collect<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a EvaluationResult>,
    {
        let (mut total, mut passed, mut failed, mut pending) = (0, 0, 0, 0);
        for result in results {
            total += 1;
            match result.complies {
                Some(true) => passed += 1,
                Some(false) => failed += 1,
                None => pending += 1,
            }
        }

        let pass_percentage = if total == 0 {
            0.0
        } else {
            (passed as f64 / total as f64 * 100.0).round()
        };

        Self {
            total,
            passed,
            failed,
            pending,
            pass_percentage,
        }
    }
}

/// Flat score overview for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub total_score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodStats {
    pub count: usize,
    pub average_score: f64,
}

/// Count and mean score per effective grading method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodDistribution {
    pub fixed_rule: MethodStats,
    pub ai: MethodStats,
    pub manual: MethodStats,
}

impl MethodDistribution {
    pub fn get(&self, method: MethodUsed) -> MethodStats {
        match method {
            MethodUsed::FixedRule => self.fixed_rule,
            MethodUsed::Ai => self.ai,
            MethodUsed::Manual => self.manual,
        }
    }

    fn slot(&mut self, method: MethodUsed) -> &mut MethodStats {
        match method {
            MethodUsed::FixedRule => &mut self.fixed_rule,
            MethodUsed::Ai => &mut self.ai,
            MethodUsed::Manual => &mut self.manual,
        }
    }
}

pub fn method_distribution<'a, I>(results: I) -> MethodDistribution
where
    I: IntoIterator<Item = &'a EvaluationResult>,
{
    let mut distribution = MethodDistribution::default();
    let mut sums = [0.0_f64; 3];

    for result in results {
        let slot = distribution.slot(result.method_used);
        slot.count += 1;
        sums[method_index(result.method_used)] += result.score;
    }

    for method in [MethodUsed::FixedRule, MethodUsed::Ai, MethodUsed::Manual] {
        let sum = sums[method_index(method)];
        let slot = distribution.slot(method);
        if slot.count > 0 {
            slot.average_score = round2(sum / slot.count as f64);
        }
    }

    distribution
}

fn method_index(method: MethodUsed) -> usize {
    match method {
        MethodUsed::FixedRule => 0,
        MethodUsed::Ai => 1,
        MethodUsed::Manual => 2,
    }
}

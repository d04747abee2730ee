use serde::{Deserialize, Serialize};

use crate::ledger::ViolationCounter;

use super::{compute_score, label_for, TrustLabel, MAX_SCORE};

/// Point-in-time copy of the ledger plus the derived score and label.
///
/// Serializes to the snapshot store layout:
/// `{"trustScore", "trustLabel", "violations": [{"type", "number", "negativeScore"}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustSnapshot {
    #[serde(rename = "trustScore")]
    pub score: f64,
    #[serde(rename = "trustLabel")]
    pub label: TrustLabel,
    pub violations: Vec<ViolationCounter>,
}

impl TrustSnapshot {
    pub fn from_counters(violations: Vec<ViolationCounter>) -> Self {
        let score = compute_score(&violations);
        Self {
            score,
            label: label_for(score),
            violations,
        }
    }

    pub fn count_of(&self, category: crate::violation::ViolationCategory) -> u64 {
        self.violations
            .iter()
            .filter(|v| v.category == category)
            .map(|v| v.count)
            .sum()
    }

    /// Rejects values no engine could have produced.
    pub fn check(&self) -> Result<(), String> {
        if !self.score.is_finite() || !(0.0..=MAX_SCORE).contains(&self.score) {
            return Err(format!("trustScore {} is outside [0, {MAX_SCORE}]", self.score));
        }
        if let Some(bad) = self
            .violations
            .iter()
            .find(|v| !v.weight.is_finite() || v.weight < 0.0)
        {
            return Err(format!(
                "negativeScore for {} must be a non-negative number",
                bad.category
            ));
        }
        Ok(())
    }
}

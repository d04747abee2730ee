//! Per-category violation counters.

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::violation::{ViolationCategory, WeightTable};

/// One row of the ledger; also the wire shape of a `violations` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationCounter {
    #[serde(rename = "type")]
    pub category: ViolationCategory,
    #[serde(rename = "number")]
    pub count: u64,
    #[serde(rename = "negativeScore")]
    pub weight: f64,
}

/// Cumulative counts, single writer. Counts only go up; [`reset`] is the
/// explicit session reset.
///
/// [`reset`]: ViolationLedger::reset
#[derive(Debug, Clone)]
pub struct ViolationLedger {
    counters: Vec<ViolationCounter>,
}

impl ViolationLedger {
    pub fn new(weights: &WeightTable) -> Self {
        let counters = ViolationCategory::ALL
            .into_iter()
            .map(|category| ViolationCounter {
                category,
                count: 0,
                weight: weights.weight(category),
            })
            .collect();
        Self { counters }
    }

    /// Adds one occurrence and returns the new count.
    pub fn increment(&mut self, category: ViolationCategory) -> Result<u64, EngineError> {
        let counter = self
            .counters
            .iter_mut()
            .find(|c| c.category == category)
            .ok_or_else(|| EngineError::UnknownCategory(category.label().to_string()))?;
        counter.count = counter.count.saturating_add(1);
        Ok(counter.count)
    }

    pub fn count(&self, category: ViolationCategory) -> u64 {
        self.counters
            .iter()
            .find(|c| c.category == category)
            .map_or(0, |c| c.count)
    }

    /// Owned copy of every counter in canonical order.
    pub fn snapshot(&self) -> Vec<ViolationCounter> {
        self.counters.clone()
    }

    /// Seeds counts from persisted rows. Weights stay as configured; rows for
    /// the same category are summed.
    pub fn restore<'a>(&mut self, rows: impl IntoIterator<Item = &'a ViolationCounter>) {
        for row in rows {
            if let Some(counter) = self.counters.iter_mut().find(|c| c.category == row.category) {
                counter.count = counter.count.saturating_add(row.count);
            }
        }
    }

    pub fn reset(&mut self) {
        for counter in &mut self.counters {
            counter.count = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_ledger_has_every_category_at_zero() {
        let ledger = ViolationLedger::new(&WeightTable::default());
        let rows = ledger.snapshot();
        assert_eq!(rows.len(), ViolationCategory::ALL.len());
        assert!(rows.iter().all(|r| r.count == 0));
        assert_eq!(
            rows.iter().map(|r| r.category).collect::<Vec<_>>(),
            ViolationCategory::ALL.to_vec()
        );
    }

    #[test]
    fn increments_are_monotonic() {
        let mut ledger = ViolationLedger::new(&WeightTable::default());
        let mut previous = 0;
        for _ in 0..5 {
            let now = ledger.increment(ViolationCategory::Speech).unwrap();
            assert!(now > previous);
            previous = now;
        }
        assert_eq!(ledger.count(ViolationCategory::Speech), 5);
        assert_eq!(ledger.count(ViolationCategory::CopyAction), 0);
    }

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let mut ledger = ViolationLedger::new(&WeightTable::default());
        ledger.increment(ViolationCategory::FaceMissing).unwrap();
        let before = ledger.snapshot();
        ledger.increment(ViolationCategory::FaceMissing).unwrap();
        assert_eq!(before[ViolationCategory::FaceMissing.index()].count, 1);
        assert_eq!(ledger.count(ViolationCategory::FaceMissing), 2);
    }

    #[test]
    fn restore_keeps_configured_weights() {
        let mut ledger = ViolationLedger::new(&WeightTable::default());
        let persisted = vec![ViolationCounter {
            category: ViolationCategory::FullscreenExit,
            count: 4,
            weight: 0.5,
        }];
        ledger.restore(&persisted);
        let row = &ledger.snapshot()[ViolationCategory::FullscreenExit.index()];
        assert_eq!(row.count, 4);
        assert_eq!(row.weight, 1.0);
    }

    #[test]
    fn reset_zeroes_counts() {
        let mut ledger = ViolationLedger::new(&WeightTable::default());
        ledger.increment(ViolationCategory::CopyAction).unwrap();
        ledger.reset();
        assert_eq!(ledger.count(ViolationCategory::CopyAction), 0);
    }

    #[test]
    fn wire_field_names() {
        let row = ViolationCounter {
            category: ViolationCategory::MouseOffScreen,
            count: 2,
            weight: 1.0,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "Mouse Off-Screen", "number": 2, "negativeScore": 1.0})
        );
    }
}

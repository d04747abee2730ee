//! Trust score calculator.
//!
//! `score = clamp(10 - Σ count·weight, 0, 10)`, banded into labels at 8 / 5 / 2.
//! Pure: the same counters always give the same score and label.

mod label;
mod snapshot;

pub use label::TrustLabel;
pub use snapshot::TrustSnapshot;

use crate::ledger::ViolationCounter;

pub const MAX_SCORE: f64 = 10.0;

const HIGH_TRUST_MIN: f64 = 8.0;
const MODERATE_TRUST_MIN: f64 = 5.0;
const LOW_TRUST_MIN: f64 = 2.0;

pub fn compute_score(counters: &[ViolationCounter]) -> f64 {
    let penalty: f64 = counters.iter().map(|c| c.count as f64 * c.weight).sum();
    (MAX_SCORE - penalty).clamp(0.0, MAX_SCORE)
}

pub fn label_for(score: f64) -> TrustLabel {
    if score >= HIGH_TRUST_MIN {
        TrustLabel::HighTrust
    } else if score >= MODERATE_TRUST_MIN {
        TrustLabel::ModerateTrust
    } else if score >= LOW_TRUST_MIN {
        TrustLabel::LowTrust
    } else {
        TrustLabel::VeryLowTrust
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::ViolationCategory;
    use pretty_assertions::assert_eq;

    fn row(category: ViolationCategory, count: u64, weight: f64) -> ViolationCounter {
        ViolationCounter {
            category,
            count,
            weight,
        }
    }

    #[test]
    fn no_violations_is_full_score() {
        assert_eq!(compute_score(&[]), 10.0);
        assert_eq!(label_for(10.0), TrustLabel::HighTrust);
    }

    #[test]
    fn weighted_sum_is_subtracted() {
        let rows = [
            row(ViolationCategory::FaceMissing, 1, 2.0),
            row(ViolationCategory::CopyAction, 1, 2.0),
            row(ViolationCategory::Speech, 0, 1.0),
        ];
        assert_eq!(compute_score(&rows), 6.0);
    }

    #[test]
    fn score_is_clamped_at_zero() {
        let rows = [row(ViolationCategory::MultipleFaces, 10, 3.0)];
        assert_eq!(compute_score(&rows), 0.0);
        assert_eq!(label_for(0.0), TrustLabel::VeryLowTrust);
    }

    #[test]
    fn label_boundaries_are_inclusive_from_below() {
        assert_eq!(label_for(8.0), TrustLabel::HighTrust);
        assert_eq!(label_for(7.999), TrustLabel::ModerateTrust);
        assert_eq!(label_for(5.0), TrustLabel::ModerateTrust);
        assert_eq!(label_for(4.999), TrustLabel::LowTrust);
        assert_eq!(label_for(2.0), TrustLabel::LowTrust);
        assert_eq!(label_for(1.999), TrustLabel::VeryLowTrust);
    }

    #[test]
    fn labels_round_trip_and_accept_medium_alias() {
        for label in [
            TrustLabel::HighTrust,
            TrustLabel::ModerateTrust,
            TrustLabel::LowTrust,
            TrustLabel::VeryLowTrust,
        ] {
            assert_eq!(label.as_str().parse::<TrustLabel>().unwrap(), label);
        }
        assert_eq!(
            "Medium Trust".parse::<TrustLabel>().unwrap(),
            TrustLabel::ModerateTrust
        );
        assert!("Suspicious".parse::<TrustLabel>().is_err());
    }

    #[test]
    fn snapshot_json_layout() {
        let snap = TrustSnapshot::from_counters(vec![row(ViolationCategory::Speech, 2, 1.0)]);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "trustScore": 8.0,
                "trustLabel": "High Trust",
                "violations": [{"type": "Speech", "number": 2, "negativeScore": 1.0}]
            })
        );
    }

    #[test]
    fn check_rejects_impossible_values() {
        let mut snap = TrustSnapshot::from_counters(vec![]);
        assert!(snap.check().is_ok());
        snap.score = 11.0;
        assert!(snap.check().is_err());
        snap.score = 5.0;
        snap.violations.push(row(ViolationCategory::Speech, 1, -1.0));
        assert!(snap.check().is_err());
    }
}

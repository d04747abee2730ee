use crate::classifier::SkipReason;
use crate::score::TrustSnapshot;
use crate::violation::ViolationCategory;

/// What happened to one sample or candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    /// Malformed sample, dropped before classification.
    Skipped(SkipReason),
    /// Well-formed sample that is not a violation.
    NoViolation,
    /// Candidate swallowed by the per-category debounce window.
    Suppressed(ViolationCategory),
    Accepted {
        category: ViolationCategory,
        count: u64,
        snapshot: TrustSnapshot,
    },
}

impl SampleOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SampleOutcome::Accepted { .. })
    }

    pub fn snapshot(&self) -> Option<&TrustSnapshot> {
        match self {
            SampleOutcome::Accepted { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }
}

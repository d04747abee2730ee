use chrono::{DateTime, Duration, Utc};

use crate::config::DebounceConfig;
use crate::violation::ViolationCategory;

/// Per-category re-fire filter.
///
/// A candidate of category `C` is accepted only when `now - last_accepted[C]`
/// is strictly greater than `window(C)`. Categories without a window are
/// always accepted.
#[derive(Debug, Clone)]
pub struct DebounceGate {
    windows: [Option<Duration>; 6],
    last_accepted: [Option<DateTime<Utc>>; 6],
}

impl DebounceGate {
    pub fn new(cfg: &DebounceConfig) -> Self {
        let mut windows = [None; 6];
        windows[ViolationCategory::FaceMissing.index()] =
            Some(Duration::milliseconds(cfg.face_missing_ms as i64));
        windows[ViolationCategory::MultipleFaces.index()] =
            Some(Duration::milliseconds(cfg.multiple_faces_ms as i64));
        Self {
            windows,
            last_accepted: [None; 6],
        }
    }

    pub fn window(&self, category: ViolationCategory) -> Option<Duration> {
        self.windows[category.index()]
    }

    pub fn accept(&mut self, category: ViolationCategory, now: DateTime<Utc>) -> bool {
        let i = category.index();
        if let (Some(window), Some(last)) = (self.windows[i], self.last_accepted[i]) {
            if now - last <= window {
                return false;
            }
        }
        self.last_accepted[i] = Some(now);
        true
    }

    pub fn last_accepted(&self, category: ViolationCategory) -> Option<DateTime<Utc>> {
        self.last_accepted[category.index()]
    }

    pub fn reset(&mut self) {
        self.last_accepted = [None; 6];
    }
}

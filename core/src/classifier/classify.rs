use chrono::{DateTime, Duration, Utc};

use crate::config::ClassifierConfig;
use crate::violation::ViolationCategory;

use super::sample::{Sample, SkipReason};

/// Maps raw samples to candidate violations.
///
/// The only state kept here is what the rules themselves need: when a face
/// was last seen (for the grace period) and whether speech / face absence is
/// already ongoing. No I/O.
#[derive(Debug, Clone)]
pub struct SignalClassifier {
    speech_threshold: f64,
    face_grace: Duration,
    speech_edge_triggered: bool,
    latch_face_missing: bool,

    last_face_seen: DateTime<Utc>,
    face_missing_reported: bool,
    speaking: bool,
}

impl SignalClassifier {
    /// `started_at` seeds the "last face seen" clock, so a camera that reports
    /// nothing but zeros from the start still needs the full grace period.
    pub fn new(cfg: &ClassifierConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            speech_threshold: cfg.speech_threshold,
            face_grace: Duration::milliseconds(cfg.face_grace_ms as i64),
            speech_edge_triggered: cfg.speech_edge_triggered,
            latch_face_missing: cfg.latch_face_missing,
            last_face_seen: started_at,
            face_missing_reported: false,
            speaking: false,
        }
    }

    pub fn classify(&mut self, sample: &Sample, now: DateTime<Utc>) -> Option<ViolationCategory> {
        self.try_classify(sample, now).ok().flatten()
    }

    pub fn try_classify(
        &mut self,
        sample: &Sample,
        now: DateTime<Utc>,
    ) -> Result<Option<ViolationCategory>, SkipReason> {
        sample.check()?;

        let category = match *sample {
            Sample::AudioLevel { level } => self.on_audio(level),
            Sample::FaceCount { count } => self.on_faces(count, now),
            Sample::FocusLost => Some(ViolationCategory::MouseOffScreen),
            Sample::Fullscreen { active: false } => Some(ViolationCategory::FullscreenExit),
            Sample::Fullscreen { active: true } => None,
            Sample::Copy | Sample::ContextMenu => Some(ViolationCategory::CopyAction),
        };
        Ok(category)
    }

    /// Called by the engine once a candidate made it past the debounce gate.
    pub fn confirm(&mut self, category: ViolationCategory) {
        if category == ViolationCategory::FaceMissing {
            self.face_missing_reported = true;
        }
    }

    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.last_face_seen = now;
        self.face_missing_reported = false;
        self.speaking = false;
    }

    fn on_audio(&mut self, level: f64) -> Option<ViolationCategory> {
        if level <= self.speech_threshold {
            self.speaking = false;
            return None;
        }
        let was_speaking = std::mem::replace(&mut self.speaking, true);
        if self.speech_edge_triggered && was_speaking {
            return None;
        }
        Some(ViolationCategory::Speech)
    }

    fn on_faces(&mut self, count: i64, now: DateTime<Utc>) -> Option<ViolationCategory> {
        if count >= 1 {
            self.last_face_seen = now;
            self.face_missing_reported = false;
            return (count > 1).then_some(ViolationCategory::MultipleFaces);
        }

        if now - self.last_face_seen < self.face_grace {
            return None;
        }
        if self.latch_face_missing && self.face_missing_reported {
            return None;
        }
        Some(ViolationCategory::FaceMissing)
    }
}

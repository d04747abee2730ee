use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::EngineError;

/// Closed set of proctoring violations.
///
/// `MouseOffScreen` covers every "focus left the proctoring window" signal
/// (blur and mouse-leave alike); it keeps the `Mouse Off-Screen` label so
/// existing readers of the snapshot file still match it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViolationCategory {
    Speech,
    MouseOffScreen,
    FullscreenExit,
    FaceMissing,
    CopyAction,
    MultipleFaces,
}

impl ViolationCategory {
    /// Canonical order used for snapshots and the persisted `violations` array.
    pub const ALL: [ViolationCategory; 6] = [
        ViolationCategory::Speech,
        ViolationCategory::MouseOffScreen,
        ViolationCategory::FullscreenExit,
        ViolationCategory::FaceMissing,
        ViolationCategory::CopyAction,
        ViolationCategory::MultipleFaces,
    ];

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Speech => "Speech",
            Self::MouseOffScreen => "Mouse Off-Screen",
            Self::FullscreenExit => "Fullscreen Exit",
            Self::FaceMissing => "Face Missing",
            Self::CopyAction => "Copy Action",
            Self::MultipleFaces => "Multiple Faces",
        }
    }

    /// Line written to the activity log when a violation is accepted.
    pub const fn log_message(&self) -> &'static str {
        match self {
            Self::Speech => "Speech detected",
            Self::MouseOffScreen => "Focus left the exam window",
            Self::FullscreenExit => "Fullscreen exit detected",
            Self::FaceMissing => "Face missing",
            Self::CopyAction => "Copy action detected",
            Self::MultipleFaces => "Multiple faces detected",
        }
    }

    pub(crate) const fn index(&self) -> usize {
        match self {
            Self::Speech => 0,
            Self::MouseOffScreen => 1,
            Self::FullscreenExit => 2,
            Self::FaceMissing => 3,
            Self::CopyAction => 4,
            Self::MultipleFaces => 5,
        }
    }
}

impl fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ViolationCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s.trim())
            .ok_or_else(|| EngineError::UnknownCategory(s.to_string()))
    }
}

impl Serialize for ViolationCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ViolationCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

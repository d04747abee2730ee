use serde::{Deserialize, Serialize};

/// One raw observation from a sample source.
///
/// Vendor-prefixed fullscreen change events all map to [`Sample::Fullscreen`];
/// blur and mouse-leave both map to [`Sample::FocusLost`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sample {
    AudioLevel { level: f64 },
    FaceCount { count: i64 },
    FocusLost,
    Fullscreen { active: bool },
    Copy,
    ContextMenu,
}

/// Why a sample was dropped without classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NonFiniteAudioLevel,
    NegativeAudioLevel,
    NegativeFaceCount,
}

impl Sample {
    pub(crate) fn check(&self) -> Result<(), SkipReason> {
        match *self {
            Sample::AudioLevel { level } if !level.is_finite() => {
                Err(SkipReason::NonFiniteAudioLevel)
            }
            Sample::AudioLevel { level } if level < 0.0 => Err(SkipReason::NegativeAudioLevel),
            Sample::FaceCount { count } if count < 0 => Err(SkipReason::NegativeFaceCount),
            _ => Ok(()),
        }
    }
}

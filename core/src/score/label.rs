use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustLabel {
    HighTrust,
    ModerateTrust,
    LowTrust,
    VeryLowTrust,
}

impl TrustLabel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HighTrust => "High Trust",
            Self::ModerateTrust => "Moderate Trust",
            Self::LowTrust => "Low Trust",
            Self::VeryLowTrust => "Very Low Trust",
        }
    }
}

impl fmt::Display for TrustLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrustLabel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "High Trust" => Ok(Self::HighTrust),
            // Older writers used "Medium Trust" for the same band.
            "Moderate Trust" | "Medium Trust" => Ok(Self::ModerateTrust),
            "Low Trust" => Ok(Self::LowTrust),
            "Very Low Trust" => Ok(Self::VeryLowTrust),
            other => Err(EngineError::UnknownLabel(other.to_string())),
        }
    }
}

impl Serialize for TrustLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TrustLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

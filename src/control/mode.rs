//! Motion synthesis modes

use serde::{Deserialize, Serialize};

/// How an integrated pixel delta is turned into sink calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MotionMode {
    /// One relative move per tick
    #[default]
    Direct,

    /// Absolute positions along a quadratic Bézier path
    Curved,

    /// Relative moves with a bounded remainder feedback term
    SmoothedAccelerating,
}

impl MotionMode {
    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Direct => "Linear accumulation, relative moves",
            Self::Curved => "Quadratic Bezier path, absolute repositioning",
            Self::SmoothedAccelerating => "Linear accumulation with capped feedback boost",
        }
    }

    /// Next mode in toggle order
    pub fn next(&self) -> Self {
        match self {
            Self::Direct => Self::Curved,
            Self::Curved => Self::SmoothedAccelerating,
            Self::SmoothedAccelerating => Self::Direct,
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Self::Direct => 0,
            Self::Curved => 1,
            Self::SmoothedAccelerating => 2,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Curved,
            2 => Self::SmoothedAccelerating,
            _ => Self::Direct,
        }
    }
}

impl std::fmt::Display for MotionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "Direct"),
            Self::Curved => write!(f, "Curved"),
            Self::SmoothedAccelerating => write!(f, "Smooth"),
        }
    }
}

impl std::str::FromStr for MotionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" | "linear" | "default" => Ok(Self::Direct),
            "curved" | "curve" | "bezier" => Ok(Self::Curved),
            "smooth" | "smoothed" | "smoothed_accelerating" | "accelerating" => {
                Ok(Self::SmoothedAccelerating)
            }
            _ => Err(format!("Unknown motion mode: {}", s)),
        }
    }
}

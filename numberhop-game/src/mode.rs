//! Arithmetic modes and the policy table that drives move validation.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::tracker::TrackerError;

/// Arithmetic schema in force for the current problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Addition,
    Subtraction,
    Commutative,
    Join,
    Separate,
    Compare,
    PartPartWhole,
}

/// Which way the marker must travel to reach the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Legal region is `current + amount <= target`.
    Increasing,
    /// Legal region is `current + amount >= target`.
    Decreasing,
}

/// Per-mode rules consulted by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModePolicy {
    pub direction: Direction,
    pub allows_overshoot: bool,
    pub supports_swap: bool,
}

impl Mode {
    pub const ALL: [Self; 7] = [
        Self::Addition,
        Self::Subtraction,
        Self::Commutative,
        Self::Join,
        Self::Separate,
        Self::Compare,
        Self::PartPartWhole,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Subtraction => "subtraction",
            Self::Commutative => "commutative",
            Self::Join => "join",
            Self::Separate => "separate",
            Self::Compare => "compare",
            Self::PartPartWhole => "part-part-whole",
        }
    }

    /// Whether problems in this mode are generated from a story template.
    #[must_use]
    pub const fn is_word_problem(self) -> bool {
        matches!(
            self,
            Self::Join | Self::Separate | Self::Compare | Self::PartPartWhole
        )
    }

    /// Built-in policy table. Overshoot overrides are layered on by
    /// [`crate::TrackerConfig::policy`].
    #[must_use]
    pub const fn base_policy(self) -> ModePolicy {
        match self {
            Self::Addition | Self::Join | Self::Compare | Self::PartPartWhole => ModePolicy {
                direction: Direction::Increasing,
                allows_overshoot: false,
                supports_swap: false,
            },
            Self::Subtraction | Self::Separate => ModePolicy {
                direction: Direction::Decreasing,
                allows_overshoot: false,
                supports_swap: false,
            },
            Self::Commutative => ModePolicy {
                direction: Direction::Increasing,
                allows_overshoot: false,
                supports_swap: true,
            },
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| TrackerError::InvalidMode {
                name: s.to_string(),
            })
    }
}

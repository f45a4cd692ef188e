//! Tunable generation ranges and overshoot overrides.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mode::{Mode, ModePolicy};

/// Inclusive integer range drawn from during problem generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandRange {
    pub min: i32,
    pub max: i32,
}

impl OperandRange {
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min < 0 {
            return Err(ConfigError::NegativeBound {
                field,
                value: self.min,
            });
        }
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Operand ranges for `addition` and `commutative`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionCfg {
    #[serde(default = "AdditionCfg::default_operand")]
    pub a: OperandRange,
    #[serde(default = "AdditionCfg::default_operand")]
    pub b: OperandRange,
}

impl AdditionCfg {
    const fn default_operand() -> OperandRange {
        OperandRange::new(10, 49)
    }
}

impl Default for AdditionCfg {
    fn default() -> Self {
        Self {
            a: Self::default_operand(),
            b: Self::default_operand(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtractionCfg {
    #[serde(default = "SubtractionCfg::default_start")]
    pub start: OperandRange,
    #[serde(default = "SubtractionCfg::default_amount")]
    pub amount: OperandRange,
}

impl SubtractionCfg {
    const fn default_start() -> OperandRange {
        OperandRange::new(40, 89)
    }

    const fn default_amount() -> OperandRange {
        OperandRange::new(5, 34)
    }
}

impl Default for SubtractionCfg {
    fn default() -> Self {
        Self {
            start: Self::default_start(),
            amount: Self::default_amount(),
        }
    }
}

/// Operand ranges shared by every word-problem family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCfg {
    #[serde(default = "WordCfg::default_a")]
    pub a: OperandRange,
    #[serde(default = "WordCfg::default_b")]
    pub b: OperandRange,
}

impl WordCfg {
    const fn default_a() -> OperandRange {
        OperandRange::new(10, 49)
    }

    const fn default_b() -> OperandRange {
        OperandRange::new(5, 24)
    }
}

impl Default for WordCfg {
    fn default() -> Self {
        Self {
            a: Self::default_a(),
            b: Self::default_b(),
        }
    }
}

/// Full tracker configuration. Every field has a default, so `{}` is a
/// valid JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub addition: AdditionCfg,
    #[serde(default)]
    pub subtraction: SubtractionCfg,
    #[serde(default)]
    pub word: WordCfg,
    /// Word-problem modes that accept jumps past the target.
    #[serde(default)]
    pub overshoot_allowed: Vec<Mode>,
}

impl TrackerConfig {
    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has the wrong shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any range is negative or inverted, when
    /// subtraction ranges could produce a negative target, when two maxima
    /// could not be summed into a target, or when an overshoot override
    /// names a non-word-problem mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.addition.a.validate("addition.a")?;
        self.addition.b.validate("addition.b")?;
        self.subtraction.start.validate("subtraction.start")?;
        self.subtraction.amount.validate("subtraction.amount")?;
        self.word.a.validate("word.a")?;
        self.word.b.validate("word.b")?;
        if self.subtraction.amount.max > self.subtraction.start.min {
            return Err(ConfigError::NegativeTarget {
                start_min: self.subtraction.start.min,
                amount_max: self.subtraction.amount.max,
            });
        }
        check_sum("addition.a", self.addition.a, "addition.b", self.addition.b)?;
        check_sum("word.a", self.word.a, "word.b", self.word.b)?;
        if self.word.b.min > self.word.a.min {
            return Err(ConfigError::NegativeTarget {
                start_min: self.word.a.min,
                amount_max: self.word.b.min,
            });
        }
        if let Some(mode) = self
            .overshoot_allowed
            .iter()
            .find(|mode| !mode.is_word_problem())
        {
            return Err(ConfigError::OvershootNotSupported { mode: *mode });
        }
        Ok(())
    }

    /// Policy for `mode` with overshoot overrides applied.
    #[must_use]
    pub fn policy(&self, mode: Mode) -> ModePolicy {
        let mut policy = mode.base_policy();
        if mode.is_word_problem() && self.overshoot_allowed.contains(&mode) {
            policy.allows_overshoot = true;
        }
        policy
    }
}

fn check_sum(
    first: &'static str,
    a: OperandRange,
    second: &'static str,
    b: OperandRange,
) -> Result<(), ConfigError> {
    if a.max.checked_add(b.max).is_none() {
        return Err(ConfigError::Overflow {
            first,
            second,
            first_max: a.max,
            second_max: b.max,
        });
    }
    Ok(())
}

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must not be negative (got {value})")]
    NegativeBound { field: &'static str, value: i32 },
    #[error("{field} range invalid (min {min} > max {max})")]
    InvertedRange {
        field: &'static str,
        min: i32,
        max: i32,
    },
    #[error("subtracted amount up to {amount_max} could pass below zero from start {start_min}")]
    NegativeTarget { start_min: i32, amount_max: i32 },
    #[error("{first} max {first_max} plus {second} max {second_max} overflows")]
    Overflow {
        first: &'static str,
        second: &'static str,
        first_max: i32,
        second_max: i32,
    },
    #[error("mode {mode} does not support overshoot")]
    OvershootNotSupported { mode: Mode },
}

//! Word-problem families, their sub-templates, and prompt text.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::mode::Mode;

pub const NAMES: [&str; 8] = [
    "Maya", "Leo", "Priya", "Sam", "Ana", "Kofi", "Jun", "Elena",
];

pub const ITEMS: [&str; 8] = [
    "apples",
    "stickers",
    "marbles",
    "shells",
    "pencils",
    "stamps",
    "cookies",
    "blocks",
];

/// Which quantity the learner has to discover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownRole {
    Result,
    Change,
    Start,
}

/// Fixed sentence shape within a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoryTemplate {
    ResultUnknown,
    ChangeUnknown,
    StartUnknown,
    DifferenceUnknown,
    ComparedUnknown,
    ReferentUnknown,
    WholeUnknown,
    PartUnknown,
}

impl StoryTemplate {
    #[must_use]
    pub const fn unknown_role(self) -> UnknownRole {
        match self {
            Self::ResultUnknown | Self::ComparedUnknown | Self::WholeUnknown => UnknownRole::Result,
            Self::ChangeUnknown | Self::DifferenceUnknown | Self::PartUnknown => {
                UnknownRole::Change
            }
            Self::StartUnknown | Self::ReferentUnknown => UnknownRole::Start,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ResultUnknown => "result-unknown",
            Self::ChangeUnknown => "change-unknown",
            Self::StartUnknown => "start-unknown",
            Self::DifferenceUnknown => "difference-unknown",
            Self::ComparedUnknown => "compared-unknown",
            Self::ReferentUnknown => "referent-unknown",
            Self::WholeUnknown => "whole-unknown",
            Self::PartUnknown => "part-unknown",
        }
    }

    /// Sub-templates available to a word-problem family. Empty for the
    /// plain arithmetic modes.
    #[must_use]
    pub const fn for_family(family: Mode) -> &'static [Self] {
        match family {
            Mode::Join | Mode::Separate => {
                &[Self::ResultUnknown, Self::ChangeUnknown, Self::StartUnknown]
            }
            Mode::Compare => &[
                Self::DifferenceUnknown,
                Self::ComparedUnknown,
                Self::ReferentUnknown,
            ],
            Mode::PartPartWhole => &[Self::WholeUnknown, Self::PartUnknown],
            Mode::Addition | Mode::Subtraction | Mode::Commutative => &[],
        }
    }
}

impl fmt::Display for StoryTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Characters and objects a story is told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cast {
    pub name: &'static str,
    pub other: &'static str,
    pub item: &'static str,
}

/// A generated word problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub kind: Mode,
    pub sub_kind: StoryTemplate,
    pub operand_a: i32,
    pub operand_b: i32,
    pub unknown_role: UnknownRole,
    pub prompt_text: String,
}

impl Story {
    #[must_use]
    pub fn compose(
        kind: Mode,
        sub_kind: StoryTemplate,
        operand_a: i32,
        operand_b: i32,
        cast: Cast,
    ) -> Self {
        Self {
            kind,
            sub_kind,
            operand_a,
            operand_b,
            unknown_role: sub_kind.unknown_role(),
            prompt_text: prompt_text(kind, sub_kind, operand_a, operand_b, cast),
        }
    }

    /// `(start, target)` on the number line for this story.
    ///
    /// Start-unknown stories begin at zero and ask for the original amount.
    /// Compare walks from A straight to B. Separate subtracts B from A and
    /// the remaining families add it.
    #[must_use]
    pub const fn endpoints(&self) -> (i32, i32) {
        let (a, b) = (self.operand_a, self.operand_b);
        match (self.unknown_role, self.kind) {
            (UnknownRole::Start, _) => (0, a),
            (_, Mode::Compare) => (a, b),
            (_, Mode::Separate) => (a, a.saturating_sub(b)),
            _ => (a, a.saturating_add(b)),
        }
    }
}

/// "5 more apples than", "3 fewer apples than" or "as many apples as".
fn comparison(diff: i32, item: &str) -> String {
    match diff.signum() {
        1 => format!("{diff} more {item} than"),
        -1 => format!("{} fewer {item} than", diff.unsigned_abs()),
        _ => format!("as many {item} as"),
    }
}

fn prompt_text(kind: Mode, template: StoryTemplate, a: i32, b: i32, cast: Cast) -> String {
    let Cast { name, other, item } = cast;
    match (kind, template) {
        (Mode::Join, StoryTemplate::ChangeUnknown) => format!(
            "{name} has {a} {item}. After getting some more, {name} has {}. How many {item} did {name} get?",
            a.saturating_add(b)
        ),
        (Mode::Join, StoryTemplate::StartUnknown) => format!(
            "{name} had some {item}. {name} got {b} more and now has {}. How many {item} did {name} have at the start?",
            a.saturating_add(b)
        ),
        (Mode::Join, _) => format!(
            "{name} has {a} {item}. {name} gets {b} more. How many {item} does {name} have now?"
        ),
        (Mode::Separate, StoryTemplate::ChangeUnknown) => format!(
            "{name} had {a} {item}. After giving some away, {name} has {} left. How many {item} did {name} give away?",
            a.saturating_sub(b)
        ),
        (Mode::Separate, StoryTemplate::StartUnknown) => format!(
            "{name} had some {item}. After giving away {b}, {name} has {} left. How many {item} did {name} have at first?",
            a.saturating_sub(b)
        ),
        (Mode::Separate, _) => format!(
            "{name} has {a} {item}. {name} gives away {b}. How many {item} are left?"
        ),
        (Mode::Compare, StoryTemplate::DifferenceUnknown) => format!(
            "{name} has {a} {item}. {other} has {b} {item}. How many more or fewer {item} does {other} have than {name}?"
        ),
        (Mode::Compare, StoryTemplate::ReferentUnknown) => format!(
            "{other} has {b} {item}. {other} has {} {name}. How many {item} does {name} have?",
            comparison(b.saturating_sub(a), item)
        ),
        (Mode::Compare, _) => format!(
            "{name} has {a} {item}. {other} has {} {name}. How many {item} does {other} have?",
            comparison(b.saturating_sub(a), item)
        ),
        (Mode::PartPartWhole, StoryTemplate::PartUnknown) => format!(
            "{name} has {} {item}. {a} are red and the rest are blue. How many are blue?",
            a.saturating_add(b)
        ),
        (Mode::PartPartWhole, _) => format!(
            "{name} has {a} red {item} and {b} blue {item}. How many {item} does {name} have altogether?"
        ),
        (Mode::Addition | Mode::Commutative, _) => format!("{a} + {b} = ?"),
        (Mode::Subtraction, _) => format!("{a} - {b} = ?"),
    }
}

//! Problem instances and their mode-dependent generation.
use serde::{Deserialize, Serialize};

use crate::config::TrackerConfig;
use crate::mode::{Direction, Mode};
use crate::source::NumberSource;
use crate::story::{Cast, ITEMS, NAMES, Story, StoryTemplate, UnknownRole};

const CUSTOM_PROMPT_PREFIX: &str = "Custom Problem";

/// The active arithmetic instance. `target_sum` is fixed for the lifetime
/// of the problem; only a new problem changes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub start_number: i32,
    pub target_sum: i32,
    /// Addends kept for commutative swapping, as `(base_a, base_b)`.
    #[serde(default)]
    pub base_pair: Option<(i32, i32)>,
    #[serde(default)]
    pub story: Option<Story>,
    pub prompt: String,
}

impl Problem {
    /// Signed distance from start to target.
    #[must_use]
    pub const fn change(&self) -> i32 {
        self.target_sum - self.start_number
    }

    /// Travel direction under `mode`. A separate story whose unknown is the
    /// start counts up from zero instead of down, and a compare story whose
    /// second quantity is the smaller one counts down.
    #[must_use]
    pub fn direction(&self, mode: Mode, base: Direction) -> Direction {
        match &self.story {
            Some(story)
                if mode == Mode::Separate && story.unknown_role == UnknownRole::Start =>
            {
                Direction::Increasing
            }
            Some(_) if mode == Mode::Compare && self.target_sum < self.start_number => {
                Direction::Decreasing
            }
            _ => base,
        }
    }

    /// Draw a fresh problem for `mode`.
    pub fn generate(mode: Mode, config: &TrackerConfig, source: &mut impl NumberSource) -> Self {
        match mode {
            Mode::Addition | Mode::Commutative => {
                let a = source.next_in(config.addition.a.min, config.addition.a.max);
                let b = source.next_in(config.addition.b.min, config.addition.b.max);
                Self::addends(a, b, format!("{a} + {b} = ?"))
            }
            Mode::Subtraction => {
                let cfg = &config.subtraction;
                let start = source.next_in(cfg.start.min, cfg.start.max);
                let amount = source.next_in(cfg.amount.min, cfg.amount.max);
                Self {
                    start_number: start,
                    target_sum: start.saturating_sub(amount),
                    base_pair: None,
                    story: None,
                    prompt: format!("{start} - {amount} = ?"),
                }
            }
            Mode::Join | Mode::Separate | Mode::Compare | Mode::PartPartWhole => {
                Self::word_problem(mode, config, source)
            }
        }
    }

    fn word_problem(family: Mode, config: &TrackerConfig, source: &mut impl NumberSource) -> Self {
        let a = source.next_in(config.word.a.min, config.word.a.max);
        let b_max = if family == Mode::Separate {
            config.word.b.max.min(a)
        } else {
            config.word.b.max
        };
        let b = source.next_in(config.word.b.min, b_max);

        let templates = StoryTemplate::for_family(family);
        let template = templates
            .get(source.next_index(templates.len()))
            .copied()
            .unwrap_or(StoryTemplate::ResultUnknown);
        let cast = draw_cast(source);

        let story = Story::compose(family, template, a, b, cast);
        let (start_number, target_sum) = story.endpoints();
        Self {
            start_number,
            target_sum,
            base_pair: None,
            prompt: story.prompt_text.clone(),
            story: Some(story),
        }
    }

    fn addends(a: i32, b: i32, prompt: String) -> Self {
        Self {
            start_number: a,
            target_sum: a.saturating_add(b),
            base_pair: Some((a, b)),
            story: None,
            prompt,
        }
    }

    /// Caller-entered problem counting `delta` up from `start`. The
    /// arguments must already be validated.
    #[must_use]
    pub fn custom(start: i32, delta: i32) -> Self {
        Self {
            start_number: start,
            target_sum: start.saturating_add(delta),
            base_pair: Some((start, delta)),
            story: None,
            prompt: format!("{CUSTOM_PROMPT_PREFIX}: {start} + {delta} = ?"),
        }
    }

    /// Exchange the addend roles, keeping the target. Returns `false` when
    /// the problem has no addend pair.
    pub fn swap_addends(&mut self) -> bool {
        let Some((base_a, base_b)) = self.base_pair else {
            return false;
        };
        let (start, other) = if self.start_number == base_a {
            (base_b, base_a)
        } else {
            (base_a, base_b)
        };
        self.start_number = start;
        self.prompt = if self.prompt.starts_with(CUSTOM_PROMPT_PREFIX) {
            format!("{CUSTOM_PROMPT_PREFIX}: {start} + {other} = ?")
        } else {
            format!("{start} + {other} = ?")
        };
        true
    }
}

fn draw_cast(source: &mut impl NumberSource) -> Cast {
    let name_index = source.next_index(NAMES.len());
    let offset = 1 + source.next_index(NAMES.len() - 1);
    let item_index = source.next_index(ITEMS.len());
    Cast {
        name: NAMES[name_index % NAMES.len()],
        other: NAMES[(name_index + offset) % NAMES.len()],
        item: ITEMS[item_index % ITEMS.len()],
    }
}

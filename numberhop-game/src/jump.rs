//! Jump records and the append/pop-only log that holds them.
use serde::{Deserialize, Serialize};

/// Number of identical unit jumps collapsed into one decade jump.
pub const GROUP_RUN_LEN: usize = 10;

/// One signed move along the number line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jump {
    pub amount: i32,
    pub from: i32,
    pub to: i32,
    /// Set when the jump was synthesized by auto-grouping.
    #[serde(default)]
    pub is_grouped: bool,
}

impl Jump {
    /// Jump entered directly by the learner.
    #[must_use]
    pub const fn entered(from: i32, amount: i32, to: i32) -> Self {
        Self {
            amount,
            from,
            to,
            is_grouped: false,
        }
    }

    #[must_use]
    pub const fn is_unit(&self) -> bool {
        self.amount == 1 || self.amount == -1
    }
}

/// Ordered jump history. Entries are only appended, popped, or collapsed
/// at the tail, so adjacent entries always chain `to -> from`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JumpLog(Vec<Jump>);

impl JumpLog {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, jump: Jump) {
        self.0.push(jump);
    }

    pub fn pop(&mut self) -> Option<Jump> {
        self.0.pop()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Jump> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Jump> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Jump] {
        &self.0
    }

    /// Sum of every recorded amount.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.0.iter().map(|jump| i64::from(jump.amount)).sum()
    }

    /// True when the last `len` entries all carry exactly `amount`.
    #[must_use]
    pub fn ends_with_run(&self, amount: i32, len: usize) -> bool {
        len > 0
            && self.0.len() >= len
            && self.0[self.0.len() - len..]
                .iter()
                .all(|jump| jump.amount == amount)
    }

    /// Replace the last `len` entries with one grouped jump spanning them.
    ///
    /// The grouped jump keeps the literal `from` of the first removed entry
    /// and `to` of the last. Returns `None` and leaves the log untouched
    /// when fewer than `len` entries exist.
    pub fn collapse_tail(&mut self, len: usize) -> Option<Jump> {
        if len == 0 || self.0.len() < len {
            return None;
        }
        let tail = self.0.split_off(self.0.len() - len);
        let first = tail.first()?;
        let last = tail.last()?;
        let amount = tail.iter().map(|jump| jump.amount).sum();
        let grouped = Jump {
            amount,
            from: first.from,
            to: last.to,
            is_grouped: true,
        };
        self.0.push(grouped);
        Some(grouped)
    }
}

impl<'a> IntoIterator for &'a JumpLog {
    type Item = &'a Jump;
    type IntoIter = std::slice::Iter<'a, Jump>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

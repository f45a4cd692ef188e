use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::jump::{Jump, JumpLog};
use crate::mode::{Direction, Mode, ModePolicy};
use crate::problem::Problem;

/// Snapshot of a game, handed to every subscriber after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub mode: Mode,
    pub policy: ModePolicy,
    pub problem: Problem,
    pub current_sum: i32,
    pub jumps: JumpLog,
}

impl GameState {
    #[must_use]
    pub fn new(mode: Mode, policy: ModePolicy, problem: Problem) -> Self {
        Self {
            mode,
            policy,
            current_sum: problem.start_number,
            problem,
            jumps: JumpLog::new(),
        }
    }

    #[must_use]
    pub const fn start_number(&self) -> i32 {
        self.problem.start_number
    }

    #[must_use]
    pub const fn target_sum(&self) -> i32 {
        self.problem.target_sum
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.current_sum == self.problem.target_sum
    }

    /// Direction the marker must travel for the active problem.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.problem.direction(self.mode, self.policy.direction)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.jumps.is_empty()
    }

    #[must_use]
    pub fn can_reset(&self) -> bool {
        !self.jumps.is_empty()
    }

    #[must_use]
    pub fn grouped_jumps(&self) -> usize {
        self.jumps.iter().filter(|jump| jump.is_grouped).count()
    }

    /// Move the marker back to the start and forget every jump.
    pub(crate) fn rewind(&mut self) {
        self.current_sum = self.problem.start_number;
        self.jumps.clear();
    }

    /// Check the ledger invariants: the log chains from the start without
    /// gaps and its running total lands on `current_sum`.
    ///
    /// # Errors
    ///
    /// Returns the first `LedgerError` found.
    pub fn verify_ledger(&self) -> Result<(), LedgerError> {
        let mut expected_from = self.problem.start_number;
        for (index, jump) in self.jumps.iter().enumerate() {
            if jump.from != expected_from {
                return Err(if index == 0 {
                    LedgerError::StartMismatch {
                        start: expected_from,
                        first_from: jump.from,
                    }
                } else {
                    LedgerError::Gap {
                        index,
                        expected: expected_from,
                        found: jump.from,
                    }
                });
            }
            if i64::from(jump.from) + i64::from(jump.amount) != i64::from(jump.to) {
                return Err(LedgerError::BadJump {
                    index,
                    jump: *jump,
                });
            }
            expected_from = jump.to;
        }
        let expected_sum = i64::from(self.problem.start_number) + self.jumps.total();
        if expected_sum != i64::from(self.current_sum) {
            return Err(LedgerError::SumMismatch {
                expected: expected_sum,
                current: self.current_sum,
            });
        }
        Ok(())
    }
}

/// Ledger invariant violations reported by [`GameState::verify_ledger`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("first jump starts at {first_from}, expected start number {start}")]
    StartMismatch { start: i32, first_from: i32 },
    #[error("jump {index} starts at {found}, expected {expected}")]
    Gap {
        index: usize,
        expected: i32,
        found: i32,
    },
    #[error("jump {index} does not land on from + amount: {jump:?}")]
    BadJump { index: usize, jump: Jump },
    #[error("current sum {current} differs from start plus jumps ({expected})")]
    SumMismatch { expected: i64, current: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(start: i32, delta: i32) -> GameState {
        GameState::new(
            Mode::Addition,
            Mode::Addition.base_policy(),
            Problem::custom(start, delta),
        )
    }

    #[test]
    fn fresh_state_sits_on_start() {
        let state = state(12, 33);
        assert_eq!(state.current_sum, 12);
        assert_eq!(state.target_sum(), 45);
        assert!(!state.is_complete());
        assert!(!state.can_undo());
        assert!(state.verify_ledger().is_ok());
    }

    #[test]
    fn ledger_detects_start_mismatch() {
        let mut state = state(10, 5);
        state.jumps.push(Jump::entered(11, 1, 12));
        state.current_sum = 12;
        assert_eq!(
            state.verify_ledger(),
            Err(LedgerError::StartMismatch {
                start: 10,
                first_from: 11
            })
        );
    }

    #[test]
    fn ledger_detects_gap_and_sum_drift() {
        let mut state = state(10, 20);
        state.jumps.push(Jump::entered(10, 10, 20));
        state.jumps.push(Jump::entered(21, 1, 22));
        state.current_sum = 22;
        assert!(matches!(
            state.verify_ledger(),
            Err(LedgerError::Gap { index: 1, .. })
        ));

        let mut state = self::state(10, 20);
        state.jumps.push(Jump::entered(10, 10, 20));
        state.current_sum = 25;
        assert!(matches!(
            state.verify_ledger(),
            Err(LedgerError::SumMismatch { expected: 20, .. })
        ));
    }

    #[test]
    fn rewind_clears_history() {
        let mut state = state(10, 20);
        state.jumps.push(Jump::entered(10, 10, 20));
        state.current_sum = 20;
        assert!(state.can_reset());
        state.rewind();
        assert_eq!(state.current_sum, 10);
        assert!(state.jumps.is_empty());
    }

    #[test]
    fn snapshot_survives_json() {
        let mut state = state(12, 33);
        state.jumps.push(Jump::entered(12, 10, 22));
        state.current_sum = 22;
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
        assert!(json.contains("\"mode\":\"addition\""));
    }
}

//! The jump-tracking state machine.
//!
//! Every public operation runs to completion, including subscriber
//! callbacks, before returning. Rejected jumps leave the state untouched
//! and notify nobody.
use rand_chacha::ChaCha20Rng;
use std::fmt;
use thiserror::Error;

use crate::config::TrackerConfig;
use crate::jump::{GROUP_RUN_LEN, Jump};
use crate::mode::{Direction, Mode};
use crate::problem::Problem;
use crate::source::{NumberSource, RngSource};
use crate::state::GameState;

type Listener = Box<dyn FnMut(&GameState)>;

/// Misuse of the tracker API. Ordinary rejected jumps are not errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("unrecognized mode '{name}'")]
    InvalidMode { name: String },
    #[error("invalid {field} {value}: {reason}")]
    InvalidArgument {
        field: &'static str,
        value: i32,
        reason: &'static str,
    },
}

/// Owns the game state, the number source used for generation, and the
/// registered subscribers.
pub struct JumpTracker<S = RngSource<ChaCha20Rng>> {
    state: GameState,
    config: TrackerConfig,
    source: S,
    listeners: Vec<Listener>,
}

impl JumpTracker {
    /// Tracker in `addition` mode with a deterministic ChaCha source.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, TrackerConfig::default())
    }

    #[must_use]
    pub fn with_config(seed: u64, config: TrackerConfig) -> Self {
        Self::with_source(RngSource::seeded(seed), config)
    }
}

impl<S: NumberSource> JumpTracker<S> {
    /// Build a tracker and draw its first `addition` problem. No subscriber
    /// exists yet, so nothing is notified.
    pub fn with_source(mut source: S, config: TrackerConfig) -> Self {
        let mode = Mode::default();
        let problem = Problem::generate(mode, &config, &mut source);
        let state = GameState::new(mode, config.policy(mode), problem);
        Self {
            state,
            config,
            source,
            listeners: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.state.mode
    }

    #[must_use]
    pub const fn current_sum(&self) -> i32 {
        self.state.current_sum
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// Register a callback invoked with the full snapshot after every
    /// mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&GameState) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Switch mode and start a new problem in it.
    pub fn set_mode(&mut self, mode: Mode) {
        self.state.mode = mode;
        self.start_new_game();
    }

    /// Switch mode by name.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidMode` for an unrecognized name; the
    /// current game is left as it was.
    pub fn set_mode_named(&mut self, name: &str) -> Result<(), TrackerError> {
        let mode = name.parse::<Mode>()?;
        self.set_mode(mode);
        Ok(())
    }

    /// Replace the problem with a freshly generated one for the current mode.
    pub fn start_new_game(&mut self) {
        let mode = self.state.mode;
        let problem = Problem::generate(mode, &self.config, &mut self.source);
        log::info!(
            "new {mode} problem: {} -> {} ({})",
            problem.start_number,
            problem.target_sum,
            problem.prompt
        );
        self.state = GameState::new(mode, self.config.policy(mode), problem);
        self.notify();
    }

    /// Start a caller-entered problem with target `start + delta`. The mode
    /// and its jump policy are kept.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidArgument` when `start` is negative,
    /// `delta` is not positive, or the target overflows.
    pub fn start_custom_game(&mut self, start: i32, delta: i32) -> Result<(), TrackerError> {
        if start < 0 {
            return Err(TrackerError::InvalidArgument {
                field: "start",
                value: start,
                reason: "must not be negative",
            });
        }
        if delta <= 0 {
            return Err(TrackerError::InvalidArgument {
                field: "delta",
                value: delta,
                reason: "must be positive",
            });
        }
        if start.checked_add(delta).is_none() {
            return Err(TrackerError::InvalidArgument {
                field: "delta",
                value: delta,
                reason: "target is out of range",
            });
        }

        let problem = Problem::custom(start, delta);
        log::info!("custom {} problem: {}", self.state.mode, problem.prompt);
        self.state = GameState::new(self.state.mode, self.state.policy, problem);
        self.notify();
        Ok(())
    }

    /// Exchange the addend roles in commutative mode. Progress is
    /// forfeited; the target is unchanged. A no-op in every other mode.
    pub fn swap_commutative(&mut self) {
        if !self.state.policy.supports_swap {
            return;
        }
        if !self.state.problem.swap_addends() {
            return;
        }
        self.state.rewind();
        log::debug!(
            "swapped addends, now starting at {}",
            self.state.start_number()
        );
        self.notify();
    }

    /// Try to move the marker by `amount`. Returns `false` without touching
    /// the state when the jump is zero, overflows, or leaves the legal
    /// region for the current direction.
    pub fn add_jump(&mut self, amount: i32) -> bool {
        let from = self.state.current_sum;
        let Some(to) = self.landing(amount) else {
            log::debug!(
                "rejected jump {amount:+} from {from} (target {})",
                self.state.target_sum()
            );
            return false;
        };

        self.state.current_sum = to;
        self.state.jumps.push(Jump::entered(from, amount, to));
        log::debug!("jump {amount:+}: {from} -> {to}");
        self.auto_group(amount);
        self.notify();
        true
    }

    /// Landing value for `amount`, or `None` when the move is illegal.
    fn landing(&self, amount: i32) -> Option<i32> {
        if amount == 0 {
            return None;
        }
        let to = self.state.current_sum.checked_add(amount)?;
        if self.state.policy.allows_overshoot {
            return Some(to);
        }
        let target = self.state.target_sum();
        let legal = match self.state.direction() {
            Direction::Increasing => to <= target,
            Direction::Decreasing => to >= target,
        };
        legal.then_some(to)
    }

    /// Collapse a trailing run of ten identical unit jumps into one grouped
    /// decade jump. Runs once per accepted jump.
    fn auto_group(&mut self, amount: i32) {
        let unit = self.state.jumps.last().is_some_and(Jump::is_unit);
        if !unit || !self.state.jumps.ends_with_run(amount, GROUP_RUN_LEN) {
            return;
        }
        if let Some(grouped) = self.state.jumps.collapse_tail(GROUP_RUN_LEN) {
            log::debug!(
                "grouped {GROUP_RUN_LEN} unit jumps into {:+}: {} -> {}",
                grouped.amount,
                grouped.from,
                grouped.to
            );
        }
    }

    /// Pop the last jump and move the marker back to where it started.
    /// Grouped jumps come off whole.
    pub fn undo(&mut self) -> Option<Jump> {
        let jump = self.state.jumps.pop()?;
        self.state.current_sum = jump.from;
        log::debug!("undo {:+}, back at {}", jump.amount, jump.from);
        self.notify();
        Some(jump)
    }

    /// Return to the start of the current problem without regenerating it.
    pub fn reset(&mut self) {
        self.state.rewind();
        log::debug!("reset to {}", self.state.current_sum);
        self.notify();
    }

    fn notify(&mut self) {
        for listener in &mut self.listeners {
            listener(&self.state);
        }
    }
}

impl<S> fmt::Debug for JumpTracker<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JumpTracker")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OperandRange;
    use crate::source::ScriptedSource;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scripted(values: impl IntoIterator<Item = i32>) -> JumpTracker<ScriptedSource> {
        JumpTracker::with_source(ScriptedSource::new(values), TrackerConfig::default())
    }

    fn counter(tracker: &mut JumpTracker<ScriptedSource>) -> Rc<RefCell<usize>> {
        let calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&calls);
        tracker.subscribe(move |_| *seen.borrow_mut() += 1);
        calls
    }

    #[test]
    fn constructor_draws_addition_problem() {
        let tracker = scripted([20, 45]);
        assert_eq!(tracker.mode(), Mode::Addition);
        assert_eq!(tracker.state().start_number(), 20);
        assert_eq!(tracker.state().target_sum(), 65);
        assert_eq!(tracker.current_sum(), 20);
    }

    #[test]
    fn decade_walk_then_undo() {
        let mut tracker = scripted([20, 45]);
        for _ in 0..4 {
            assert!(tracker.add_jump(10));
        }
        assert!(tracker.add_jump(5));
        let trail: Vec<i32> = tracker.state().jumps.iter().map(|j| j.to).collect();
        assert_eq!(trail, vec![30, 40, 50, 60, 65]);
        assert!(tracker.is_complete());

        let popped = tracker.undo().unwrap();
        assert_eq!(popped.amount, 5);
        assert_eq!(tracker.current_sum(), 60);
        assert_eq!(tracker.state().jumps.len(), 4);
    }

    #[test]
    fn rejection_leaves_state_and_listeners_alone() {
        let mut tracker = scripted([20, 5]);
        let calls = counter(&mut tracker);
        let before = tracker.state().clone();
        assert!(!tracker.add_jump(10));
        assert!(!tracker.add_jump(0));
        assert_eq!(tracker.state(), &before);
        assert_eq!(*calls.borrow(), 0);

        assert!(tracker.add_jump(5));
        assert_eq!(*calls.borrow(), 1);
        assert!(!tracker.add_jump(1));
        assert!(!tracker.add_jump(10));
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn negative_jumps_allowed_below_target_when_increasing() {
        let mut tracker = scripted([20, 45]);
        assert!(tracker.add_jump(-10));
        assert_eq!(tracker.current_sum(), 10);
        assert!(tracker.state().verify_ledger().is_ok());
    }

    #[test]
    fn ten_units_collapse_into_one_grouped_jump() {
        let mut tracker = scripted([20, 15]);
        for _ in 0..9 {
            assert!(tracker.add_jump(1));
        }
        assert_eq!(tracker.state().jumps.len(), 9);
        assert!(tracker.add_jump(1));

        let jumps = tracker.state().jumps.as_slice();
        assert_eq!(
            jumps,
            &[Jump {
                amount: 10,
                from: 20,
                to: 30,
                is_grouped: true
            }]
        );

        assert!(tracker.add_jump(1));
        assert_eq!(tracker.state().jumps.len(), 2);
        assert!(!tracker.state().jumps.as_slice()[1].is_grouped);
        assert_eq!(tracker.current_sum(), 31);
    }

    #[test]
    fn interrupted_run_does_not_group() {
        let mut tracker = scripted([20, 29]);
        for _ in 0..5 {
            assert!(tracker.add_jump(1));
        }
        assert!(tracker.add_jump(10));
        for _ in 0..5 {
            assert!(tracker.add_jump(1));
        }
        assert_eq!(tracker.state().grouped_jumps(), 0);
        assert_eq!(tracker.state().jumps.len(), 11);
    }

    #[test]
    fn undo_removes_grouped_jump_whole() {
        let mut tracker = scripted([20, 15]);
        assert!(tracker.add_jump(2));
        for _ in 0..10 {
            assert!(tracker.add_jump(1));
        }
        assert_eq!(tracker.state().jumps.len(), 2);
        let popped = tracker.undo().unwrap();
        assert!(popped.is_grouped);
        assert_eq!(tracker.current_sum(), 22);
        assert_eq!(tracker.state().jumps.len(), 1);
    }

    #[test]
    fn undo_on_empty_log_is_silent() {
        let mut tracker = scripted([20, 15]);
        let calls = counter(&mut tracker);
        assert!(tracker.undo().is_none());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn reset_keeps_problem_and_notifies() {
        let mut tracker = scripted([20, 15]);
        let calls = counter(&mut tracker);
        assert!(tracker.add_jump(10));
        tracker.reset();
        assert_eq!(tracker.current_sum(), 20);
        assert_eq!(tracker.state().target_sum(), 35);
        assert!(tracker.state().jumps.is_empty());
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn subtraction_counts_down_without_passing_target() {
        let mut tracker = scripted([20, 15, 80, 25]);
        tracker.set_mode(Mode::Subtraction);
        assert_eq!(tracker.state().start_number(), 80);
        assert_eq!(tracker.state().target_sum(), 55);
        assert!(!tracker.add_jump(-30));
        assert!(tracker.add_jump(-10));
        assert!(tracker.add_jump(-10));
        for _ in 0..5 {
            assert!(tracker.add_jump(-1));
        }
        assert!(tracker.is_complete());
        assert!(!tracker.add_jump(-1));
        assert_eq!(tracker.current_sum(), 55);
    }

    #[test]
    fn swap_is_commutative_only_and_self_inverse() {
        let mut tracker = scripted([20, 45, 20, 45]);
        let calls = counter(&mut tracker);
        tracker.swap_commutative();
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(tracker.state().start_number(), 20);

        tracker.set_mode(Mode::Commutative);
        assert!(tracker.add_jump(10));
        tracker.swap_commutative();
        assert_eq!(tracker.state().start_number(), 45);
        assert_eq!(tracker.state().target_sum(), 65);
        assert_eq!(tracker.current_sum(), 45);
        assert!(tracker.state().jumps.is_empty());

        tracker.swap_commutative();
        assert_eq!(tracker.state().start_number(), 20);
        assert_eq!(tracker.state().problem.base_pair, Some((20, 45)));
    }

    #[test]
    fn custom_game_validation() {
        let mut tracker = scripted([20, 45]);
        tracker.start_custom_game(12, 33).unwrap();
        assert_eq!(tracker.state().start_number(), 12);
        assert_eq!(tracker.state().target_sum(), 45);
        assert_eq!(tracker.current_sum(), 12);
        assert!(tracker.state().jumps.is_empty());
        assert!(tracker.state().problem.prompt.starts_with("Custom Problem"));

        assert!(matches!(
            tracker.start_custom_game(-1, 5),
            Err(TrackerError::InvalidArgument { field: "start", .. })
        ));
        assert!(matches!(
            tracker.start_custom_game(5, 0),
            Err(TrackerError::InvalidArgument { field: "delta", .. })
        ));
        assert!(tracker.start_custom_game(i32::MAX, 1).is_err());
        assert_eq!(tracker.state().target_sum(), 45);
    }

    #[test]
    fn custom_game_keeps_mode_policy() {
        let mut tracker = scripted([20, 45, 60, 10]);
        tracker.set_mode(Mode::Subtraction);
        tracker.start_custom_game(12, 33).unwrap();
        assert_eq!(tracker.mode(), Mode::Subtraction);
        assert_eq!(tracker.state().target_sum(), 45);
        assert_eq!(tracker.state().direction(), Direction::Decreasing);
        // Counting down, only landings at or above the target are legal.
        assert!(!tracker.add_jump(1));
        assert!(tracker.add_jump(33));
        assert!(tracker.is_complete());

        tracker.set_mode(Mode::Addition);
        tracker.start_custom_game(50, 10).unwrap();
        assert_eq!(tracker.state().target_sum(), 60);
        assert!(tracker.add_jump(10));
        assert!(tracker.is_complete());
    }

    #[test]
    fn unknown_mode_name_keeps_game() {
        let mut tracker = scripted([20, 45]);
        let before = tracker.state().clone();
        assert_eq!(
            tracker.set_mode_named("division"),
            Err(TrackerError::InvalidMode {
                name: "division".to_string()
            })
        );
        assert_eq!(tracker.state(), &before);
        tracker.set_mode_named("compare").unwrap();
        assert_eq!(tracker.mode(), Mode::Compare);
        assert!(tracker.state().problem.story.is_some());
    }

    #[test]
    fn permissive_family_accepts_overshoot() {
        let config = TrackerConfig {
            overshoot_allowed: vec![Mode::Join],
            ..TrackerConfig::default()
        };
        let mut tracker =
            JumpTracker::with_source(ScriptedSource::new([20, 45, 30, 12, 0, 0, 0, 0]), config);
        tracker.set_mode(Mode::Join);
        assert_eq!(tracker.state().target_sum(), 42);
        assert!(tracker.add_jump(50));
        assert_eq!(tracker.current_sum(), 80);
        assert!(!tracker.is_complete());
    }

    #[test]
    fn overflowing_jump_is_rejected() {
        let config = TrackerConfig {
            overshoot_allowed: vec![Mode::Compare],
            ..TrackerConfig::default()
        };
        let mut tracker = JumpTracker::with_source(ScriptedSource::default(), config);
        tracker.set_mode(Mode::Compare);
        assert!(tracker.add_jump(i32::MAX - 100));
        assert!(!tracker.add_jump(i32::MAX));
    }

    #[test]
    fn unvalidated_huge_ranges_saturate() {
        let mut config = TrackerConfig::default();
        config.addition.a = OperandRange::new(i32::MAX - 1, i32::MAX);
        config.word.a = OperandRange::new(i32::MAX - 1, i32::MAX);
        assert!(config.validate().is_err());

        let mut tracker = JumpTracker::with_source(ScriptedSource::new([i32::MAX, 49]), config);
        assert_eq!(tracker.state().start_number(), i32::MAX);
        assert_eq!(tracker.state().target_sum(), i32::MAX);
        for mode in Mode::ALL {
            tracker.set_mode(mode);
            assert!(tracker.state().verify_ledger().is_ok());
        }
    }

    #[test]
    fn snapshots_reach_every_listener() {
        let mut tracker = scripted([20, 45]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&seen);
        let second = Rc::clone(&seen);
        tracker.subscribe(move |state| first.borrow_mut().push(("a", state.current_sum)));
        tracker.subscribe(move |state| second.borrow_mut().push(("b", state.current_sum)));
        assert!(tracker.add_jump(10));
        assert_eq!(*seen.borrow(), vec![("a", 30), ("b", 30)]);
    }

    #[test]
    fn seeded_trackers_agree() {
        let mut a = JumpTracker::new(2024);
        let mut b = JumpTracker::new(2024);
        for mode in Mode::ALL {
            a.set_mode(mode);
            b.set_mode(mode);
            assert_eq!(a.state(), b.state());
        }
    }
}

//! Numberhop Game Engine
//!
//! Platform-agnostic core for the Numberhop number-line teaching aid. A
//! learner moves a marker along a number line with signed jumps until it
//! lands on the target. This crate owns problem generation, move
//! validation, the jump history with undo, and auto-grouping of unit jumps.
//! Drawing the line and wiring input are left to the embedding UI, which
//! subscribes to [`GameState`] snapshots and calls [`JumpTracker`]
//! operations.
//!
//! ```
//! use numberhop_game::{JumpTracker, Mode};
//!
//! let mut tracker = JumpTracker::new(7);
//! tracker.set_mode(Mode::Addition);
//! let target = tracker.state().target_sum();
//! while tracker.current_sum() + 10 <= target {
//!     assert!(tracker.add_jump(10));
//! }
//! while !tracker.is_complete() {
//!     assert!(tracker.add_jump(1));
//! }
//! assert!(!tracker.add_jump(1));
//! ```

pub mod config;
pub mod jump;
pub mod mode;
pub mod problem;
pub mod source;
pub mod state;
pub mod story;
pub mod tracker;

// Re-export commonly used types
pub use config::{AdditionCfg, ConfigError, OperandRange, SubtractionCfg, TrackerConfig, WordCfg};
pub use jump::{GROUP_RUN_LEN, Jump, JumpLog};
pub use mode::{Direction, Mode, ModePolicy};
pub use problem::Problem;
pub use source::{NumberSource, RngSource, ScriptedSource};
pub use state::{GameState, LedgerError};
pub use story::{Story, StoryTemplate, UnknownRole};
pub use tracker::{JumpTracker, TrackerError};

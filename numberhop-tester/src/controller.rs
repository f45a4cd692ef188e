//! Text controller: turns typed gestures into tracker calls.
//!
//! Input is validated here before it reaches the core, so malformed
//! numbers never become tracker errors.
use numberhop_game::{JumpTracker, NumberSource, TrackerError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Preset or signed jump such as `+10` or `-1`.
    Jump(i32),
    /// `add N` / `sub N` from the custom jump field.
    CustomJump { amount: i32, subtract: bool },
    Undo,
    Reset,
    NewProblem,
    Swap,
    Mode(String),
    Custom { start: i32, change: i32 },
}

/// What the UI would show after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Moved,
    /// Jump refused; the button shakes.
    Shake,
    Complete,
    Updated,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: i32 },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: i32 },
    #[error("'{0}' expects {1} argument(s)")]
    Arity(String, usize),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

fn parse_number(token: &str) -> Result<i32, ControllerError> {
    token
        .trim()
        .parse::<i32>()
        .map_err(|_| ControllerError::NotANumber(token.to_string()))
}

fn expect_args<'a>(
    verb: &str,
    args: &'a [&'a str],
    count: usize,
) -> Result<&'a [&'a str], ControllerError> {
    if args.len() == count {
        Ok(args)
    } else {
        Err(ControllerError::Arity(verb.to_string(), count))
    }
}

impl FromStr for Command {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        if line.is_empty() {
            return Err(ControllerError::Empty);
        }
        if let Some(digits) = line.strip_prefix(['+', '-']) {
            if !digits.starts_with(|c: char| c.is_ascii_digit()) {
                return Err(ControllerError::NotANumber(line.to_string()));
            }
            return parse_number(line).map(Self::Jump);
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (verb, args) = tokens.split_first().ok_or(ControllerError::Empty)?;
        let verb = verb.to_ascii_lowercase();
        match verb.as_str() {
            "add" | "sub" => {
                let args = expect_args(&verb, args, 1)?;
                let amount = parse_number(args[0])?;
                if amount <= 0 {
                    return Err(ControllerError::NotPositive {
                        field: "jump",
                        value: amount,
                    });
                }
                Ok(Self::CustomJump {
                    amount,
                    subtract: verb == "sub",
                })
            }
            "undo" => expect_args(&verb, args, 0).map(|_| Self::Undo),
            "reset" => expect_args(&verb, args, 0).map(|_| Self::Reset),
            "new" => expect_args(&verb, args, 0).map(|_| Self::NewProblem),
            "swap" => expect_args(&verb, args, 0).map(|_| Self::Swap),
            "mode" => {
                let args = expect_args(&verb, args, 1)?;
                Ok(Self::Mode(args[0].to_string()))
            }
            "custom" => {
                let args = expect_args(&verb, args, 2)?;
                let start = parse_number(args[0])?;
                let change = parse_number(args[1])?;
                if start < 0 {
                    return Err(ControllerError::Negative {
                        field: "start",
                        value: start,
                    });
                }
                if change <= 0 {
                    return Err(ControllerError::NotPositive {
                        field: "change",
                        value: change,
                    });
                }
                Ok(Self::Custom { start, change })
            }
            _ => Err(ControllerError::UnknownCommand(line.to_string())),
        }
    }
}

/// Apply a parsed command to the tracker.
///
/// # Errors
///
/// Returns `ControllerError::Tracker` when the core refuses a mode name or
/// custom problem.
pub fn apply<S: NumberSource>(
    tracker: &mut JumpTracker<S>,
    command: &Command,
) -> Result<Feedback, ControllerError> {
    let feedback = match command {
        Command::Jump(amount) => jump_feedback(tracker, *amount),
        Command::CustomJump { amount, subtract } => {
            let signed = if *subtract { -amount } else { *amount };
            jump_feedback(tracker, signed)
        }
        Command::Undo => {
            tracker.undo();
            Feedback::Updated
        }
        Command::Reset => {
            tracker.reset();
            Feedback::Updated
        }
        Command::NewProblem => {
            tracker.start_new_game();
            Feedback::Updated
        }
        Command::Swap => {
            tracker.swap_commutative();
            Feedback::Updated
        }
        Command::Mode(name) => {
            tracker.set_mode_named(name)?;
            Feedback::Updated
        }
        Command::Custom { start, change } => {
            tracker.start_custom_game(*start, *change)?;
            Feedback::Updated
        }
    };
    Ok(feedback)
}

/// Parse and apply one line of input.
///
/// # Errors
///
/// Returns the parse or tracker error for the line.
pub fn run_line<S: NumberSource>(
    tracker: &mut JumpTracker<S>,
    line: &str,
) -> Result<Feedback, ControllerError> {
    let command = line.parse::<Command>()?;
    apply(tracker, &command)
}

fn jump_feedback<S: NumberSource>(tracker: &mut JumpTracker<S>, amount: i32) -> Feedback {
    if !tracker.add_jump(amount) {
        Feedback::Shake
    } else if tracker.is_complete() {
        Feedback::Complete
    } else {
        Feedback::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numberhop_game::{Mode, ScriptedSource, TrackerConfig};

    fn tracker() -> JumpTracker<ScriptedSource> {
        JumpTracker::with_source(ScriptedSource::new([20, 45]), TrackerConfig::default())
    }

    #[test]
    fn parses_jump_forms() {
        assert_eq!("+10".parse::<Command>().unwrap(), Command::Jump(10));
        assert_eq!("-1".parse::<Command>().unwrap(), Command::Jump(-1));
        for doubled in ["++5", "+-5", "--5", "-+5", "+ 5"] {
            assert_eq!(
                doubled.parse::<Command>(),
                Err(ControllerError::NotANumber(doubled.to_string()))
            );
        }
        assert_eq!(
            "sub 7".parse::<Command>().unwrap(),
            Command::CustomJump {
                amount: 7,
                subtract: true
            }
        );
        assert_eq!(
            "Mode part-part-whole".parse::<Command>().unwrap(),
            Command::Mode("part-part-whole".to_string())
        );
    }

    #[test]
    fn rejects_bad_custom_values_before_the_core() {
        assert_eq!(
            "add 0".parse::<Command>(),
            Err(ControllerError::NotPositive {
                field: "jump",
                value: 0
            })
        );
        assert_eq!(
            "add seven".parse::<Command>(),
            Err(ControllerError::NotANumber("seven".to_string()))
        );
        assert!(matches!(
            "custom -3 5".parse::<Command>(),
            Err(ControllerError::Negative { field: "start", .. })
        ));
        assert!(matches!(
            "custom 3 0".parse::<Command>(),
            Err(ControllerError::NotPositive {
                field: "change",
                ..
            })
        ));
        assert_eq!(
            "custom 3".parse::<Command>(),
            Err(ControllerError::Arity("custom".to_string(), 2))
        );
        assert!(matches!(
            "jump 4".parse::<Command>(),
            Err(ControllerError::UnknownCommand(_))
        ));
        assert_eq!("   ".parse::<Command>(), Err(ControllerError::Empty));
    }

    #[test]
    fn feedback_follows_tracker() {
        let mut tracker = tracker();
        assert_eq!(run_line(&mut tracker, "+10").unwrap(), Feedback::Moved);
        assert_eq!(run_line(&mut tracker, "+50").unwrap(), Feedback::Shake);
        assert_eq!(run_line(&mut tracker, "add 35").unwrap(), Feedback::Complete);
        assert_eq!(run_line(&mut tracker, "undo").unwrap(), Feedback::Updated);
        assert_eq!(tracker.current_sum(), 30);
    }

    #[test]
    fn tracker_errors_pass_through() {
        let mut tracker = tracker();
        assert!(matches!(
            run_line(&mut tracker, "mode division"),
            Err(ControllerError::Tracker(TrackerError::InvalidMode { .. }))
        ));
        run_line(&mut tracker, "mode subtraction").unwrap();
        assert_eq!(tracker.mode(), Mode::Subtraction);
        assert_eq!(run_line(&mut tracker, "custom 5 9").unwrap(), Feedback::Updated);
        assert_eq!(tracker.state().target_sum(), 14);
        assert!(matches!(
            run_line(&mut tracker, "custom 2147483647 1"),
            Err(ControllerError::Tracker(TrackerError::InvalidArgument { .. }))
        ));
    }
}

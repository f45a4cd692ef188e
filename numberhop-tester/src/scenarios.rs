use anyhow::{Result, ensure};
use numberhop_game::{GameState, Mode};

use crate::controller::Feedback;

pub type Expectation = fn(&ScriptRun) -> Result<()>;

/// How the solver picks its next jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStrategy {
    /// Decade jumps while the gap is at least ten, then units.
    Greedy,
    /// Unit jumps only, so every ten-run gets grouped.
    Units,
}

impl SolveStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Units => "units",
        }
    }

    /// Next jump toward the target, or `None` once there.
    #[must_use]
    pub fn next_jump(self, state: &GameState) -> Option<i32> {
        let gap = state.target_sum() - state.current_sum;
        if gap == 0 {
            return None;
        }
        let step = gap.signum();
        match self {
            Self::Greedy if gap.abs() >= 10 => Some(step * 10),
            _ => Some(step),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ScenarioPlan {
    /// Controller lines replayed in order, then checked.
    Script {
        steps: Vec<String>,
        expectation: Expectation,
    },
    /// Generate a problem in every mode and play it to completion.
    Solve {
        strategy: SolveStrategy,
        max_moves: usize,
    },
}

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: &'static str,
    pub description: &'static str,
    pub plan: ScenarioPlan,
}

/// Outcome of a scripted run handed to its expectation.
#[derive(Debug, Clone)]
pub struct ScriptRun {
    pub state: GameState,
    pub feedback: Vec<Result<Feedback, String>>,
    pub notifications: usize,
}

impl ScriptRun {
    fn feedback_at(&self, index: usize) -> Option<Feedback> {
        self.feedback.get(index).and_then(|f| f.as_ref().ok().copied())
    }

    fn last_feedback(&self) -> Option<Feedback> {
        self.feedback_at(self.feedback.len().checked_sub(1)?)
    }
}

fn script(lines: &[&str]) -> Vec<String> {
    lines.iter().map(ToString::to_string).collect()
}

fn repeated(line: &str, times: usize) -> Vec<String> {
    std::iter::repeat_n(line.to_string(), times).collect()
}

fn script_scenario(
    name: &'static str,
    description: &'static str,
    steps: Vec<String>,
    expectation: Expectation,
) -> TestScenario {
    TestScenario {
        name,
        description,
        plan: ScenarioPlan::Script { steps, expectation },
    }
}

fn smoke() -> TestScenario {
    let mut steps = vec!["new".to_string()];
    steps.extend(
        Mode::ALL
            .iter()
            .skip(1)
            .chain(std::iter::once(&Mode::Addition))
            .map(|mode| format!("mode {mode}")),
    );
    script_scenario(
        "smoke",
        "Generate a problem in every mode",
        steps,
        expect_smoke,
    )
}

fn expect_smoke(run: &ScriptRun) -> Result<()> {
    ensure!(
        run.feedback.iter().all(Result::is_ok),
        "mode switch failed: {:?}",
        run.feedback
    );
    ensure!(
        run.notifications == run.feedback.len(),
        "expected one notification per command, got {}",
        run.notifications
    );
    ensure!(run.state.mode == Mode::Addition, "ended in {}", run.state.mode);
    ensure!(!run.state.is_complete(), "fresh problem already complete");
    Ok(())
}

fn decade_walk() -> TestScenario {
    script_scenario(
        "decade-walk",
        "20 + 45 by four decades and a five, then undo",
        script(&["custom 20 45", "+10", "+10", "+10", "+10", "+5", "undo"]),
        expect_decade_walk,
    )
}

fn expect_decade_walk(run: &ScriptRun) -> Result<()> {
    ensure!(
        run.feedback_at(5) == Some(Feedback::Complete),
        "final +5 did not complete: {:?}",
        run.feedback.get(5)
    );
    ensure!(
        run.state.current_sum == 60,
        "undo left marker at {}",
        run.state.current_sum
    );
    ensure!(run.state.jumps.len() == 4, "log length {}", run.state.jumps.len());
    Ok(())
}

fn auto_group() -> TestScenario {
    let mut steps = script(&["custom 20 15"]);
    steps.extend(repeated("+1", 11));
    script_scenario(
        "auto-group",
        "Ten unit jumps collapse into one decade, the eleventh stays separate",
        steps,
        expect_auto_group,
    )
}

fn expect_auto_group(run: &ScriptRun) -> Result<()> {
    let jumps = run.state.jumps.as_slice();
    ensure!(jumps.len() == 2, "expected two log entries, got {}", jumps.len());
    let grouped = jumps[0];
    ensure!(
        grouped.is_grouped && grouped.amount == 10 && grouped.from == 20 && grouped.to == 30,
        "unexpected grouped jump {grouped:?}"
    );
    ensure!(!jumps[1].is_grouped, "eleventh unit jump was merged");
    ensure!(run.state.current_sum == 31, "marker at {}", run.state.current_sum);
    Ok(())
}

fn undo_grouped() -> TestScenario {
    let mut steps = script(&["custom 20 15", "+2"]);
    steps.extend(repeated("+1", 10));
    steps.push("undo".to_string());
    script_scenario(
        "undo-grouped",
        "Undo removes a grouped decade in one step",
        steps,
        expect_undo_grouped,
    )
}

fn expect_undo_grouped(run: &ScriptRun) -> Result<()> {
    ensure!(run.state.current_sum == 22, "marker at {}", run.state.current_sum);
    ensure!(run.state.jumps.len() == 1, "log length {}", run.state.jumps.len());
    ensure!(run.state.grouped_jumps() == 0, "grouped jump survived undo");
    Ok(())
}

fn subtraction_guard() -> TestScenario {
    let mut steps = script(&["mode subtraction"]);
    steps.extend(repeated("-1", SUBTRACTION_UNIT_STEPS));
    script_scenario(
        "subtraction-guard",
        "Unit jumps down a subtraction problem stop at the target",
        steps,
        expect_subtraction_guard,
    )
}

/// More unit steps than the default subtraction amount can absorb.
const SUBTRACTION_UNIT_STEPS: usize = 40;

fn expect_subtraction_guard(run: &ScriptRun) -> Result<()> {
    let state = &run.state;
    let accepted = run
        .feedback
        .iter()
        .skip(1)
        .filter(|f| matches!(f, Ok(Feedback::Moved | Feedback::Complete)))
        .count();
    let covered = i32::try_from(accepted)?;
    ensure!(
        state.current_sum == state.start_number() - covered,
        "marker at {} after {accepted} accepted jumps from {}",
        state.current_sum,
        state.start_number()
    );
    ensure!(
        state.current_sum >= state.target_sum(),
        "marker {} passed below target {}",
        state.current_sum,
        state.target_sum()
    );
    if state.is_complete() && accepted < SUBTRACTION_UNIT_STEPS {
        ensure!(
            run.last_feedback() == Some(Feedback::Shake),
            "jump past the target was accepted"
        );
    }
    let expected_groups = usize::try_from(-state.problem.change() / 10)?;
    ensure!(
        !state.is_complete() || state.grouped_jumps() == expected_groups,
        "{} grouped jumps, expected {expected_groups}",
        state.grouped_jumps()
    );
    Ok(())
}

fn commutative_swap() -> TestScenario {
    script_scenario(
        "commutative-swap",
        "Swapping twice restores the addends and clears progress",
        script(&["mode commutative", "custom 20 45", "+10", "swap", "swap"]),
        expect_commutative_swap,
    )
}

fn expect_commutative_swap(run: &ScriptRun) -> Result<()> {
    ensure!(run.state.start_number() == 20, "start {}", run.state.start_number());
    ensure!(run.state.target_sum() == 65, "target {}", run.state.target_sum());
    ensure!(run.state.jumps.is_empty(), "swap kept history");
    ensure!(run.state.current_sum == 20, "marker at {}", run.state.current_sum);
    Ok(())
}

fn input_validation() -> TestScenario {
    script_scenario(
        "input-validation",
        "Malformed input never reaches the tracker",
        script(&["add 0", "sub -4", "custom -1 5", "custom 4 0", "mode division", "add x"]),
        expect_input_validation,
    )
}

fn expect_input_validation(run: &ScriptRun) -> Result<()> {
    ensure!(
        run.feedback.iter().all(Result::is_err),
        "some malformed input was accepted: {:?}",
        run.feedback
    );
    ensure!(run.notifications == 0, "tracker notified {} times", run.notifications);
    Ok(())
}

fn solve(name: &'static str, description: &'static str, strategy: SolveStrategy) -> TestScenario {
    TestScenario {
        name,
        description,
        plan: ScenarioPlan::Solve {
            strategy,
            max_moves: 500,
        },
    }
}

#[must_use]
pub fn catalog() -> Vec<TestScenario> {
    vec![
        smoke(),
        decade_walk(),
        auto_group(),
        undo_grouped(),
        subtraction_guard(),
        commutative_swap(),
        input_validation(),
        solve(
            "greedy-solve",
            "Play every mode to completion with decade jumps first",
            SolveStrategy::Greedy,
        ),
        solve(
            "unit-solve",
            "Play every mode to completion with unit jumps only",
            SolveStrategy::Units,
        ),
    ]
}

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog()
        .into_iter()
        .map(|scenario| (scenario.name, scenario.description))
        .collect()
}

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    catalog().into_iter().find(|scenario| scenario.name == name)
}

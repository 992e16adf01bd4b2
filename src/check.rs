//! Batch checker: runs a list of expressions against a list of expected
//! results and reports which ones agree after formatting.

use std::fmt::Display;

use log::{debug, info};
use miette::Diagnostic;
use thiserror::Error;

use crate::{Calculator, format_value};

#[derive(Error, Debug, Diagnostic)]
pub enum CheckError {
    #[error("test and expected results files are of different length ({tests} vs {expected})")]
    #[diagnostic(
        code(check::length_mismatch),
        help("put one expected result per line, in the same order as the tests")
    )]
    LengthMismatch { tests: usize, expected: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaseOutcome {
    Passed { got: String },
    Failed { got: String },
    Errored { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseReport {
    /// 1-based position in the batch.
    pub number: usize,
    pub expression: String,
    pub expected: String,
    pub outcome: CaseOutcome,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, CaseOutcome::Passed { .. })
    }
}

impl Display for CaseReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let number = self.number;
        let expected = &self.expected;
        match &self.outcome {
            CaseOutcome::Passed { got } => {
                write!(f, "Passed Test {number}. Got {got} which matches {expected}.")
            }
            CaseOutcome::Failed { got } => {
                write!(f, "Failed Test {number}. Expected {expected} but got {got}.")
            }
            CaseOutcome::Errored { message } => write!(
                f,
                "Failed Test {number}. Expected {expected} but `{}` errored: {message}",
                self.expression
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub cases: Vec<CaseReport>,
}

impl BatchReport {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|case| case.passed()).count()
    }

    pub fn total(&self) -> usize {
        self.cases.len()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }
}

impl Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Passed {} of {} tests.", self.passed(), self.total())
    }
}

/// Lines of a batch file, in order, without the blank lines around them.
/// A blank line inside the batch stays, so the two files keep lining up.
pub fn lines(contents: &str) -> Vec<&str> {
    contents.trim().lines().map(str::trim_end).collect()
}

/// Formats an expected result the same way a computed one would be.
fn expected_display(expected: &str) -> Option<String> {
    match expected.trim() {
        "∞" => Some(format_value(f64::INFINITY)),
        "-∞" => Some(format_value(f64::NEG_INFINITY)),
        other => other.parse::<f64>().ok().map(format_value),
    }
}

fn check_case(calculator: &Calculator, number: usize, expression: &str, expected: &str) -> CaseReport {
    let outcome = match (calculator.evaluate(expression), expected_display(expected)) {
        (_, None) => CaseOutcome::Errored {
            message: format!("expected value '{expected}' is not a number"),
        },
        (Err(e), Some(_)) => CaseOutcome::Errored {
            message: e.to_string(),
        },
        (Ok(evaluation), Some(want)) if evaluation.display == want => CaseOutcome::Passed {
            got: evaluation.display,
        },
        (Ok(evaluation), Some(_)) => CaseOutcome::Failed {
            got: evaluation.display,
        },
    };
    debug!("case {number} `{expression}`: {outcome:?}");

    CaseReport {
        number,
        expression: expression.to_string(),
        expected: expected.to_string(),
        outcome,
    }
}

/// Pairs the lines of `tests` with the lines of `expected` and evaluates
/// each pair.
pub fn run_batch(
    calculator: &Calculator,
    tests: &str,
    expected: &str,
) -> Result<BatchReport, CheckError> {
    let tests = lines(tests);
    let expected = lines(expected);
    if tests.len() != expected.len() {
        return Err(CheckError::LengthMismatch {
            tests: tests.len(),
            expected: expected.len(),
        });
    }

    let cases = tests
        .into_iter()
        .zip(expected)
        .enumerate()
        .map(|(i, (expression, expected))| check_case(calculator, i + 1, expression, expected))
        .collect();
    let report = BatchReport { cases };
    info!("{report}");
    Ok(report)
}

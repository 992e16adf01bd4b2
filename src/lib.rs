//! Arithmetic expression calculator built on a binding-power
//! (precedence-climbing) evaluator.
//!
//! A line flows through [`validate`], [`lex`], [`eval`] and finally
//! [`format`]. Every call to [`Calculator::evaluate`] starts from fresh
//! cursor state, so evaluating the same line twice always agrees.

use log::debug;
use miette::Diagnostic;
use thiserror::Error;

pub mod check;
pub mod eval;
pub mod format;
pub mod lex;
pub mod repl;
pub mod validate;

pub use eval::{Evaluator, ParseError};
pub use format::{Evaluation, NumericAnomaly, format_value};
pub use lex::{LexError, Lexer, Token, TokenKind};
pub use validate::ValidationError;

#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Nested sub-expressions allowed before evaluation is abandoned.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_depth: eval::DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Calculator {
    options: Options,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Calculator { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn evaluate(&self, input: &str) -> Result<Evaluation, Error> {
        validate::validate(input).inspect_err(|e| debug!("rejected {input:?}: {e}"))?;

        let tokens = lex::tokenize(input).inspect_err(|e| debug!("lexing {input:?} failed: {e}"))?;

        let value = Evaluator::with_max_depth(input, tokens, self.options.max_depth)
            .evaluate()
            .inspect_err(|e| debug!("evaluating {input:?} failed: {e}"))?;

        Ok(Evaluation::from_value(value))
    }
}

/// Evaluates one line with default options.
pub fn evaluate(input: &str) -> Result<Evaluation, Error> {
    Calculator::new().evaluate(input)
}

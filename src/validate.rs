//! Structural checks run on a raw line before it reaches the lexer.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::lex::named_source;

#[derive(Error, Debug, Diagnostic)]
pub enum ValidationError {
    #[error("please enter a valid expression")]
    #[diagnostic(
        code(validate::disallowed_character),
        help("only [()], [0-9], [.], [+-*/], [^] and spaces are supported; remove `{token}`")
    )]
    DisallowedCharacter {
        #[source_code]
        src: NamedSource<String>,

        #[label("this character")]
        bad_bit: SourceSpan,

        token: char,
    },

    #[error("expression has unmatched brackets")]
    #[diagnostic(
        code(validate::unmatched_brackets),
        help("every '(' needs a ')' after it, and every ')' a '(' before it")
    )]
    UnmatchedBrackets {
        #[source_code]
        src: NamedSource<String>,

        #[label("this bracket has no partner")]
        bad_bit: SourceSpan,
    },
}

fn is_allowed(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | '0'..='9' | '.' | '+' | '-' | '*' | '/' | '^' | ' '
    )
}

/// True iff every character belongs to the calculator's alphabet. Empty
/// input passes.
pub fn is_valid_expression(text: &str) -> bool {
    text.chars().all(is_allowed)
}

/// True iff peeling innermost `()` pairs would leave no bracket behind: the
/// open count never drops below zero and ends at zero. One pass over the
/// input, however deep the nesting.
pub fn has_matched_brackets(text: &str) -> bool {
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

/// Byte offset of the first bracket without a partner: a `)` closing
/// nothing, or else the earliest `(` still open at the end.
fn unmatched_bracket(text: &str) -> Option<usize> {
    let mut open = Vec::new();
    for (offset, c) in text.char_indices() {
        match c {
            '(' => open.push(offset),
            ')' => {
                if open.pop().is_none() {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    open.first().copied()
}

/// Runs both checks in order, reporting the first failure.
pub fn validate(text: &str) -> Result<(), ValidationError> {
    if let Some((offset, token)) = text.char_indices().find(|&(_, c)| !is_allowed(c)) {
        return Err(ValidationError::DisallowedCharacter {
            src: named_source(text),
            bad_bit: SourceSpan::from(offset..offset + token.len_utf8()),
            token,
        });
    }

    if !has_matched_brackets(text) {
        let offset = unmatched_bracket(text).unwrap_or(0);
        return Err(ValidationError::UnmatchedBrackets {
            src: named_source(text),
            bad_bit: SourceSpan::from(offset..offset + 1),
        });
    }

    Ok(())
}

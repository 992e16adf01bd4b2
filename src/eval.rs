use std::num::ParseFloatError;

use log::trace;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::lex::{Token, TokenKind, named_source};

/// Deepest chain of nested sub-expressions evaluated before giving up.
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Error, Debug, Diagnostic)]
pub enum ParseError {
    #[error("unexpected token '{token}'")]
    #[diagnostic(
        code(parse::unexpected_token),
        help("a number, '-' or '(' is expected here")
    )]
    UnexpectedToken {
        #[source_code]
        src: NamedSource<String>,

        #[label("here")]
        bad_bit: SourceSpan,

        token: String,
    },

    #[error("'{token}' cannot join two operands")]
    #[diagnostic(code(parse::not_an_operator))]
    NotAnOperator {
        #[source_code]
        src: NamedSource<String>,

        #[label("here")]
        bad_bit: SourceSpan,

        token: String,
    },

    #[error("unexpected end of input")]
    #[diagnostic(
        code(parse::unexpected_end),
        help("the expression ended where an operand was expected")
    )]
    UnexpectedEnd {
        #[source_code]
        src: NamedSource<String>,

        #[label("expression ends here")]
        bad_bit: SourceSpan,
    },

    #[error("unnecessary brackets")]
    #[diagnostic(
        code(parse::empty_brackets),
        help("there isn't anything in the brackets")
    )]
    EmptyBrackets {
        #[source_code]
        src: NamedSource<String>,

        #[label("empty")]
        bad_bit: SourceSpan,
    },

    #[error("expected closing bracket")]
    #[diagnostic(code(parse::expected_closing_bracket), help("use `)` here instead"))]
    ExpectedClosingBracket {
        #[source_code]
        src: NamedSource<String>,

        #[label("here")]
        bad_bit: SourceSpan,

        #[label("to close this bracket")]
        opened: SourceSpan,
    },

    #[error("unexpected trailing token '{token}'")]
    #[diagnostic(
        code(parse::trailing_token),
        help("the expression is already complete; remove the rest or join it with an operator")
    )]
    TrailingToken {
        #[source_code]
        src: NamedSource<String>,

        #[label("nothing may follow the expression")]
        bad_bit: SourceSpan,

        token: String,
    },

    #[error("invalid number literal '{literal}'")]
    #[diagnostic(code(parse::invalid_number))]
    InvalidNumber {
        #[source_code]
        src: NamedSource<String>,

        #[label("this numeric literal")]
        bad_bit: SourceSpan,

        literal: String,

        #[source]
        source: ParseFloatError,
    },

    #[error("expression nests deeper than {limit} levels")]
    #[diagnostic(
        code(parse::nesting_too_deep),
        help("split the expression or remove redundant brackets and signs")
    )]
    NestingTooDeep {
        #[source_code]
        src: NamedSource<String>,

        #[label("limit reached here")]
        bad_bit: SourceSpan,

        limit: usize,
    },
}

/// Left and right binding power of an infix operator. The right side of `^`
/// binds one weaker than its left, which makes it right-associative.
fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
    match kind {
        TokenKind::Add | TokenKind::Subtract => Some((10, 10)),
        TokenKind::Multiply | TokenKind::Divide => Some((20, 20)),
        TokenKind::Power => Some((30, 29)),
        _ => None,
    }
}

/// Unary minus sits between `* /` and `^`: `-2^2` is `-(2^2)`.
fn prefix_binding_power(kind: TokenKind) -> Option<((), u8)> {
    match kind {
        TokenKind::Subtract => Some(((), 25)),
        _ => None,
    }
}

/// Single-pass precedence-climbing evaluator over one line's tokens.
///
/// The value is computed while parsing; no tree is built. A fresh evaluator
/// is needed for every expression, `evaluate` consumes it.
pub struct Evaluator<'de> {
    whole: &'de str,
    tokens: Vec<Token<'de>>,
    cursor: usize,
    lookahead: Token<'de>,
    depth: usize,
    max_depth: usize,
}

impl<'de> Evaluator<'de> {
    pub fn new(whole: &'de str, tokens: Vec<Token<'de>>) -> Self {
        Self::with_max_depth(whole, tokens, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(whole: &'de str, tokens: Vec<Token<'de>>, max_depth: usize) -> Self {
        let mut evaluator = Evaluator {
            whole,
            tokens,
            cursor: 0,
            lookahead: Token::end_of_input(whole),
            depth: 0,
            max_depth,
        };
        evaluator.advance();
        evaluator
    }

    /// Evaluates the whole sequence. Tokens left over after a complete
    /// expression are an error.
    pub fn evaluate(mut self) -> Result<f64, ParseError> {
        let value = self.evaluate_within(0)?;
        if self.lookahead.kind != TokenKind::EndOfInput {
            return Err(ParseError::TrailingToken {
                src: named_source(self.whole),
                bad_bit: self.lookahead.span(),
                token: self.lookahead.literal.to_string(),
            });
        }
        Ok(value)
    }

    /// Returns the current lookahead and moves the next token into its place.
    /// Past the end, the lookahead stays `EndOfInput`.
    fn advance(&mut self) -> Token<'de> {
        let next = match self.tokens.get(self.cursor) {
            Some(token) => {
                self.cursor += 1;
                *token
            }
            None => Token::end_of_input(self.whole),
        };
        std::mem::replace(&mut self.lookahead, next)
    }

    pub fn evaluate_within(&mut self, min_bp: u8) -> Result<f64, ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::NestingTooDeep {
                src: named_source(self.whole),
                bad_bit: self.lookahead.span(),
                limit: self.max_depth,
            });
        }

        self.depth += 1;
        let value = self.climb(min_bp);
        self.depth -= 1;
        value
    }

    fn climb(&mut self, min_bp: u8) -> Result<f64, ParseError> {
        let token = self.advance();
        let mut lhs = self.prefix(token)?;

        while self.lookahead.binding_power() > min_bp {
            let op = self.advance();
            lhs = self.infix(op, lhs)?;
        }

        Ok(lhs)
    }

    fn prefix(&mut self, token: Token<'de>) -> Result<f64, ParseError> {
        trace!("prefix {:?} `{}` at {}", token.kind, token.literal, token.offset);

        match token.kind {
            TokenKind::Number => {
                token
                    .literal
                    .parse()
                    .map_err(|source| ParseError::InvalidNumber {
                        src: named_source(self.whole),
                        bad_bit: token.span(),
                        literal: token.literal.to_string(),
                        source,
                    })
            }
            TokenKind::LeftParen => {
                if self.lookahead.kind == TokenKind::RightParen {
                    let close = self.lookahead;
                    return Err(ParseError::EmptyBrackets {
                        src: named_source(self.whole),
                        bad_bit: SourceSpan::from(token.offset..close.offset + close.literal.len()),
                    });
                }

                let value = self.evaluate_within(0)?;
                if self.lookahead.kind != TokenKind::RightParen {
                    return Err(ParseError::ExpectedClosingBracket {
                        src: named_source(self.whole),
                        bad_bit: self.lookahead.span(),
                        opened: token.span(),
                    });
                }
                self.advance();
                Ok(value)
            }
            TokenKind::EndOfInput => Err(ParseError::UnexpectedEnd {
                src: named_source(self.whole),
                bad_bit: token.span(),
            }),
            kind => match prefix_binding_power(kind) {
                Some(((), r_bp)) => Ok(-self.evaluate_within(r_bp)?),
                None => Err(ParseError::UnexpectedToken {
                    src: named_source(self.whole),
                    bad_bit: token.span(),
                    token: token.literal.to_string(),
                }),
            },
        }
    }

    fn infix(&mut self, op: Token<'de>, lhs: f64) -> Result<f64, ParseError> {
        trace!("infix {:?} after {lhs} at {}", op.kind, op.offset);

        let Some((_, r_bp)) = infix_binding_power(op.kind) else {
            return Err(ParseError::NotAnOperator {
                src: named_source(self.whole),
                bad_bit: op.span(),
                token: op.literal.to_string(),
            });
        };
        let rhs = self.evaluate_within(r_bp)?;

        Ok(match op.kind {
            TokenKind::Add => lhs + rhs,
            TokenKind::Subtract => lhs - rhs,
            TokenKind::Multiply => lhs * rhs,
            TokenKind::Divide => lhs / rhs,
            TokenKind::Power => lhs.powf(rhs),
            _ => unreachable!("infix_binding_power only accepts binary operators"),
        })
    }
}

/// Evaluates a lexed line with default limits.
pub fn evaluate<'de>(whole: &'de str, tokens: Vec<Token<'de>>) -> Result<f64, ParseError> {
    Evaluator::new(whole, tokens).evaluate()
}

use std::fmt::Display;

use log::debug;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

pub(crate) fn named_source(whole: &str) -> NamedSource<String> {
    NamedSource::new("<input>", whole.to_string())
}

#[derive(Error, Debug, Diagnostic)]
pub enum LexError {
    #[error("digit must precede decimal point")]
    #[diagnostic(
        code(lex::stray_decimal_point),
        help(
            "have digits before '.' (e.g., 0.1 instead of .1); numbers can only have one '.' (e.g., no 1.1.1)"
        )
    )]
    StrayDecimalPoint {
        #[source_code]
        src: NamedSource<String>,

        #[label("this decimal point")]
        bad_bit: SourceSpan,
    },

    #[error("unknown character '{token}'")]
    #[diagnostic(
        code(lex::unknown_character),
        help("remove or correct the character: `{token}`")
    )]
    UnknownCharacter {
        #[source_code]
        src: NamedSource<String>,

        #[label("this character")]
        bad_bit: SourceSpan,

        token: char,
    },
}

impl LexError {
    /// Byte offset of the offending character.
    pub fn offset(&self) -> usize {
        match self {
            LexError::StrayDecimalPoint { bad_bit, .. }
            | LexError::UnknownCharacter { bad_bit, .. } => bad_bit.offset(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    LeftParen,
    RightParen,
    EndOfInput,
}

impl TokenKind {
    /// Left binding power in infix position. Kinds that cannot join two
    /// operands bind with 0, which always ends a precedence-climbing loop.
    pub fn binding_power(self) -> u8 {
        match self {
            TokenKind::Add | TokenKind::Subtract => 10,
            TokenKind::Multiply | TokenKind::Divide => 20,
            TokenKind::Power => 30,
            TokenKind::Number
            | TokenKind::LeftParen
            | TokenKind::RightParen
            | TokenKind::EndOfInput => 0,
        }
    }
}

impl<'de> Token<'de> {
    /// The synthetic token seen once the real sequence is exhausted.
    pub fn end_of_input(whole: &'de str) -> Self {
        Token {
            kind: TokenKind::EndOfInput,
            literal: "",
            offset: whole.len(),
        }
    }

    pub fn binding_power(&self) -> u8 {
        self.kind.binding_power()
    }

    pub fn span(&self) -> SourceSpan {
        SourceSpan::from(self.offset..self.offset + self.literal.len())
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::Number => match lit.parse::<f64>() {
                Ok(n) if n.fract() == 0.0 => write!(f, "NUMBER {lit} {n}.0"),
                Ok(n) => write!(f, "NUMBER {lit} {n}"),
                Err(_) => write!(f, "NUMBER {lit} null"),
            },
            TokenKind::Add => write!(f, "ADD {lit} null"),
            TokenKind::Subtract => write!(f, "SUBTRACT {lit} null"),
            TokenKind::Multiply => write!(f, "MULTIPLY {lit} null"),
            TokenKind::Divide => write!(f, "DIVIDE {lit} null"),
            TokenKind::Power => write!(f, "POWER {lit} null"),
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit} null"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit} null"),
            TokenKind::EndOfInput => write!(f, "EOF {lit} null"),
        }
    }
}

pub struct Lexer<'de> {
    whole: &'de str,
    rest: &'de str,
    byte: usize,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            rest: input,
            byte: 0,
        }
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let literal = &self.rest[..c.len_utf8()];
            let cur = self.rest;
            let offset = self.byte;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            let process = |kind: TokenKind| {
                Some(Ok(Token {
                    kind,
                    literal,
                    offset,
                }))
            };

            match c {
                '(' => return process(TokenKind::LeftParen),
                ')' => return process(TokenKind::RightParen),
                '+' => return process(TokenKind::Add),
                '-' => return process(TokenKind::Subtract),
                '*' => return process(TokenKind::Multiply),
                '/' => return process(TokenKind::Divide),
                '^' => return process(TokenKind::Power),
                ' ' => continue,
                '0'..='9' => {
                    let digits = |s: &str| {
                        s.find(|c: char| !c.is_ascii_digit())
                            .unwrap_or(s.len())
                    };

                    let mut end = digits(cur);
                    // A fraction needs at least one digit after the point; a
                    // second point stays behind for the next call to reject.
                    if let Some(fraction) = cur[end..].strip_prefix('.') {
                        let fraction_digits = digits(fraction);
                        if fraction_digits > 0 {
                            end += 1 + fraction_digits;
                        }
                    }

                    let literal = &cur[..end];
                    let extra_bytes = literal.len() - c.len_utf8();
                    self.byte += extra_bytes;
                    self.rest = &self.rest[extra_bytes..];

                    return Some(Ok(Token {
                        kind: TokenKind::Number,
                        literal,
                        offset,
                    }));
                }
                '.' => {
                    return Some(Err(LexError::StrayDecimalPoint {
                        src: named_source(self.whole),
                        bad_bit: SourceSpan::from(offset..self.byte),
                    }));
                }
                c => {
                    return Some(Err(LexError::UnknownCharacter {
                        src: named_source(self.whole),
                        bad_bit: SourceSpan::from(offset..self.byte),
                        token: c,
                    }));
                }
            }
        }
    }
}

/// Lexes the whole input, stopping at the first lexical error.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    let tokens = Lexer::new(input).collect::<Result<Vec<_>, _>>()?;
    debug!("lexed {} tokens from {input:?}", tokens.len());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .expect("input should lex")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn lexes_every_operator() {
        assert_eq!(
            kinds("( ) + - * / ^"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Add,
                TokenKind::Subtract,
                TokenKind::Multiply,
                TokenKind::Divide,
                TokenKind::Power,
            ]
        );
    }

    #[test]
    fn number_spans_integer_and_fraction() {
        let tokens = tokenize("12.75+3").unwrap();
        assert_eq!(tokens[0].literal, "12.75");
        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[1].kind, TokenKind::Add);
        assert_eq!(tokens[1].offset, 5);
        assert_eq!(tokens[2].literal, "3");
        assert_eq!(tokens[2].offset, 6);
    }

    #[test]
    fn tokens_follow_source_order_and_skip_spaces() {
        let tokens = tokenize("  1 +   22 ").unwrap();
        let literals: Vec<_> = tokens.iter().map(|t| t.literal).collect();
        assert_eq!(literals, vec!["1", "+", "22"]);
        for token in &tokens {
            assert_eq!(
                &"  1 +   22 "[token.offset..token.offset + token.literal.len()],
                token.literal
            );
        }
    }

    #[test]
    fn leading_decimal_point_is_rejected() {
        let err = tokenize(".5").unwrap_err();
        assert!(matches!(err, LexError::StrayDecimalPoint { .. }));
        assert_eq!(err.offset(), 0);
        assert_eq!(err.to_string(), "digit must precede decimal point");
    }

    #[test]
    fn second_decimal_point_is_rejected() {
        let err = tokenize("1.1.1").unwrap_err();
        assert!(matches!(err, LexError::StrayDecimalPoint { .. }));
        assert_eq!(err.offset(), 3);
    }

    #[test]
    fn point_without_fraction_digits_is_rejected() {
        let err = tokenize("1.+2").unwrap_err();
        assert!(matches!(err, LexError::StrayDecimalPoint { .. }));
        assert_eq!(err.offset(), 1);
    }

    #[test]
    fn unknown_character_is_reported() {
        let err = tokenize("2 % 3").unwrap_err();
        match err {
            LexError::UnknownCharacter { token, ref bad_bit, .. } => {
                assert_eq!(token, '%');
                assert_eq!(bad_bit.offset(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn binding_powers_match_precedence_table() {
        assert_eq!(TokenKind::Add.binding_power(), 10);
        assert_eq!(TokenKind::Subtract.binding_power(), 10);
        assert_eq!(TokenKind::Multiply.binding_power(), 20);
        assert_eq!(TokenKind::Divide.binding_power(), 20);
        assert_eq!(TokenKind::Power.binding_power(), 30);
        assert_eq!(TokenKind::Number.binding_power(), 0);
        assert_eq!(TokenKind::EndOfInput.binding_power(), 0);
    }

    #[test]
    fn display_matches_tokenize_output() {
        let tokens = tokenize("3 * 1.5").unwrap();
        let lines: Vec<_> = tokens.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec!["NUMBER 3 3.0", "MULTIPLY * null", "NUMBER 1.5 1.5"]
        );
        assert_eq!(Token::end_of_input("3").to_string(), "EOF  null");
    }
}

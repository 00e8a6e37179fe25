//! Token definitions for the expression language, lexed with `logos`.

use crate::error::ParserError;
use logos::{Logos, SpannedIter};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

#[derive(Logos, Clone, PartialEq, Debug)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token<'input> {
    #[token("and")]
    #[token("&&")]
    And,
    #[token("or")]
    #[token("||")]
    Or,
    #[token("not")]
    Not,
    #[token("in")]
    In,
    #[token("contains")]
    Contains,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("(")]
    LeftParenthesis,
    #[token(")")]
    RightParenthesis,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token("=")]
    Equal,
    #[token("<>")]
    NotEqual,
    #[token("<")]
    LessThan,
    #[token("<=")]
    LessThanEqual,
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterThanEqual,
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),
    #[regex(r"-?[0-9]+\.[0-9]+", |lex| Decimal::from_str(lex.slice()).ok())]
    Decimal(Decimal),
    #[regex(r#""[^"]*""#, trim_quotes)]
    #[regex(r"'[^']*'", trim_quotes)]
    String(&'input str),
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier(&'input str),
}

fn trim_quotes<'input>(
    lex: &mut logos::Lexer<'input, Token<'input>>,
) -> &'input str {
    let slice = lex.slice();
    &slice[1..slice.len() - 1]
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Not => write!(f, "not"),
            Self::In => write!(f, "in"),
            Self::Contains => write!(f, "contains"),
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::LeftParenthesis => write!(f, "("),
            Self::RightParenthesis => write!(f, ")"),
            Self::LeftBracket => write!(f, "["),
            Self::RightBracket => write!(f, "]"),
            Self::Comma => write!(f, ","),
            Self::Equal => write!(f, "="),
            Self::NotEqual => write!(f, "<>"),
            Self::LessThan => write!(f, "<"),
            Self::LessThanEqual => write!(f, "<="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterThanEqual => write!(f, ">="),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Identifier(name) => write!(f, "{name}"),
        }
    }
}

pub(crate) type Spanned<Token, Loc, Error> = Result<(Loc, Token, Loc), Error>;

/// Adapts the logos token stream to the spanned-triple iterator the generated
/// parser consumes.
pub(crate) struct Lexer<'input> {
    tokens: SpannedIter<'input, Token<'input>>,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        Self {
            tokens: Token::lexer(input).spanned(),
        }
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Spanned<Token<'input>, usize, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.tokens.next().map(|(token, span)| match token {
            Ok(token) => Ok((span.start, token, span.end)),
            Err(()) => Err(ParserError::Lexical(span.start)),
        })
    }
}

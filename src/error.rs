//! Error types, layered the way the operations are: schema construction,
//! event assembly, expression parsing, and subscription registration.

use crate::{lexer::Token, schema::AttributeKind};
use lalrpop_util::ParseError;
use thiserror::Error;

/// Errors detected while constructing a schema. Construction-time only: a
/// failed construction yields no usable index.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum SchemaError {
    #[error("attribute names must not be empty")]
    EmptyName,
    #[error("attribute {0:?} is declared twice")]
    DuplicateAttribute(String),
}

/// Errors raised while assembling an event against a schema.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum EventError {
    #[error("unknown attribute {0:?}")]
    UnknownAttribute(String),
    #[error("attribute {name:?} is declared as {expected:?} but was assigned a {found:?} value")]
    TypeMismatch {
        name: String,
        expected: AttributeKind,
        found: AttributeKind,
    },
    #[error("attribute {0:?} was assigned twice")]
    AlreadyDefined(String),
}

/// Lexical and semantic errors surfaced during an expression parse; carried
/// through the generated parser as its user error type.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParserError {
    #[error("unrecognized token at offset {0}")]
    Lexical(usize),
    #[error("membership lists must not be empty")]
    EmptyList,
    #[error("membership lists must contain only integers or only strings")]
    MixedList,
    #[error("unknown attribute {0:?}")]
    UnknownAttribute(String),
    #[error("attribute {name:?} is declared as {expected:?} but the operand requires {found:?}")]
    TypeMismatch {
        name: String,
        expected: AttributeKind,
        found: AttributeKind,
    },
}

/// Everything that can go wrong while parsing one expression.
pub type ExpressionParseError<'a> = ParseError<usize, Token<'a>, ParserError>;

/// Errors returned when registering a subscription.
#[derive(Debug, Error, PartialEq)]
pub enum PercolatorError<'a> {
    #[error("failed to parse the expression: {0}")]
    Parse(ExpressionParseError<'a>),
    #[error("unknown attribute {0:?}")]
    UnknownAttribute(String),
    #[error("attribute {name:?} is declared as {expected:?} but the operand requires {found:?}")]
    TypeMismatch {
        name: String,
        expected: AttributeKind,
        found: AttributeKind,
    },
    #[error("subscription {0} is already registered")]
    DuplicateSubscription(u64),
}

impl<'a> From<ExpressionParseError<'a>> for PercolatorError<'a> {
    fn from(error: ExpressionParseError<'a>) -> Self {
        match error {
            ParseError::User {
                error: ParserError::UnknownAttribute(name),
            } => Self::UnknownAttribute(name),
            ParseError::User {
                error:
                    ParserError::TypeMismatch {
                        name,
                        expected,
                        found,
                    },
            } => Self::TypeMismatch {
                name,
                expected,
                found,
            },
            error => Self::Parse(error),
        }
    }
}

//! A content-based publish/subscribe filtering engine: register boolean
//! *subscriptions* over a fixed attribute schema, then match partial *events*
//! against all of them at once.
//!
//! Structurally identical sub-expressions are shared across subscriptions in
//! one reference-counted DAG, so a search evaluates each distinct literal and
//! combinator at most once instead of walking every subscription separately.
//! Attributes an event leaves undefined evaluate with three-valued logic: a
//! subscription only matches when its whole expression is decidably true.
//!
//! # Examples
//!
//! ```
//! use percolator::{AttributeDefinition, Percolator};
//!
//! let mut percolator = Percolator::new(&[
//!     AttributeDefinition::boolean("private"),
//!     AttributeDefinition::integer("exchange_id"),
//!     AttributeDefinition::string("country"),
//!     AttributeDefinition::string_list("deal_ids"),
//! ]).unwrap();
//!
//! percolator.insert(1, r#"deal_ids contains "deal-1""#).unwrap();
//! percolator.insert(2, "exchange_id = 5 and country in ('US', 'CA')").unwrap();
//!
//! let mut builder = percolator.make_event();
//! builder.with_integer("exchange_id", 5).unwrap();
//! builder.with_string("country", "US").unwrap();
//! builder.with_string_list("deal_ids", &["deal-2", "deal-3"]).unwrap();
//! let event = builder.build();
//!
//! let report = percolator.search(&event);
//! assert_eq!(&[2], report.matches());
//! ```
//!
//! # Expression language
//!
//! * Boolean attributes stand alone as variables (`private`) or compare
//!   against `true`/`false`;
//! * Equality: `=` and `<>`, for booleans, integers, floats and strings;
//! * Comparison: `<`, `<=`, `>`, `>=`, for integers and floats (floats are
//!   exact scaled decimals, never binary floating point);
//! * Membership: `attribute in (…)` and `attribute not in (…)` test a scalar
//!   attribute against a literal list, written with parentheses or brackets;
//! * Containment: `attribute contains value` tests a list attribute for one
//!   element;
//! * Conjunction and disjunction: `and`/`&&` binds tighter than `or`/`||`;
//!   parentheses group.
//!
//! Undefined attributes make the literals that test them undefined rather
//! than false, `and`/`or` combine the three truth values the usual way, and
//! only a root that comes out true is a match.
mod ast;
mod error;
mod events;
mod graphviz;
mod index;
mod lexer;
mod parser;
mod predicates;
mod schema;
mod search;
mod strings;

pub use crate::{
    error::{
        EventError, ExpressionParseError, ParserError, PercolatorError, SchemaError,
    },
    events::{Event, EventBuilder},
    index::Percolator,
    lexer::Token,
    schema::{AttributeDefinition, AttributeKind},
    search::Report,
};

//! Typed predicate literals: one attribute tested against one operand.
//!
//! Operands are normalized on construction (lists sorted and deduplicated,
//! decimals reduced to their canonical scale, integer literals promoted for
//! `Float` attributes) so that structurally equivalent literals compare equal
//! and land on the same shared node.

use crate::{
    error::ParserError,
    events::AttributeValue,
    schema::{AttributeId, AttributeKind, Schema},
    strings::{StringId, StringTable},
};
use itertools::Itertools;
use rust_decimal::Decimal;
use std::fmt::Write;

#[derive(Clone, Eq, Hash, PartialEq, Debug)]
pub(crate) struct Predicate {
    attribute: AttributeId,
    kind: PredicateKind,
}

#[derive(Clone, Eq, Hash, PartialEq, Debug)]
pub(crate) enum PredicateKind {
    Equality(EqualityOperator, ScalarOperand),
    Comparison(ComparisonOperator, NumericOperand),
    Membership(MembershipOperator, ListOperand),
    Contains(ScalarOperand),
}

#[derive(Clone, Copy, Eq, Hash, PartialEq, Debug)]
pub(crate) enum EqualityOperator {
    Equal,
    NotEqual,
}

impl EqualityOperator {
    fn apply<T: PartialEq>(self, left: &T, right: &T) -> bool {
        match self {
            Self::Equal => *left == *right,
            Self::NotEqual => *left != *right,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "<>",
        }
    }
}

#[derive(Clone, Copy, Eq, Hash, PartialEq, Debug)]
pub(crate) enum ComparisonOperator {
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
}

impl ComparisonOperator {
    /// The operator with its operands swapped, for `value op attribute`
    /// spellings (`15 < price` is `price > 15`).
    pub fn mirrored(self) -> Self {
        match self {
            Self::LessThan => Self::GreaterThan,
            Self::LessThanEqual => Self::GreaterThanEqual,
            Self::GreaterThan => Self::LessThan,
            Self::GreaterThanEqual => Self::LessThanEqual,
        }
    }

    fn apply<T: PartialOrd>(self, left: &T, right: &T) -> bool {
        match self {
            Self::LessThan => *left < *right,
            Self::LessThanEqual => *left <= *right,
            Self::GreaterThan => *left > *right,
            Self::GreaterThanEqual => *left >= *right,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
        }
    }
}

#[derive(Clone, Copy, Eq, Hash, PartialEq, Debug)]
pub(crate) enum MembershipOperator {
    In,
    NotIn,
}

#[derive(Clone, Eq, Hash, PartialEq, Debug)]
pub(crate) enum ScalarOperand {
    Boolean(bool),
    Integer(i64),
    Float(Decimal),
    String(StringId),
}

#[derive(Clone, Eq, Hash, PartialEq, Debug)]
pub(crate) enum NumericOperand {
    Integer(i64),
    Float(Decimal),
}

#[derive(Clone, Eq, Hash, PartialEq, Debug)]
pub(crate) enum ListOperand {
    Integers(Vec<i64>),
    Strings(Vec<StringId>),
}

impl ListOperand {
    /// Builds a homogeneous list operand from parsed elements, rejecting
    /// empty and mixed lists.
    pub fn homogeneous(elements: Vec<ScalarOperand>) -> Result<Self, ParserError> {
        let Some(first) = elements.first() else {
            return Err(ParserError::EmptyList);
        };
        match first {
            ScalarOperand::Integer(_) => elements
                .iter()
                .map(|element| match element {
                    ScalarOperand::Integer(value) => Ok(*value),
                    _ => Err(ParserError::MixedList),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Integers),
            ScalarOperand::String(_) => elements
                .iter()
                .map(|element| match element {
                    ScalarOperand::String(value) => Ok(*value),
                    _ => Err(ParserError::MixedList),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Strings),
            _ => Err(ParserError::MixedList),
        }
    }
}

impl Predicate {
    /// Resolves the attribute name, checks the operand against the declared
    /// kind and normalizes it into its canonical form.
    pub fn new(schema: &Schema, name: &str, kind: PredicateKind) -> Result<Self, ParserError> {
        let attribute = schema
            .resolve(name)
            .ok_or_else(|| ParserError::UnknownAttribute(name.to_owned()))?;
        let expected = schema.kind(attribute);
        let kind = normalize(name, kind, expected)?;
        Ok(Self { attribute, kind })
    }

    /// A bare boolean attribute; shares its node with the `name = true`
    /// spelling.
    pub fn variable(schema: &Schema, name: &str) -> Result<Self, ParserError> {
        Self::new(
            schema,
            name,
            PredicateKind::Equality(EqualityOperator::Equal, ScalarOperand::Boolean(true)),
        )
    }

    pub fn attribute(&self) -> AttributeId {
        self.attribute
    }

    /// Applies the predicate to a defined event value. Undefined attributes
    /// never reach this point; the search layer keeps them tri-state.
    pub fn evaluate(&self, value: &AttributeValue) -> bool {
        match (&self.kind, value) {
            (PredicateKind::Equality(operator, operand), value) => {
                equality(*operator, operand, value)
            }
            (PredicateKind::Comparison(operator, operand), value) => {
                comparison(*operator, operand, value)
            }
            (PredicateKind::Membership(operator, operand), value) => {
                membership(*operator, operand, value)
            }
            (PredicateKind::Contains(operand), value) => contains(operand, value),
        }
    }

    /// Human-readable form for the graphviz export.
    pub fn render(&self, schema: &Schema, strings: &StringTable) -> String {
        let name = schema.name(self.attribute);
        match &self.kind {
            PredicateKind::Equality(operator, operand) => {
                format!("{name} {} {}", operator.symbol(), render_scalar(operand, strings))
            }
            PredicateKind::Comparison(operator, operand) => {
                let operand = match operand {
                    NumericOperand::Integer(value) => value.to_string(),
                    NumericOperand::Float(value) => value.to_string(),
                };
                format!("{name} {} {operand}", operator.symbol())
            }
            PredicateKind::Membership(operator, operand) => {
                let operator = match operator {
                    MembershipOperator::In => "in",
                    MembershipOperator::NotIn => "not in",
                };
                format!("{name} {operator} {}", render_list(operand, strings))
            }
            PredicateKind::Contains(operand) => {
                format!("{name} contains {}", render_scalar(operand, strings))
            }
        }
    }
}

/// The attribute kind an operand calls for, reported on mismatches.
fn operand_requirement(kind: &PredicateKind) -> AttributeKind {
    match kind {
        PredicateKind::Equality(_, ScalarOperand::Boolean(_)) => AttributeKind::Boolean,
        PredicateKind::Equality(_, ScalarOperand::Integer(_))
        | PredicateKind::Comparison(_, NumericOperand::Integer(_))
        | PredicateKind::Membership(_, ListOperand::Integers(_)) => AttributeKind::Integer,
        PredicateKind::Equality(_, ScalarOperand::Float(_))
        | PredicateKind::Comparison(_, NumericOperand::Float(_)) => AttributeKind::Float,
        PredicateKind::Equality(_, ScalarOperand::String(_))
        | PredicateKind::Membership(_, ListOperand::Strings(_)) => AttributeKind::String,
        PredicateKind::Contains(ScalarOperand::Integer(_)) => AttributeKind::IntegerList,
        PredicateKind::Contains(ScalarOperand::String(_)) => AttributeKind::StringList,
        // The grammar only builds `contains` with integer or string operands.
        PredicateKind::Contains(ScalarOperand::Boolean(_)) => AttributeKind::Boolean,
        PredicateKind::Contains(ScalarOperand::Float(_)) => AttributeKind::Float,
    }
}

fn normalize(
    name: &str,
    kind: PredicateKind,
    expected: AttributeKind,
) -> Result<PredicateKind, ParserError> {
    use AttributeKind::*;
    use PredicateKind::*;

    let normalized = match (expected, kind) {
        (Boolean, Equality(operator, ScalarOperand::Boolean(value))) => {
            Equality(operator, ScalarOperand::Boolean(value))
        }
        (Integer, Equality(operator, ScalarOperand::Integer(value))) => {
            Equality(operator, ScalarOperand::Integer(value))
        }
        (Float, Equality(operator, ScalarOperand::Integer(value))) => {
            Equality(operator, ScalarOperand::Float(Decimal::from(value)))
        }
        (Float, Equality(operator, ScalarOperand::Float(value))) => {
            Equality(operator, ScalarOperand::Float(value.normalize()))
        }
        (String, Equality(operator, ScalarOperand::String(value))) => {
            Equality(operator, ScalarOperand::String(value))
        }
        (Integer, Comparison(operator, NumericOperand::Integer(value))) => {
            Comparison(operator, NumericOperand::Integer(value))
        }
        (Float, Comparison(operator, NumericOperand::Integer(value))) => {
            Comparison(operator, NumericOperand::Float(Decimal::from(value)))
        }
        (Float, Comparison(operator, NumericOperand::Float(value))) => {
            Comparison(operator, NumericOperand::Float(value.normalize()))
        }
        (Integer, Membership(operator, ListOperand::Integers(values))) => Membership(
            operator,
            ListOperand::Integers(values.into_iter().sorted_unstable().dedup().collect()),
        ),
        (String, Membership(operator, ListOperand::Strings(values))) => Membership(
            operator,
            ListOperand::Strings(values.into_iter().sorted_unstable().dedup().collect()),
        ),
        (IntegerList, Contains(ScalarOperand::Integer(value))) => {
            Contains(ScalarOperand::Integer(value))
        }
        (StringList, Contains(ScalarOperand::String(value))) => {
            Contains(ScalarOperand::String(value))
        }
        (expected, kind) => {
            return Err(ParserError::TypeMismatch {
                name: name.to_owned(),
                expected,
                found: operand_requirement(&kind),
            })
        }
    };
    Ok(normalized)
}

fn equality(operator: EqualityOperator, operand: &ScalarOperand, value: &AttributeValue) -> bool {
    match (operand, value) {
        (ScalarOperand::Boolean(operand), AttributeValue::Boolean(value)) => {
            operator.apply(value, operand)
        }
        (ScalarOperand::Integer(operand), AttributeValue::Integer(value)) => {
            operator.apply(value, operand)
        }
        (ScalarOperand::Float(operand), AttributeValue::Float(value)) => {
            operator.apply(value, operand)
        }
        (ScalarOperand::String(operand), AttributeValue::String(value)) => {
            operator.apply(value, operand)
        }
        (operand, value) => {
            unreachable!("equality between {operand:?} and {value:?} should never happen. This is a bug.")
        }
    }
}

fn comparison(
    operator: ComparisonOperator,
    operand: &NumericOperand,
    value: &AttributeValue,
) -> bool {
    match (operand, value) {
        (NumericOperand::Integer(operand), AttributeValue::Integer(value)) => {
            operator.apply(value, operand)
        }
        (NumericOperand::Float(operand), AttributeValue::Float(value)) => {
            operator.apply(value, operand)
        }
        (operand, value) => {
            unreachable!("comparison between {operand:?} and {value:?} should never happen. This is a bug.")
        }
    }
}

fn membership(
    operator: MembershipOperator,
    operand: &ListOperand,
    value: &AttributeValue,
) -> bool {
    let found = match (operand, value) {
        // Operand lists are sorted on construction.
        (ListOperand::Integers(haystack), AttributeValue::Integer(needle)) => {
            haystack.binary_search(needle).is_ok()
        }
        (ListOperand::Strings(haystack), AttributeValue::String(needle)) => {
            haystack.binary_search(needle).is_ok()
        }
        (operand, value) => {
            unreachable!("membership of {value:?} in {operand:?} should never happen. This is a bug.")
        }
    };
    match operator {
        MembershipOperator::In => found,
        MembershipOperator::NotIn => !found,
    }
}

fn contains(operand: &ScalarOperand, value: &AttributeValue) -> bool {
    match (operand, value) {
        // Event lists are sorted by the builder.
        (ScalarOperand::Integer(needle), AttributeValue::IntegerList(haystack)) => {
            haystack.binary_search(needle).is_ok()
        }
        (ScalarOperand::String(needle), AttributeValue::StringList(haystack)) => {
            haystack.binary_search(needle).is_ok()
        }
        (operand, value) => {
            unreachable!("containment of {operand:?} in {value:?} should never happen. This is a bug.")
        }
    }
}

fn render_scalar(operand: &ScalarOperand, strings: &StringTable) -> String {
    match operand {
        ScalarOperand::Boolean(value) => value.to_string(),
        ScalarOperand::Integer(value) => value.to_string(),
        ScalarOperand::Float(value) => value.to_string(),
        ScalarOperand::String(value) => format!("{:?}", strings.resolve(*value)),
    }
}

fn render_list(operand: &ListOperand, strings: &StringTable) -> String {
    let mut rendered = String::from("[");
    match operand {
        ListOperand::Integers(values) => {
            let _ = write!(rendered, "{}", values.iter().join(", "));
        }
        ListOperand::Strings(values) => {
            let _ = write!(
                rendered,
                "{}",
                values
                    .iter()
                    .map(|value| format!("{:?}", strings.resolve(*value)))
                    .join(", ")
            );
        }
    }
    rendered.push(']');
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttributeDefinition;

    fn define_schema() -> Schema {
        Schema::new(&[
            AttributeDefinition::boolean("private"),
            AttributeDefinition::integer("exchange_id"),
            AttributeDefinition::float("bidfloor"),
            AttributeDefinition::string("country"),
            AttributeDefinition::integer_list("segment_ids"),
            AttributeDefinition::string_list("deals"),
        ])
        .unwrap()
    }

    #[test]
    fn a_bare_variable_is_an_equality_against_true() {
        let schema = define_schema();

        let variable = Predicate::variable(&schema, "private").unwrap();
        let spelled_out = Predicate::new(
            &schema,
            "private",
            PredicateKind::Equality(EqualityOperator::Equal, ScalarOperand::Boolean(true)),
        )
        .unwrap();

        assert_eq!(variable, spelled_out);
    }

    #[test]
    fn return_an_error_on_an_unknown_attribute() {
        let schema = define_schema();

        let result = Predicate::variable(&schema, "non_existing");

        assert_eq!(
            Err(ParserError::UnknownAttribute("non_existing".to_owned())),
            result
        );
    }

    #[test]
    fn return_an_error_on_a_mismatched_operand() {
        let schema = define_schema();

        let result = Predicate::new(
            &schema,
            "country",
            PredicateKind::Comparison(ComparisonOperator::LessThan, NumericOperand::Integer(10)),
        );

        assert_eq!(
            Err(ParserError::TypeMismatch {
                name: "country".to_owned(),
                expected: AttributeKind::String,
                found: AttributeKind::Integer,
            }),
            result
        );
    }

    #[test]
    fn integer_operands_are_promoted_for_float_attributes() {
        let schema = define_schema();

        let promoted = Predicate::new(
            &schema,
            "bidfloor",
            PredicateKind::Comparison(ComparisonOperator::GreaterThan, NumericOperand::Integer(2)),
        )
        .unwrap();
        let spelled_out = Predicate::new(
            &schema,
            "bidfloor",
            PredicateKind::Comparison(
                ComparisonOperator::GreaterThan,
                NumericOperand::Float(Decimal::new(2, 0)),
            ),
        )
        .unwrap();

        assert_eq!(promoted, spelled_out);
    }

    #[test]
    fn decimal_operands_are_normalized_across_scales() {
        let schema = define_schema();

        let wide = Predicate::new(
            &schema,
            "bidfloor",
            PredicateKind::Equality(
                EqualityOperator::Equal,
                ScalarOperand::Float(Decimal::new(500, 1)),
            ),
        )
        .unwrap();
        let narrow = Predicate::new(
            &schema,
            "bidfloor",
            PredicateKind::Equality(
                EqualityOperator::Equal,
                ScalarOperand::Float(Decimal::new(50, 0)),
            ),
        )
        .unwrap();

        assert_eq!(wide, narrow);
    }

    #[test]
    fn membership_lists_are_sorted_and_deduplicated() {
        let schema = define_schema();

        let shuffled = Predicate::new(
            &schema,
            "exchange_id",
            PredicateKind::Membership(
                MembershipOperator::In,
                ListOperand::Integers(vec![3, 1, 2, 3, 1]),
            ),
        )
        .unwrap();
        let sorted = Predicate::new(
            &schema,
            "exchange_id",
            PredicateKind::Membership(
                MembershipOperator::In,
                ListOperand::Integers(vec![1, 2, 3]),
            ),
        )
        .unwrap();

        assert_eq!(shuffled, sorted);
    }

    #[test]
    fn reject_an_empty_membership_list() {
        let result = ListOperand::homogeneous(vec![]);

        assert_eq!(Err(ParserError::EmptyList), result);
    }

    #[test]
    fn reject_a_mixed_membership_list() {
        let mut strings = StringTable::new();
        let id = strings.intern("deal-1");

        let result =
            ListOperand::homogeneous(vec![ScalarOperand::Integer(1), ScalarOperand::String(id)]);

        assert_eq!(Err(ParserError::MixedList), result);
    }

    #[test]
    fn comparison_operators_apply_exactly() {
        let schema = define_schema();
        let predicate = Predicate::new(
            &schema,
            "bidfloor",
            PredicateKind::Comparison(
                ComparisonOperator::GreaterThanEqual,
                NumericOperand::Float(Decimal::new(500, 1)),
            ),
        )
        .unwrap();

        assert!(predicate.evaluate(&AttributeValue::Float(Decimal::new(7550, 2))));
        assert!(predicate.evaluate(&AttributeValue::Float(Decimal::new(5000, 2))));
        assert!(!predicate.evaluate(&AttributeValue::Float(Decimal::new(4999, 2))));
    }

    #[test]
    fn membership_checks_sorted_operands() {
        let schema = define_schema();
        let predicate = Predicate::new(
            &schema,
            "exchange_id",
            PredicateKind::Membership(
                MembershipOperator::NotIn,
                ListOperand::Integers(vec![5, 3, 1]),
            ),
        )
        .unwrap();

        assert!(!predicate.evaluate(&AttributeValue::Integer(3)));
        assert!(predicate.evaluate(&AttributeValue::Integer(2)));
    }

    #[test]
    fn contains_checks_sorted_event_lists() {
        let schema = define_schema();
        let predicate = Predicate::new(
            &schema,
            "segment_ids",
            PredicateKind::Contains(ScalarOperand::Integer(4)),
        )
        .unwrap();

        assert!(predicate.evaluate(&AttributeValue::IntegerList(vec![1, 4, 9])));
        assert!(!predicate.evaluate(&AttributeValue::IntegerList(vec![1, 2, 9])));
    }

    #[test]
    fn equality_on_interned_strings() {
        let mut strings = StringTable::new();
        let us = strings.intern("US");
        let schema = define_schema();
        let predicate = Predicate::new(
            &schema,
            "country",
            PredicateKind::Equality(EqualityOperator::Equal, ScalarOperand::String(us)),
        )
        .unwrap();

        assert!(predicate.evaluate(&AttributeValue::String(us)));
        assert!(!predicate.evaluate(&AttributeValue::String(StringTable::UNKNOWN)));
    }
}

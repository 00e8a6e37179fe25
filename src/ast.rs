//! Parse trees and their normalization into n-ary formulas.

use crate::predicates::Predicate;

/// Binary tree produced by the grammar, before normalization.
#[derive(Clone, PartialEq, Debug)]
pub(crate) enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Predicate(Predicate),
}

#[derive(Clone, Copy, Eq, Hash, PartialEq, Debug)]
pub(crate) enum BoolOperator {
    And,
    Or,
}

/// Normalized formula: same-operator nesting flattened into one n-ary
/// combinator, duplicate children dropped, single-child combinators
/// collapsed.
#[derive(Clone, PartialEq, Debug)]
pub(crate) enum Formula {
    Predicate(Predicate),
    Combinator(BoolOperator, Vec<Formula>),
}

impl Expr {
    pub fn normalize(self) -> Formula {
        match self {
            Self::Predicate(predicate) => Formula::Predicate(predicate),
            Self::And(left, right) => Self::combine(BoolOperator::And, *left, *right),
            Self::Or(left, right) => Self::combine(BoolOperator::Or, *left, *right),
        }
    }

    fn combine(operator: BoolOperator, left: Expr, right: Expr) -> Formula {
        let mut children = Vec::new();
        Self::flatten(operator, left, &mut children);
        Self::flatten(operator, right, &mut children);

        let mut unique: Vec<Formula> = Vec::with_capacity(children.len());
        for child in children {
            if !unique.contains(&child) {
                unique.push(child);
            }
        }
        if unique.len() == 1 {
            unique.remove(0)
        } else {
            Formula::Combinator(operator, unique)
        }
    }

    fn flatten(operator: BoolOperator, expr: Expr, into: &mut Vec<Formula>) {
        match (operator, expr) {
            (BoolOperator::And, Expr::And(left, right)) => {
                Self::flatten(operator, *left, into);
                Self::flatten(operator, *right, into);
            }
            (BoolOperator::Or, Expr::Or(left, right)) => {
                Self::flatten(operator, *left, into);
                Self::flatten(operator, *right, into);
            }
            (_, expr) => into.push(expr.normalize()),
        }
    }
}

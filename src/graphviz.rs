//! Best-effort DOT export of the node graph, for debugging and
//! visualization. Read-only; not required for correctness.

use crate::{
    ast::BoolOperator,
    index::{NodePayload, Percolator},
};
use itertools::Itertools;
use std::fmt::Write;

pub(crate) fn render(percolator: &Percolator) -> String {
    let mut out = String::from("digraph percolator {\n");
    for (id, node) in percolator.nodes.iter() {
        let (label, shape) = match &node.payload {
            NodePayload::Predicate(predicate) => (
                predicate.render(&percolator.schema, &percolator.strings),
                "box",
            ),
            NodePayload::Combinator {
                operator: BoolOperator::And,
                ..
            } => ("AND".to_owned(), "ellipse"),
            NodePayload::Combinator {
                operator: BoolOperator::Or,
                ..
            } => ("OR".to_owned(), "ellipse"),
        };
        let mut label = format!("{label}\\nuses: {}", node.uses);
        if !node.subscribers.is_empty() {
            let _ = write!(
                label,
                "\\nsubscriptions: {}",
                node.subscribers.iter().join(", ")
            );
        }
        let _ = writeln!(
            out,
            "  n{id} [shape={shape}, label=\"{}\"];",
            escape(&label)
        );
        if let NodePayload::Combinator { children, .. } = &node.payload {
            for child in children {
                let _ = writeln!(out, "  n{id} -> n{child};");
            }
        }
    }
    out.push_str("}\n");
    out
}

fn escape(label: &str) -> String {
    label.replace('"', "\\\"")
}

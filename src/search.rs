//! Three-valued search over the shared DAG.
//!
//! A search only touches the part of the graph the event can actually
//! decide: the predicate nodes of every defined attribute are evaluated once
//! and their true/false outcomes propagate upward through parent combinators.
//! Undefined never propagates — a combinator that is neither short-circuited
//! nor fully reported stays undefined by construction, which is exactly the
//! three-valued semantics of its unvisited children.

use crate::{
    ast::BoolOperator,
    events::Event,
    index::{NodeId, NodePayload, Percolator},
    schema::AttributeId,
};
use tracing::trace;

/// The outcome of one search call.
#[derive(Debug)]
pub struct Report {
    matches: Vec<u64>,
}

impl Report {
    /// Ids of the matched subscriptions, in unspecified order.
    pub fn matches(&self) -> &[u64] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<u64> {
        self.matches
    }
}

pub(crate) fn run(percolator: &Percolator, event: &Event) -> Report {
    debug_assert_eq!(
        percolator.schema.len(),
        event.len(),
        "event built against a different schema"
    );
    let capacity = percolator.nodes.capacity();
    let mut evaluation = Evaluation {
        percolator,
        values: vec![None; capacity],
        true_children: vec![0; capacity],
        false_children: vec![0; capacity],
        frontier: Vec::new(),
        matches: Vec::new(),
    };

    for (attribute, entry_points) in percolator.by_attribute.iter().enumerate() {
        let Some(value) = event.value(AttributeId::new(attribute)) else {
            continue;
        };
        for &id in entry_points {
            if let NodePayload::Predicate(predicate) = &percolator.nodes[id].payload {
                let outcome = predicate.evaluate(value);
                evaluation.settle(id, outcome);
            }
        }
    }
    while let Some((id, outcome)) = evaluation.frontier.pop() {
        evaluation.propagate(id, outcome);
    }

    trace!(matches = evaluation.matches.len(), "search completed");
    Report {
        matches: evaluation.matches,
    }
}

/// Call-local evaluation state; nothing here outlives one search, so
/// concurrent searches over the same index stay independent.
struct Evaluation<'a> {
    percolator: &'a Percolator,
    /// Determined value per node; `None` is undefined-so-far.
    values: Vec<Option<bool>>,
    true_children: Vec<u32>,
    false_children: Vec<u32>,
    frontier: Vec<(NodeId, bool)>,
    matches: Vec<u64>,
}

impl Evaluation<'_> {
    /// Records the determined value of a node, at most once per search call.
    fn settle(&mut self, id: NodeId, outcome: bool) {
        self.values[id] = Some(outcome);
        if outcome {
            let subscribers = &self.percolator.nodes[id].subscribers;
            self.matches.extend_from_slice(subscribers);
        }
        self.frontier.push((id, outcome));
    }

    fn propagate(&mut self, id: NodeId, outcome: bool) {
        let percolator = self.percolator;
        for &parent in &percolator.nodes[id].parents {
            if self.values[parent].is_some() {
                continue;
            }
            let NodePayload::Combinator { operator, children } =
                &percolator.nodes[parent].payload
            else {
                continue;
            };
            if outcome {
                self.true_children[parent] += 1;
            } else {
                self.false_children[parent] += 1;
            }
            let decided = match (*operator, outcome) {
                (BoolOperator::And, false) => Some(false),
                (BoolOperator::Or, true) => Some(true),
                (BoolOperator::And, true)
                    if self.true_children[parent] as usize == children.len() =>
                {
                    Some(true)
                }
                (BoolOperator::Or, false)
                    if self.false_children[parent] as usize == children.len() =>
                {
                    Some(false)
                }
                _ => None,
            };
            if let Some(value) = decided {
                self.settle(parent, value);
            }
        }
    }
}

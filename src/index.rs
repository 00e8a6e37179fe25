//! The shared predicate index: a reference-counted DAG of canonical nodes.
//!
//! Every subscription is parsed into a formula and resolved bottom-up against
//! the canonicalization maps, so structurally identical literals and
//! combinators are represented by exactly one node no matter how many
//! subscriptions use them. Use counts track how many subscriptions reach each
//! node; deletion prunes nodes the moment their count reaches zero.

use crate::{
    ast::{BoolOperator, Formula},
    error::{PercolatorError, SchemaError},
    events::{Event, EventBuilder},
    graphviz, parser,
    predicates::Predicate,
    schema::{AttributeDefinition, Schema},
    search::{self, Report},
    strings::StringTable,
};
use slab::Slab;
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub(crate) type NodeId = usize;

pub(crate) enum NodePayload {
    Predicate(Predicate),
    Combinator {
        operator: BoolOperator,
        // Sorted and deduplicated; doubles as the canonical signature.
        children: Vec<NodeId>,
    },
}

pub(crate) struct Node {
    pub(crate) payload: NodePayload,
    pub(crate) parents: Vec<NodeId>,
    /// Number of subscriptions whose formula reaches this node, counted once
    /// per subscription regardless of how many paths reach it.
    pub(crate) uses: usize,
    /// Subscriptions whose formula is rooted exactly here.
    pub(crate) subscribers: Vec<u64>,
}

/// A content-based subscription index.
///
/// Register boolean expressions with [`Percolator::insert`], then match
/// events built through [`Percolator::make_event`] with
/// [`Percolator::search`].
pub struct Percolator {
    pub(crate) schema: Schema,
    pub(crate) strings: StringTable,
    pub(crate) nodes: Slab<Node>,
    predicate_ids: HashMap<Predicate, NodeId>,
    combinator_ids: HashMap<(BoolOperator, Vec<NodeId>), NodeId>,
    /// Predicate nodes indexed by the attribute they test; the entry points
    /// of a search.
    pub(crate) by_attribute: Vec<Vec<NodeId>>,
    pub(crate) subscriptions: HashMap<u64, NodeId>,
}

impl Percolator {
    pub fn new(definitions: &[AttributeDefinition]) -> Result<Self, SchemaError> {
        let schema = Schema::new(definitions)?;
        let by_attribute = vec![Vec::new(); schema.len()];
        Ok(Self {
            schema,
            strings: StringTable::new(),
            nodes: Slab::new(),
            predicate_ids: HashMap::new(),
            combinator_ids: HashMap::new(),
            by_attribute,
            subscriptions: HashMap::new(),
        })
    }

    /// Registers `expression` under the caller-assigned `id`.
    ///
    /// All validation happens before the index is touched, so any error
    /// leaves the structure exactly as it was.
    pub fn insert<'a>(&mut self, id: u64, expression: &'a str) -> Result<(), PercolatorError<'a>> {
        if self.subscriptions.contains_key(&id) {
            return Err(PercolatorError::DuplicateSubscription(id));
        }
        let formula = parser::parse(expression, &self.schema, &mut self.strings)?;
        let root = self.resolve(&formula);
        self.acquire(root);
        self.nodes[root].subscribers.push(id);
        self.subscriptions.insert(id, root);
        debug!(id, root, nodes = self.nodes.len(), "subscription registered");
        Ok(())
    }

    /// Unregisters `id`, pruning every node that no other subscription
    /// reaches. Unknown ids are a no-op.
    pub fn delete(&mut self, id: u64) {
        let Some(root) = self.subscriptions.remove(&id) else {
            return;
        };
        self.nodes[root].subscribers.retain(|subscriber| *subscriber != id);
        let visited = self.release(root);
        self.prune(visited);
        debug!(id, nodes = self.nodes.len(), "subscription removed");
    }

    /// Starts assembling an event against this index's schema.
    pub fn make_event(&self) -> EventBuilder<'_> {
        EventBuilder::new(&self.schema, &self.strings)
    }

    /// Matches `event` against every registered subscription.
    pub fn search(&self, event: &Event) -> Report {
        search::run(self, event)
    }

    /// Number of registered subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Renders the current node graph in graphviz DOT format.
    pub fn to_graphviz(&self) -> String {
        graphviz::render(self)
    }

    /// Resolves a formula to its canonical node, creating nodes (with a use
    /// count of zero) only where no structurally equal node exists.
    fn resolve(&mut self, formula: &Formula) -> NodeId {
        match formula {
            Formula::Predicate(predicate) => self.predicate_node(predicate),
            Formula::Combinator(operator, children) => {
                let mut ids: Vec<NodeId> = children
                    .iter()
                    .map(|child| self.resolve(child))
                    .collect();
                ids.sort_unstable();
                ids.dedup();
                // Distinct sub-formulas can resolve to one node; a combinator
                // left with a single child is that child.
                if ids.len() == 1 {
                    return ids[0];
                }
                self.combinator_node(*operator, ids)
            }
        }
    }

    fn predicate_node(&mut self, predicate: &Predicate) -> NodeId {
        if let Some(&id) = self.predicate_ids.get(predicate) {
            return id;
        }
        let id = self.nodes.insert(Node {
            payload: NodePayload::Predicate(predicate.clone()),
            parents: Vec::new(),
            uses: 0,
            subscribers: Vec::new(),
        });
        self.predicate_ids.insert(predicate.clone(), id);
        self.by_attribute[predicate.attribute().index()].push(id);
        id
    }

    fn combinator_node(&mut self, operator: BoolOperator, children: Vec<NodeId>) -> NodeId {
        let signature = (operator, children);
        if let Some(&id) = self.combinator_ids.get(&signature) {
            return id;
        }
        let id = self.nodes.insert(Node {
            payload: NodePayload::Combinator {
                operator: signature.0,
                children: signature.1.clone(),
            },
            parents: Vec::new(),
            uses: 0,
            subscribers: Vec::new(),
        });
        for &child in &signature.1 {
            self.nodes[child].parents.push(id);
        }
        self.combinator_ids.insert(signature, id);
        id
    }

    /// Increments the use count of every node reachable from `root`, once
    /// per node even when several paths reach it.
    fn acquire(&mut self, root: NodeId) {
        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let node = &mut self.nodes[id];
            node.uses += 1;
            if let NodePayload::Combinator { children, .. } = &node.payload {
                stack.extend(children.iter().copied());
            }
        }
    }

    /// Decrements use counts below `root`, once per node, and returns the
    /// visited ids so pruning can pick out the ones that dropped to zero.
    fn release(&mut self, root: NodeId) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            let node = &mut self.nodes[id];
            node.uses -= 1;
            if let NodePayload::Combinator { children, .. } = &node.payload {
                stack.extend(children.iter().copied());
            }
        }
        order
    }

    /// Removes every visited node whose use count reached zero: out of the
    /// canonicalization maps, out of surviving children's parent lists, then
    /// out of the arena. A dead node's parents are necessarily dead too (a
    /// parent is only reachable through its children), so unlinking is only
    /// needed downwards.
    fn prune(&mut self, visited: Vec<NodeId>) {
        let dead: Vec<NodeId> = visited
            .into_iter()
            .filter(|&id| self.nodes[id].uses == 0)
            .collect();
        for &id in &dead {
            match &self.nodes[id].payload {
                NodePayload::Predicate(predicate) => {
                    let predicate = predicate.clone();
                    self.predicate_ids.remove(&predicate);
                    self.by_attribute[predicate.attribute().index()]
                        .retain(|&node| node != id);
                }
                NodePayload::Combinator { operator, children } => {
                    let signature = (*operator, children.clone());
                    self.combinator_ids.remove(&signature);
                    for child in signature.1 {
                        if self.nodes[child].uses > 0 {
                            self.nodes[child].parents.retain(|&parent| parent != id);
                        }
                    }
                }
            }
        }
        for id in dead {
            self.nodes.remove(id);
        }
    }
}

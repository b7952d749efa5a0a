//! Value-flow graph and type propagation.
//!
//! Nodes stand for program values that can carry an interface-typed value;
//! edges encode "may flow to". Propagation is a worklist fixpoint over an
//! arena of nodes addressed by index, so cycles in the flow graph terminate
//! and the graph can keep growing between propagation rounds: resolving a
//! dynamic call adds edges into the candidate's parameters, which may let
//! more types reach other receivers, which resolves further candidates.

use std::collections::{BTreeSet, HashMap, HashSet};

use sextant_ir::{FuncId, GlobalId, TypeId};

/// A program value that can carry an interface-typed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum FlowKey {
    /// Parameter `i` of a function; the receiver of a method is parameter 0.
    Param(FuncId, u32),
    /// A local slot of a function body.
    Local(FuncId, u32),
    /// Result `i` of a function.
    Result(FuncId, u32),
    /// A named field, one cell per field declaration across all instances.
    Field(TypeId, String),
    /// A package-level variable.
    Global(GlobalId),
}

/// Arena index of a flow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FlowNodeId(u32);

#[derive(Debug, Default)]
struct FlowNode {
    /// Concrete types known to reach this value.
    types: BTreeSet<TypeId>,
    /// Values this one may flow to.
    succs: Vec<FlowNodeId>,
}

/// The flow graph with its propagation state.
#[derive(Debug, Default)]
pub(crate) struct FlowGraph {
    nodes: Vec<FlowNode>,
    index: HashMap<FlowKey, FlowNodeId>,
    seen_edges: HashSet<(FlowNodeId, FlowNodeId)>,
    work: Vec<FlowNodeId>,
}

impl FlowGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Intern a value, returning its arena index.
    pub(crate) fn node(&mut self, key: FlowKey) -> FlowNodeId {
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        // The arena is bounded by the number of distinct program values.
        #[allow(clippy::cast_possible_truncation)]
        let id = FlowNodeId(self.nodes.len() as u32);
        self.nodes.push(FlowNode::default());
        self.index.insert(key, id);
        id
    }

    /// Record that `from` may flow to `to`. Adding an edge to a node that
    /// already carries types schedules it, so late edges still propagate.
    pub(crate) fn add_edge(&mut self, from: FlowNodeId, to: FlowNodeId) {
        if from == to || !self.seen_edges.insert((from, to)) {
            return;
        }
        self.nodes[from.0 as usize].succs.push(to);
        if !self.nodes[from.0 as usize].types.is_empty() {
            self.work.push(from);
        }
    }

    /// Record that a value of concrete type `ty` originates at `node`.
    pub(crate) fn seed(&mut self, node: FlowNodeId, ty: TypeId) {
        if self.nodes[node.0 as usize].types.insert(ty) {
            self.work.push(node);
        }
    }

    /// Run propagation to a fixpoint over the current edges.
    pub(crate) fn propagate(&mut self) {
        while let Some(node) = self.work.pop() {
            let types: Vec<TypeId> = self.nodes[node.0 as usize].types.iter().copied().collect();
            let succs = self.nodes[node.0 as usize].succs.clone();
            for succ in succs {
                let target = &mut self.nodes[succ.0 as usize];
                let before = target.types.len();
                target.types.extend(types.iter().copied());
                if target.types.len() > before {
                    self.work.push(succ);
                }
            }
        }
    }

    /// Concrete types known to reach `node` as of the last propagation.
    pub(crate) fn types(&self, node: FlowNodeId) -> &BTreeSet<TypeId> {
        &self.nodes[node.0 as usize].types
    }
}

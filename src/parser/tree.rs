//! Arena parse tree
//!
//! Nodes are stored in one flat vector and addressed by index. Every node is a
//! span into the single shared source buffer; node text is always borrowed,
//! never copied, so rebuilding output from a deep tree stays linear in the
//! source length.

use std::sync::Arc;

use crate::error::Span;
use crate::grammar::RuleSet;

/// Index of a node within its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One matched production
///
/// Children are in source order and their spans nest inside the parent span.
/// Bytes of the parent span not covered by any child (inline literals,
/// punctuation) are recovered from the source buffer by offset arithmetic.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) rule: usize,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) children: Vec<NodeId>,
}

/// Immutable parse result over one source buffer
#[derive(Debug, Clone)]
pub struct ParseTree {
    source: String,
    rules: Arc<RuleSet>,
    nodes: Vec<Node>,
    root: NodeId,
}

impl ParseTree {
    pub(crate) fn new(source: String, rules: Arc<RuleSet>, nodes: Vec<Node>, root: NodeId) -> Self {
        Self {
            source,
            rules,
            nodes,
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Rule name the node matched
    pub fn kind(&self, id: NodeId) -> &str {
        self.rules.name_at(self.nodes[id.index()].rule)
    }

    pub fn span(&self, id: NodeId) -> Span {
        let node = &self.nodes[id.index()];
        node.start..node.end
    }

    /// Exact source substring the node matched
    pub fn text(&self, id: NodeId) -> &str {
        let node = &self.nodes[id.index()];
        &self.source[node.start..node.end]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// First direct child of the given kind
    pub fn find_child(&self, id: NodeId, kind: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.kind(c) == kind)
    }

    /// Direct children of the given kind, in source order
    pub fn children_of_kind<'a>(
        &'a self,
        id: NodeId,
        kind: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&c| self.kind(c) == kind)
    }

    /// Depth-first pre-order walk from the root
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![self.root],
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

pub struct Preorder<'a> {
    tree: &'a ParseTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        // Reverse push keeps left-to-right source order
        for &child in self.tree.children(id).iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}

//! Adjacency view over a domain's node list
//!
//! Built on demand from the declaration-ordered node list so neighbour and
//! in-degree lookups are O(1) instead of rescanning every node's
//! connections. Edges pointing at ids outside the domain are kept as
//! outgoing edges but never create a vertex.

use std::collections::{HashMap, HashSet};

use crate::entities::Node;
use crate::ids::NodeId;

/// Borrowed adjacency structure for one domain
#[derive(Debug)]
pub struct DomainGraph<'a> {
    nodes: &'a [Node],
    index: HashMap<&'a str, usize>,
    parents: Vec<Vec<usize>>,
}

impl<'a> DomainGraph<'a> {
    pub fn new(nodes: &'a [Node]) -> Self {
        let index: HashMap<&'a str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect();

        let mut parents = vec![Vec::new(); nodes.len()];
        for (from, node) in nodes.iter().enumerate() {
            for target in &node.connections {
                if let Some(&to) = index.get(target.as_str()) {
                    parents[to].push(from);
                }
            }
        }

        Self {
            nodes,
            index,
            parents,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Nodes with no incoming connection, in declaration order.
    pub fn roots(&self) -> impl Iterator<Item = &'a NodeId> + '_ {
        self.nodes
            .iter()
            .zip(&self.parents)
            .filter(|(_, parents)| parents.is_empty())
            .map(|(node, _)| &node.id)
    }

    /// The protected root: the first zero in-degree node by declaration order.
    pub fn root(&self) -> Option<&'a NodeId> {
        self.roots().next()
    }

    pub fn is_root(&self, id: &str) -> bool {
        self.root().is_some_and(|root| root == id)
    }

    /// Outgoing connections of `id` (empty for unknown ids).
    pub fn children(&self, id: &str) -> &'a [NodeId] {
        self.node(id)
            .map(|node| node.connections.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_unlocked_children(&self, id: &str, unlocked: &HashSet<&str>) -> bool {
        self.children(id)
            .iter()
            .any(|child| unlocked.contains(child.as_str()))
    }

    /// Whether any unlocked node of this domain points at `id`.
    pub fn has_unlocked_parent(&self, id: &str, unlocked: &HashSet<&str>) -> bool {
        self.index
            .get(id)
            .map(|&i| {
                self.parents[i]
                    .iter()
                    .any(|&p| unlocked.contains(self.nodes[p].id.as_str()))
            })
            .unwrap_or(false)
    }
}

//! Domain entity - a named sub-graph of the talent tree
//!
//! A character's tree holds any number of domains, each tied to a game-rule
//! domain from the catalog. Node ids are unique within their domain.

use serde::{Deserialize, Serialize};

use crate::entities::node::{Node, NodeDirection};
use crate::ids::{DomainId, NodeId};
use crate::value_objects::{DomainCatalogEntry, DomainGraph, DEFAULT_DOMAIN_SRC};

/// A named talent sub-graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: DomainId,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Domain {
    pub fn new(id: impl Into<DomainId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            src: None,
            nodes: Vec::new(),
        }
    }

    /// New, empty domain for a catalog entry. Nodes are added later.
    pub fn from_catalog(entry: &DomainCatalogEntry) -> Self {
        Self {
            id: entry.id.clone(),
            label: entry.display_label().to_string(),
            src: Some(
                entry
                    .src
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DOMAIN_SRC.to_string()),
            ),
            nodes: Vec::new(),
        }
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn graph(&self) -> DomainGraph<'_> {
        DomainGraph::new(&self.nodes)
    }

    /// The protected root node (first zero in-degree node).
    pub fn root(&self) -> Option<&NodeId> {
        self.graph().root()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Replace the nodes with the standard seven-node layout.
    pub fn install_template(&mut self) {
        self.nodes = template_nodes(&self.id);
    }
}

/// Standard starting layout on a five-column grid:
///
/// ```text
///          start
///            |
///   left - centre - right
///    |       |        |
///  left-b  centre-b  right-b
/// ```
pub fn template_nodes(domain: &DomainId) -> Vec<Node> {
    let id = |n: u8| NodeId::new(format!("{domain}-node-{n}"));
    vec![
        Node::new(id(1), "Starting Node")
            .with_icon("fas fa-star")
            .at(3, 1)
            .with_connections([id(2)])
            .with_direction(NodeDirection::Down),
        Node::new(id(2), "Centre Node")
            .at(3, 2)
            .with_connections([id(3), id(4), id(6)])
            .with_direction(NodeDirection::Horizontal),
        Node::new(id(3), "Left Node")
            .at(1, 2)
            .with_connections([id(7)])
            .with_direction(NodeDirection::Down),
        Node::new(id(4), "Right Node")
            .at(5, 2)
            .with_connections([id(5)])
            .with_direction(NodeDirection::Down),
        Node::new(id(5), "Lower Right Node").at(5, 3),
        Node::new(id(6), "Lower Centre Node").at(3, 3),
        Node::new(id(7), "Lower Left Node").at(1, 3),
    ]
}

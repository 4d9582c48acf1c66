//! Read-side use cases: the whole tree and single-node details.
//!
//! Reads heal dangling card references in the returned copy only. Mutating
//! use cases heal again on checkout, so the fix reaches storage with the
//! next committed change.

use std::collections::HashMap;

use talent_tree_domain::{CardBinding, CardRef, DomainId, NodeId, ProgressionState};

use crate::use_cases::error::ProgressionError;
use crate::use_cases::services::{RequestContext, TreeServices};

/// A character's tree ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeView {
    pub state: ProgressionState,
    /// Unlockable nodes per domain
    pub available: HashMap<DomainId, Vec<NodeId>>,
    pub remaining_budget: usize,
    /// Card references cleared because they no longer resolve
    pub healed: usize,
}

impl TreeView {
    pub fn is_available(&self, domain_id: &str, node_id: &str) -> bool {
        self.available
            .get(domain_id)
            .is_some_and(|nodes| nodes.iter().any(|n| n == node_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Unlocked,
    Available,
    Locked,
}

/// What a node shows: bound card first, then the node's own fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDetails {
    pub id: NodeId,
    pub name: String,
    pub img: String,
    pub description: String,
    pub is_image: bool,
    pub status: NodeStatus,
    pub card: Option<CardRef>,
    pub staged: bool,
}

pub struct LoadTree {
    services: TreeServices,
}

impl LoadTree {
    pub fn new(services: TreeServices) -> Self {
        Self { services }
    }

    pub async fn execute(&self, ctx: &RequestContext) -> Result<TreeView, ProgressionError> {
        let mut state = self
            .services
            .store
            .load(ctx.user_id, ctx.character_id)
            .await
            .inspect_err(|e| {
                tracing::error!(character_id = %ctx.character_id, error = %e, "Failed to load talent tree");
            })?;
        let healed = self.services.cards.reconcile(ctx.character_id, &mut state).await;

        let mut available = HashMap::new();
        for domain in state.domains() {
            available.insert(domain.id.clone(), state.available_nodes(domain.id.as_str())?);
        }

        Ok(TreeView {
            remaining_budget: state.remaining_budget(),
            available,
            healed,
            state,
        })
    }
}

pub struct NodeInfo {
    services: TreeServices,
}

impl NodeInfo {
    pub fn new(services: TreeServices) -> Self {
        Self { services }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
    ) -> Result<NodeDetails, ProgressionError> {
        let state = self
            .services
            .store
            .load(ctx.user_id, ctx.character_id)
            .await?;
        let node = state.node(domain_id, node_id)?;

        let status = if state.is_unlocked(node_id) {
            NodeStatus::Unlocked
        } else if state.available_nodes(domain_id)?.iter().any(|n| n == node_id) {
            NodeStatus::Available
        } else {
            NodeStatus::Locked
        };

        let bound_card = match node.card_binding() {
            CardBinding::Bound(reference) => match self.services.cards.resolve(reference).await {
                Ok(card) => card.filter(|card| card.is_owned_by(ctx.character_id)),
                Err(e) => {
                    tracing::warn!(card = %reference, error = %e, "Card lookup failed; showing node fields");
                    None
                }
            },
            _ => None,
        };

        let details = match bound_card {
            Some(card) => NodeDetails {
                id: node.id.clone(),
                description: card
                    .description()
                    .unwrap_or_else(|| node.display_description()),
                name: card.name.clone(),
                img: card.img.clone(),
                is_image: true,
                status,
                card: Some(card.reference),
                staged: false,
            },
            None => NodeDetails {
                id: node.id.clone(),
                name: node.label.clone(),
                img: node.icon.clone(),
                description: node.display_description(),
                is_image: node.is_image(),
                status,
                card: None,
                staged: node.is_staged(),
            },
        };
        Ok(details)
    }
}

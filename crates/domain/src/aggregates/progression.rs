//! ProgressionState aggregate - a character's talent tree and unlock state
//!
//! # Invariants
//!
//! - `unlocked_nodes` holds each node at most once, in unlock order
//! - `unlocked_nodes.len() <= current_level` after every committed unlock
//!   and lock; level decreases report (rather than force) any overshoot, see
//!   [`LevelChange::over_budget`]
//! - `current_level <= max_level`
//! - An unlocked node always has an unlocked path back to a root, because
//!   locking removes every unlocked descendant first
//!
//! Every operation either commits fully or returns a [`DomainError`] with no
//! state change.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::entities::{Domain, Node, NodeEdit};
use crate::error::DomainError;
use crate::ids::NodeId;

/// Level cap of the current rules version
pub const DEFAULT_MAX_LEVEL: u32 = 11;

/// A character's persisted progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionState {
    #[serde(default)]
    domains: Vec<Domain>,
    #[serde(default)]
    unlocked_nodes: Vec<NodeId>,
    #[serde(default)]
    current_level: u32,
    #[serde(default)]
    max_level: u32,
}

/// Result of a level change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelChange {
    pub previous: u32,
    pub level: u32,
    /// Nodes locked to fit the new level, in removal order
    pub locked: Vec<NodeId>,
    /// Unlocked nodes left above the new level because none could be locked
    pub over_budget: usize,
}

impl LevelChange {
    pub fn increased(&self) -> bool {
        self.level > self.previous
    }
}

/// Result of removing a domain
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedDomain {
    pub domain: Domain,
    pub locked: Vec<NodeId>,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEVEL)
    }
}

impl ProgressionState {
    /// Fresh state: no domains, nothing unlocked, level 0.
    pub fn new(max_level: u32) -> Self {
        Self {
            domains: Vec::new(),
            unlocked_nodes: Vec::new(),
            current_level: 0,
            max_level,
        }
    }

    /// Builder for seeding a level (clamped to the cap).
    pub fn with_level(mut self, level: u32) -> Self {
        self.current_level = level.min(self.max_level);
        self
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domains.push(domain);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn domain(&self, id: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.id == id)
    }

    pub fn unlocked_nodes(&self) -> &[NodeId] {
        &self.unlocked_nodes
    }

    pub fn is_unlocked(&self, node_id: &str) -> bool {
        self.unlocked_nodes.iter().any(|n| n == node_id)
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Levels not yet spent on an unlocked node.
    pub fn remaining_budget(&self) -> usize {
        (self.current_level as usize).saturating_sub(self.unlocked_nodes.len())
    }

    pub fn node(&self, domain_id: &str, node_id: &str) -> Result<&Node, DomainError> {
        self.require_domain(domain_id)?
            .node(node_id)
            .ok_or_else(|| DomainError::not_found("Node", node_id))
    }

    /// Mutable node access for card binding and editing.
    pub fn node_mut(&mut self, domain_id: &str, node_id: &str) -> Result<&mut Node, DomainError> {
        self.require_domain_mut(domain_id)?
            .node_mut(node_id)
            .ok_or_else(|| DomainError::not_found("Node", node_id))
    }

    /// Every node of every domain, for read-time reconciliation.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.domains.iter_mut().flat_map(|d| d.nodes.iter_mut())
    }

    // =========================================================================
    // Availability
    // =========================================================================

    /// Locked nodes of `domain_id` that can be unlocked right now.
    ///
    /// - Level 0: nothing (viewing only)
    /// - Nothing unlocked anywhere: every zero in-degree node of the domain
    /// - Otherwise: locked nodes targeted by an unlocked node of the domain
    pub fn available_nodes(&self, domain_id: &str) -> Result<Vec<NodeId>, DomainError> {
        let domain = self.require_domain(domain_id)?;
        Ok(self.available_in(domain))
    }

    fn available_in(&self, domain: &Domain) -> Vec<NodeId> {
        if self.current_level == 0 {
            return Vec::new();
        }

        let graph = domain.graph();
        if self.unlocked_nodes.is_empty() {
            return graph.roots().cloned().collect();
        }

        let unlocked = self.unlocked_set();
        domain
            .nodes
            .iter()
            .filter(|node| !unlocked.contains(node.id.as_str()))
            .filter(|node| graph.has_unlocked_parent(node.id.as_str(), &unlocked))
            .map(|node| node.id.clone())
            .collect()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Unlock `node_id`, spending one level of budget.
    pub fn unlock(&mut self, domain_id: &str, node_id: &str) -> Result<(), DomainError> {
        let domain = self.require_domain(domain_id)?;
        if !domain.contains(node_id) {
            return Err(DomainError::not_found("Node", node_id));
        }
        if !self.available_in(domain).iter().any(|n| n == node_id) {
            return Err(DomainError::NodeUnavailable(NodeId::new(node_id)));
        }
        if self.unlocked_nodes.len() >= self.current_level as usize {
            return Err(DomainError::budget_exhausted(
                self.unlocked_nodes.len(),
                self.current_level,
            ));
        }

        self.unlocked_nodes.push(NodeId::new(node_id));
        Ok(())
    }

    /// Lock `node_id` and every unlocked node reachable from it.
    ///
    /// Returns the descendants that were locked along the way, depth-first.
    pub fn lock(&mut self, domain_id: &str, node_id: &str) -> Result<Vec<NodeId>, DomainError> {
        let domain = find_domain(&self.domains, domain_id)?;
        let graph = domain.graph();
        if !graph.contains(node_id) {
            return Err(DomainError::not_found("Node", node_id));
        }
        if !self.is_unlocked(node_id) {
            return Err(DomainError::NotUnlocked(NodeId::new(node_id)));
        }
        if graph.is_root(node_id) && self.current_level > 1 {
            return Err(DomainError::ProtectedRoot(NodeId::new(node_id)));
        }
        if graph.has_unlocked_children(node_id, &self.unlocked_set()) {
            return Err(DomainError::HasUnlockedChildren(NodeId::new(node_id)));
        }

        let mut locked = Vec::new();
        lock_descendants(domain, node_id, &mut self.unlocked_nodes, &mut locked);
        self.unlocked_nodes.retain(|n| n != node_id);
        Ok(locked)
    }

    /// Move to `level` (clamped to `0..=max_level`).
    ///
    /// Raising the level only adds budget. Lowering it locks nodes:
    /// - to 0: everything
    /// - to 1: everything except each domain's root
    /// - otherwise: leaves, last unlocked first, until the count fits or no
    ///   lockable leaf remains
    pub fn set_level(&mut self, level: u32) -> LevelChange {
        let level = level.min(self.max_level);
        let previous = self.current_level;

        let locked = if level >= previous {
            Vec::new()
        } else {
            match level {
                0 => std::mem::take(&mut self.unlocked_nodes),
                1 => keep_only_roots(&self.domains, &mut self.unlocked_nodes),
                _ => shrink_to(&self.domains, &mut self.unlocked_nodes, level as usize),
            }
        };

        self.current_level = level;
        LevelChange {
            previous,
            level,
            locked,
            over_budget: self.unlocked_nodes.len().saturating_sub(level as usize),
        }
    }

    /// Raise the level by one.
    pub fn increase_level(&mut self) -> Result<LevelChange, DomainError> {
        if self.current_level >= self.max_level {
            return Err(DomainError::LevelBoundReached {
                level: self.max_level,
                bound: "maximum",
            });
        }
        Ok(self.set_level(self.current_level + 1))
    }

    /// Lower the level by one.
    pub fn decrease_level(&mut self) -> Result<LevelChange, DomainError> {
        if self.current_level == 0 {
            return Err(DomainError::LevelBoundReached {
                level: 0,
                bound: "minimum",
            });
        }
        Ok(self.set_level(self.current_level - 1))
    }

    // =========================================================================
    // Structure editing
    // =========================================================================

    pub fn add_domain(&mut self, domain: Domain) -> Result<(), DomainError> {
        if self.domain(domain.id.as_str()).is_some() {
            return Err(DomainError::already_exists("Domain", domain.id.as_str()));
        }
        self.domains.push(domain);
        Ok(())
    }

    /// Remove a domain and lock every one of its nodes.
    pub fn remove_domain(&mut self, domain_id: &str) -> Result<RemovedDomain, DomainError> {
        let position = self
            .domains
            .iter()
            .position(|d| d.id == domain_id)
            .ok_or_else(|| DomainError::not_found("Domain", domain_id))?;
        let domain = self.domains.remove(position);
        let locked = self.lock_all_in(&domain);
        Ok(RemovedDomain { domain, locked })
    }

    /// Install the standard layout in an empty domain.
    pub fn create_tree(&mut self, domain_id: &str) -> Result<(), DomainError> {
        let domain = self.require_domain_mut(domain_id)?;
        if !domain.nodes.is_empty() {
            return Err(DomainError::already_exists("Tree", domain_id));
        }
        domain.install_template();
        Ok(())
    }

    /// Lock the domain's nodes and reinstall the standard layout.
    pub fn recreate_tree(&mut self, domain_id: &str) -> Result<Vec<NodeId>, DomainError> {
        let domain = self.require_domain(domain_id)?.clone();
        let locked = self.lock_all_in(&domain);
        self.require_domain_mut(domain_id)?.install_template();
        Ok(locked)
    }

    pub fn edit_node(
        &mut self,
        domain_id: &str,
        node_id: &str,
        edit: NodeEdit,
    ) -> Result<(), DomainError> {
        self.node_mut(domain_id, node_id)?.apply_edit(edit);
        Ok(())
    }

    // =========================================================================
    // Schema upgrades
    // =========================================================================

    /// Raise `max_level` to `ceiling` when an older rules version stored a
    /// lower cap. Returns whether anything changed.
    pub fn upgrade_schema(&mut self, ceiling: u32) -> bool {
        let mut changed = false;
        if self.max_level < ceiling {
            self.max_level = ceiling;
            changed = true;
        }
        if self.current_level > self.max_level {
            self.current_level = self.max_level;
            changed = true;
        }
        changed
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn unlocked_set(&self) -> HashSet<&str> {
        self.unlocked_nodes.iter().map(NodeId::as_str).collect()
    }

    fn require_domain(&self, id: &str) -> Result<&Domain, DomainError> {
        find_domain(&self.domains, id)
    }

    fn require_domain_mut(&mut self, id: &str) -> Result<&mut Domain, DomainError> {
        self.domains
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| DomainError::not_found("Domain", id))
    }

    fn lock_all_in(&mut self, domain: &Domain) -> Vec<NodeId> {
        let (locked, kept): (Vec<NodeId>, Vec<NodeId>) = std::mem::take(&mut self.unlocked_nodes)
            .into_iter()
            .partition(|n| domain.contains(n.as_str()));
        self.unlocked_nodes = kept;
        locked
    }
}

fn find_domain<'a>(domains: &'a [Domain], id: &str) -> Result<&'a Domain, DomainError> {
    domains
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| DomainError::not_found("Domain", id))
}

/// Depth-first removal of unlocked descendants of `node_id`.
fn lock_descendants(
    domain: &Domain,
    node_id: &str,
    unlocked: &mut Vec<NodeId>,
    locked: &mut Vec<NodeId>,
) {
    let Some(node) = domain.node(node_id) else {
        return;
    };
    for child in &node.connections {
        if let Some(position) = unlocked.iter().position(|n| n == child) {
            let child = unlocked.remove(position);
            lock_descendants(domain, child.as_str(), unlocked, locked);
            locked.push(child);
        }
    }
}

/// Level-1 reset: each domain keeps only its root, if unlocked.
///
/// Unlocked ids that belong to no domain are left alone; a domain without a
/// root loses all of its unlocked nodes.
fn keep_only_roots(domains: &[Domain], unlocked: &mut Vec<NodeId>) -> Vec<NodeId> {
    let mut locked = Vec::new();
    for domain in domains {
        let root = domain.root();
        unlocked.retain(|id| {
            let keep = !domain.contains(id.as_str()) || Some(id) == root;
            if !keep {
                locked.push(id.clone());
            }
            keep
        });
    }
    locked
}

/// Lock leaves from the end of the unlock order until `level` nodes remain.
///
/// A leaf is lockable when it is not the root of any domain and has no
/// unlocked child in any domain. Stops early when nothing is lockable.
fn shrink_to(domains: &[Domain], unlocked: &mut Vec<NodeId>, level: usize) -> Vec<NodeId> {
    let roots: HashSet<&str> = domains
        .iter()
        .filter_map(|d| d.root().map(NodeId::as_str))
        .collect();
    let mut children: HashMap<&str, Vec<&NodeId>> = HashMap::new();
    for node in domains.iter().flat_map(|d| d.nodes.iter()) {
        children
            .entry(node.id.as_str())
            .or_default()
            .extend(node.connections.iter());
    }

    let mut locked = Vec::new();
    while unlocked.len() > level {
        let candidate = {
            let unlocked_set: HashSet<&str> = unlocked.iter().map(NodeId::as_str).collect();
            unlocked.iter().rposition(|id| {
                !roots.contains(id.as_str())
                    && !children.get(id.as_str()).is_some_and(|kids| {
                        kids.iter().any(|kid| unlocked_set.contains(kid.as_str()))
                    })
            })
        };
        match candidate {
            Some(position) => locked.push(unlocked.remove(position)),
            None => break,
        }
    }
    locked
}

//! Progression use cases.
//!
//! Everything that changes the shape or state of a character's talent tree:
//! unlocking and locking nodes, level changes, domain management and node
//! editing. Reads heal card references without persisting.

use std::sync::Arc;

use crate::infrastructure::ports::DomainCatalog;
use crate::use_cases::services::TreeServices;

mod domains;
mod edit_node;
mod lock_node;
mod set_level;
mod toggle_node;
mod unlock_node;
mod view;

pub use domains::ManageDomains;
pub use edit_node::EditNode;
pub use lock_node::{LockNode, LockOutcome};
pub use set_level::{ChangeLevel, LevelRequest};
pub use toggle_node::{ToggleNode, ToggleOutcome};
pub use unlock_node::{UnlockNode, UnlockOutcome};
pub use view::{LoadTree, NodeDetails, NodeInfo, NodeStatus, TreeView};

/// Container for progression use cases.
pub struct ProgressionUseCases {
    pub load: Arc<LoadTree>,
    pub node_info: Arc<NodeInfo>,
    pub toggle: Arc<ToggleNode>,
    pub unlock: Arc<UnlockNode>,
    pub lock: Arc<LockNode>,
    pub level: Arc<ChangeLevel>,
    pub domains: Arc<ManageDomains>,
    pub edit_node: Arc<EditNode>,
}

impl ProgressionUseCases {
    pub fn new(services: TreeServices, catalog: Arc<dyn DomainCatalog>) -> Self {
        Self {
            load: Arc::new(LoadTree::new(services.clone())),
            node_info: Arc::new(NodeInfo::new(services.clone())),
            toggle: Arc::new(ToggleNode::new(services.clone())),
            unlock: Arc::new(UnlockNode::new(services.clone())),
            lock: Arc::new(LockNode::new(services.clone())),
            level: Arc::new(ChangeLevel::new(services.clone())),
            domains: Arc::new(ManageDomains::new(services.clone(), catalog)),
            edit_node: Arc::new(EditNode::new(services)),
        }
    }
}

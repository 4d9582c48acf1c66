//! Talent tree domain model
//!
//! Pure, synchronous types: identifiers, the per-character progression
//! aggregate, and the node/card binding rules. Persistence and permissions
//! live in `talent-tree-engine`.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use aggregates::{LevelChange, ProgressionState, RemovedDomain, DEFAULT_MAX_LEVEL};
pub use entities::{
    icon_is_image, object_entry, read_description, set_str, template_nodes, write_description,
    Card, CardBinding, CardDraft, CardEdit, CardPatch, Domain, NewCard, Node, NodeDirection,
    NodeEdit, DEFAULT_CARD_TYPE, DEFAULT_NODE_ICON, DEFAULT_NODE_LABEL,
};
pub use error::DomainError;
pub use ids::{CardRef, CharacterId, DomainId, NodeId, UserId};
pub use value_objects::{DomainCatalogEntry, DomainGraph, DEFAULT_DOMAIN_SRC};

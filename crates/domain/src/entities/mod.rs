//! Domain entities - Core business objects with identity

mod card;
mod domain;
mod node;

pub use card::{
    object_entry, read_description, set_str, write_description, Card, CardDraft, CardEdit,
    CardPatch, NewCard, DEFAULT_CARD_TYPE,
};
pub use domain::{template_nodes, Domain};
pub use node::{
    icon_is_image, CardBinding, Node, NodeDirection, NodeEdit, DEFAULT_NODE_ICON,
    DEFAULT_NODE_LABEL,
};

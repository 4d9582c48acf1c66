//! Node entity - one unlockable step in a domain's talent tree
//!
//! Connections are directed and outgoing: an edge points from the
//! prerequisite to the node it opens up.
//!
//! ## Card binding
//!
//! A node is in one of three binding states (see [`CardBinding`]):
//! - **Unbound**: no card
//! - **Staged**: a card payload is stored on the node but no document exists
//!   in the character's collection yet
//! - **Bound**: `domainCardUuid` refers to a card document
//!
//! Staged cards become real documents when the node is unlocked.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::card::{read_description, set_str, write_description, Card, CardDraft, NewCard};
use crate::ids::{CardRef, NodeId};

/// Icon used by nodes without a custom icon
pub const DEFAULT_NODE_ICON: &str = "fas fa-circle";

/// Label used by nodes saved without a name
pub const DEFAULT_NODE_LABEL: &str = "Unnamed node";

const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "ico"];
const FONT_AWESOME_PREFIXES: [&str; 5] = ["fas ", "fa ", "fab ", "far ", "fal "];

/// Layout hint for drawing the outgoing connectors of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeDirection {
    Down,
    Up,
    Left,
    Right,
    Horizontal,
    Vertical,
    #[default]
    #[serde(other)]
    None,
}

/// A vertex of a domain graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub connections: Vec<NodeId>,
    #[serde(default)]
    pub direction: NodeDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_card_uuid: Option<CardRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_card_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_card_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_card_img: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_card_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_image: Option<bool>,
}

/// Binding state of a node's card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardBinding<'a> {
    Unbound,
    Staged,
    Bound(&'a CardRef),
}

/// Fields a privileged editor may change on a node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeEdit {
    pub label: Option<String>,
    pub icon: Option<String>,
    pub description: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: DEFAULT_NODE_ICON.to_string(),
            x: 0,
            y: 0,
            connections: Vec::new(),
            direction: NodeDirection::None,
            description: None,
            domain_card_uuid: None,
            domain_card_data: None,
            domain_card_name: None,
            domain_card_img: None,
            domain_card_description: None,
            is_image: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_connections<I, T>(mut self, connections: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        self.connections = connections.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_direction(mut self, direction: NodeDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the icon should be drawn as an image rather than a glyph.
    ///
    /// An explicit `isImage` flag wins. Otherwise URLs, absolute paths, data
    /// URIs, and paths with an image extension count as images unless the
    /// icon is a Font Awesome class list.
    pub fn is_image(&self) -> bool {
        self.is_image.unwrap_or_else(|| icon_is_image(&self.icon))
    }

    pub fn connects_to(&self, target: &str) -> bool {
        self.connections.iter().any(|c| c == target)
    }

    /// Apply an editor change; blank values fall back to defaults.
    pub fn apply_edit(&mut self, edit: NodeEdit) {
        if let Some(label) = edit.label {
            self.label = non_blank(label).unwrap_or_else(|| DEFAULT_NODE_LABEL.to_string());
        }
        if let Some(icon) = edit.icon {
            self.icon = non_blank(icon).unwrap_or_else(|| DEFAULT_NODE_ICON.to_string());
            // Re-detect from the new icon
            self.is_image = None;
        }
        if let Some(description) = edit.description {
            self.description = Some(description);
        }
    }

    // =========================================================================
    // Card binding
    // =========================================================================

    pub fn card_binding(&self) -> CardBinding<'_> {
        match (&self.domain_card_uuid, &self.domain_card_data) {
            (Some(reference), _) => CardBinding::Bound(reference),
            (None, Some(_)) => CardBinding::Staged,
            (None, None) => CardBinding::Unbound,
        }
    }

    pub fn is_staged(&self) -> bool {
        matches!(self.card_binding(), CardBinding::Staged)
    }

    /// Bind the node to `card`, mirroring its display fields.
    ///
    /// `description_override` replaces the card's description, used when the
    /// editor has just saved a newer text than the document holds.
    pub fn associate(&mut self, card: &Card, description_override: Option<&str>) {
        self.domain_card_uuid = Some(card.reference.clone());
        self.label = card.name.clone();
        self.icon = card.img.clone();
        match description_override {
            Some(text) => self.description = Some(text.to_string()),
            None => {
                if let Some(text) = card.description() {
                    self.description = Some(text);
                }
            }
        }
        self.is_image = Some(true);
        self.clear_staged();
    }

    /// Store a card payload on the node without creating a document.
    pub fn stage(&mut self, draft: CardDraft) {
        self.label = draft.name.clone();
        self.icon = draft.img.clone();
        self.description = Some(draft.description.clone());
        self.is_image = Some(true);
        self.domain_card_name = Some(draft.name.clone());
        self.domain_card_img = Some(draft.img.clone());
        self.domain_card_description = Some(draft.description.clone());
        self.domain_card_data = Some(draft.into_payload());
        self.domain_card_uuid = None;
    }

    /// Document payload for a staged card, with the denormalised name, image
    /// and description taking precedence over the stored payload.
    pub fn staged_card(&self) -> Option<NewCard> {
        if self.domain_card_uuid.is_some() {
            return None;
        }
        let mut data = self.domain_card_data.clone()?;
        if let Some(description) = &self.domain_card_description {
            write_description(&mut data, description);
        }
        let name = self
            .domain_card_name
            .clone()
            .or_else(|| data.get("name").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| self.label.clone());
        let img = self
            .domain_card_img
            .clone()
            .or_else(|| data.get("img").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| self.icon.clone());
        set_str(&mut data, "name", &name);
        set_str(&mut data, "img", &img);
        Some(NewCard::new(name, img, data))
    }

    /// Forget a card reference that no longer resolves.
    pub fn clear_binding(&mut self) {
        self.domain_card_uuid = None;
    }

    /// Description to show for the node, preferring the staged text.
    pub fn display_description(&self) -> String {
        self.domain_card_description
            .clone()
            .or_else(|| self.description.clone())
            .or_else(|| self.domain_card_data.as_ref().and_then(read_description))
            .unwrap_or_default()
    }

    fn clear_staged(&mut self) {
        self.domain_card_data = None;
        self.domain_card_name = None;
        self.domain_card_img = None;
        self.domain_card_description = None;
    }
}

/// Classify an icon string as an image reference or a glyph class.
pub fn icon_is_image(icon: &str) -> bool {
    if icon.is_empty() {
        return false;
    }
    if icon.starts_with("http://")
        || icon.starts_with("https://")
        || icon.starts_with('/')
        || icon.starts_with("data:")
    {
        return true;
    }
    let is_font_awesome = FONT_AWESOME_PREFIXES
        .iter()
        .any(|prefix| icon.starts_with(prefix));
    let has_image_extension = icon
        .rsplit_once('.')
        .map(|(_, ext)| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false);
    has_image_extension && !is_font_awesome
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

//! Card documents - host-owned abilities that a node can be bound to
//!
//! The host stores cards as opaque JSON documents. The tree only cares about
//! name, image, description and whether the card is a hidden editing copy, so
//! everything else travels untouched in `data`.
//!
//! ## Description shape
//!
//! Hosts store `system.description` either as a plain string or as a rich
//! text field `{ "value": "..." }`. [`read_description`] and
//! [`write_description`] handle both and preserve whichever shape is present.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::{CardRef, CharacterId};

/// Document type used when a staged payload does not name one
pub const DEFAULT_CARD_TYPE: &str = "domainCard";

/// A card document as exposed by the host's document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub reference: CardRef,
    pub owner: CharacterId,
    pub name: String,
    pub img: String,
    /// Full host payload (`type`, `system`, `flags`, ...)
    pub data: Value,
    /// Hidden editing copy; excluded from every owned-card listing
    pub temporary: bool,
}

impl Card {
    /// Description stored on the card, if any.
    pub fn description(&self) -> Option<String> {
        read_description(&self.data)
    }

    /// Whether the card belongs to `character`.
    pub fn is_owned_by(&self, character: CharacterId) -> bool {
        self.owner == character
    }

    /// Apply an editor change and return the patch that brings the stored
    /// document in line.
    pub fn apply_edit(&mut self, edit: &CardEdit) -> CardPatch {
        self.name = edit.name.clone();
        self.img = edit.img.clone();
        write_description(&mut self.data, &edit.description);
        set_str(&mut self.data, "name", &self.name);
        set_str(&mut self.data, "img", &self.img);
        CardPatch {
            name: Some(self.name.clone()),
            img: Some(self.img.clone()),
            data: Some(self.data.clone()),
            temporary: None,
        }
    }
}

/// New display fields for a card already bound to a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardEdit {
    pub name: String,
    pub img: String,
    pub description: String,
}

/// Payload for creating a card
#[derive(Debug, Clone, PartialEq)]
pub struct NewCard {
    pub name: String,
    pub img: String,
    pub data: Value,
    pub temporary: bool,
}

impl NewCard {
    pub fn new(name: impl Into<String>, img: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            img: img.into(),
            data,
            temporary: false,
        }
    }

    /// Mark the card as a hidden editing copy.
    pub fn as_temporary(mut self) -> Self {
        self.temporary = true;
        self
    }
}

/// Partial update for an existing card; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardPatch {
    pub name: Option<String>,
    pub img: Option<String>,
    pub data: Option<Value>,
    pub temporary: Option<bool>,
}

impl CardPatch {
    /// Patch that turns a temporary editing copy into a regular card.
    pub fn promote() -> Self {
        Self {
            temporary: Some(false),
            ..Self::default()
        }
    }
}

/// A card authored for a node that is not unlocked yet
#[derive(Debug, Clone, PartialEq)]
pub struct CardDraft {
    pub name: String,
    pub img: String,
    pub description: String,
    pub data: Value,
}

impl CardDraft {
    pub fn new(
        name: impl Into<String>,
        img: impl Into<String>,
        description: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            name: name.into(),
            img: img.into(),
            description: description.into(),
            data,
        }
    }

    /// Full payload with name, image and description folded in.
    pub fn into_payload(self) -> Value {
        let mut data = self.data;
        write_description(&mut data, &self.description);
        set_str(&mut data, "name", &self.name);
        set_str(&mut data, "img", &self.img);
        data
    }
}

/// Read `system.description` as a string, accepting the rich `{ value }` shape.
pub fn read_description(data: &Value) -> Option<String> {
    match data.get("system")?.get("description")? {
        Value::String(text) => Some(text.clone()),
        Value::Object(rich) => rich.get("value").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Write `system.description`, keeping the rich `{ value }` shape when present.
pub fn write_description(data: &mut Value, description: &str) {
    let system = object_entry(data, "system");
    match system.get_mut("description") {
        Some(Value::Object(rich)) if rich.contains_key("value") => {
            rich.insert("value".to_string(), Value::String(description.to_string()));
        }
        _ => {
            system.insert(
                "description".to_string(),
                Value::String(description.to_string()),
            );
        }
    }
}

/// Set a top-level string field, turning a non-object payload into an object.
pub fn set_str(data: &mut Value, key: &str, value: &str) {
    as_object(data).insert(key.to_string(), Value::String(value.to_string()));
}

/// Borrow (creating if needed) the object stored under `key`.
pub fn object_entry<'a>(data: &'a mut Value, key: &str) -> &'a mut Map<String, Value> {
    let entry = as_object(data)
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    as_object(entry)
}

fn as_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

//! Game-rule domain catalog entries

use serde::{Deserialize, Serialize};

use crate::ids::DomainId;

/// Icon used for domains whose catalog entry has no artwork
pub const DEFAULT_DOMAIN_SRC: &str = "icons/svg/portal.svg";

/// A domain offered by the game system (standard or homebrew)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainCatalogEntry {
    pub id: DomainId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

impl DomainCatalogEntry {
    pub fn new(id: impl Into<DomainId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            src: None,
        }
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    /// Label to display, falling back to the id when the catalog has none.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            self.id.as_str()
        } else {
            &self.label
        }
    }
}

//! Storage port traits for the host's flag, settings and document stores.

use async_trait::async_trait;
use serde_json::Value;
use talent_tree_domain::{Card, CardPatch, CardRef, CharacterId, DomainCatalogEntry, NewCard};

use super::error::RepoError;

// =============================================================================
// Progression Storage
// =============================================================================

/// Character-scoped key/value flags (primary progression storage).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlagStore: Send + Sync {
    async fn get_flag(
        &self,
        character: CharacterId,
        scope: &str,
        key: &str,
    ) -> Result<Option<Value>, RepoError>;
    async fn set_flag(
        &self,
        character: CharacterId,
        scope: &str,
        key: &str,
        value: Value,
    ) -> Result<(), RepoError>;
}

/// Legacy world-level table keyed by character (read fallback, write mirror).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LegacyTreeTable: Send + Sync {
    async fn get(&self, character: CharacterId) -> Result<Option<Value>, RepoError>;
    async fn put(&self, character: CharacterId, value: Value) -> Result<(), RepoError>;
}

// =============================================================================
// Documents
// =============================================================================

/// Host document store holding cards.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn create(&self, owner: CharacterId, card: NewCard) -> Result<Card, RepoError>;
    async fn update(&self, reference: &CardRef, patch: CardPatch) -> Result<(), RepoError>;
    async fn get(&self, reference: &CardRef) -> Result<Option<Card>, RepoError>;
    /// Every card owned by `owner`, temporary ones included.
    async fn list_for_owner(&self, owner: CharacterId) -> Result<Vec<Card>, RepoError>;
    async fn delete(&self, reference: &CardRef) -> Result<(), RepoError>;
}

/// Game-rule domains offered by the system (standard plus homebrew).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainCatalog: Send + Sync {
    async fn list(&self) -> Result<Vec<DomainCatalogEntry>, RepoError>;
}

//! In-memory adapters for development, embedding and testing
//!
//! These keep everything in process-local maps and do not persist data.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use talent_tree_domain::{
    Card, CardPatch, CardRef, CharacterId, DomainCatalogEntry, NewCard, UserId,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::infrastructure::ports::{
    AccessPolicy, CardStore, DomainCatalog, FlagStore, LegacyTreeTable, Notifier, RepoError,
};

// =============================================================================
// Flags
// =============================================================================

type FlagKey = (CharacterId, String, String);

#[derive(Default)]
pub struct InMemoryFlagStore {
    flags: Arc<RwLock<HashMap<FlagKey, Value>>>,
}

impl InMemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlagStore for InMemoryFlagStore {
    async fn get_flag(
        &self,
        character: CharacterId,
        scope: &str,
        key: &str,
    ) -> Result<Option<Value>, RepoError> {
        let flags = self.flags.read().await;
        Ok(flags
            .get(&(character, scope.to_string(), key.to_string()))
            .cloned())
    }

    async fn set_flag(
        &self,
        character: CharacterId,
        scope: &str,
        key: &str,
        value: Value,
    ) -> Result<(), RepoError> {
        let mut flags = self.flags.write().await;
        flags.insert((character, scope.to_string(), key.to_string()), value);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryLegacyTable {
    rows: Arc<RwLock<HashMap<CharacterId, Value>>>,
}

impl InMemoryLegacyTable {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LegacyTreeTable for InMemoryLegacyTable {
    async fn get(&self, character: CharacterId) -> Result<Option<Value>, RepoError> {
        Ok(self.rows.read().await.get(&character).cloned())
    }

    async fn put(&self, character: CharacterId, value: Value) -> Result<(), RepoError> {
        self.rows.write().await.insert(character, value);
        Ok(())
    }
}

// =============================================================================
// Cards
// =============================================================================

#[derive(Default)]
pub struct InMemoryCardStore {
    cards: Arc<RwLock<HashMap<CardRef, Card>>>,
}

impl InMemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a card as-is, e.g. one owned by another character.
    pub async fn insert(&self, card: Card) {
        self.cards.write().await.insert(card.reference.clone(), card);
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn create(&self, owner: CharacterId, card: NewCard) -> Result<Card, RepoError> {
        let card = Card {
            reference: CardRef::new(format!("Actor.{owner}.Item.{}", Uuid::new_v4().simple())),
            owner,
            name: card.name,
            img: card.img,
            data: card.data,
            temporary: card.temporary,
        };
        self.cards
            .write()
            .await
            .insert(card.reference.clone(), card.clone());
        Ok(card)
    }

    async fn update(&self, reference: &CardRef, patch: CardPatch) -> Result<(), RepoError> {
        let mut cards = self.cards.write().await;
        let card = cards
            .get_mut(reference)
            .ok_or_else(|| RepoError::not_found("Card", reference))?;
        if let Some(name) = patch.name {
            card.name = name;
        }
        if let Some(img) = patch.img {
            card.img = img;
        }
        if let Some(data) = patch.data {
            card.data = data;
        }
        if let Some(temporary) = patch.temporary {
            card.temporary = temporary;
        }
        Ok(())
    }

    async fn get(&self, reference: &CardRef) -> Result<Option<Card>, RepoError> {
        Ok(self.cards.read().await.get(reference).cloned())
    }

    async fn list_for_owner(&self, owner: CharacterId) -> Result<Vec<Card>, RepoError> {
        let cards = self.cards.read().await;
        let mut owned: Vec<Card> = cards
            .values()
            .filter(|card| card.is_owned_by(owner))
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(owned)
    }

    async fn delete(&self, reference: &CardRef) -> Result<(), RepoError> {
        self.cards
            .write()
            .await
            .remove(reference)
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found("Card", reference))
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Default)]
pub struct StaticDomainCatalog {
    entries: Vec<DomainCatalogEntry>,
}

impl StaticDomainCatalog {
    pub fn new(entries: Vec<DomainCatalogEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl DomainCatalog for StaticDomainCatalog {
    async fn list(&self) -> Result<Vec<DomainCatalogEntry>, RepoError> {
        Ok(self.entries.clone())
    }
}

// =============================================================================
// Permissions
// =============================================================================

/// Fixed permission table.
#[derive(Default)]
pub struct StaticAccessPolicy {
    privileged: HashSet<UserId>,
    owners: HashSet<(UserId, CharacterId)>,
}

impl StaticAccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_privileged(mut self, user: UserId) -> Self {
        self.privileged.insert(user);
        self
    }

    pub fn with_owner(mut self, user: UserId, character: CharacterId) -> Self {
        self.owners.insert((user, character));
        self
    }
}

impl AccessPolicy for StaticAccessPolicy {
    fn is_privileged(&self, user: UserId) -> bool {
        self.privileged.contains(&user)
    }

    /// Privileged users control every character.
    fn owns_character(&self, user: UserId, character: CharacterId) -> bool {
        self.is_privileged(user) || self.owners.contains(&(user, character))
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// Routes notifications to `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        tracing::info!(notification = %message, "User notification");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(notification = %message, "User notification");
    }

    fn error(&self, message: &str) {
        tracing::error!(notification = %message, "User notification");
    }
}

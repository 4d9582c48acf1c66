//! Card binding entity.
//!
//! Keeps nodes and card documents in step: materialises staged cards when a
//! node unlocks, heals dangling references at read time, and hides temporary
//! editing copies from owned-card listings.

use std::sync::Arc;

use serde_json::Value;
use talent_tree_domain::{
    object_entry, set_str, Card, CardBinding, CardEdit, CardPatch, CardRef, CharacterId, DomainId,
    Node, ProgressionState, DEFAULT_CARD_TYPE,
};

use crate::infrastructure::ports::{CardStore, RepoError};

/// Card binding operations over the host document store.
pub struct CardBinder {
    cards: Arc<dyn CardStore>,
}

impl CardBinder {
    pub fn new(cards: Arc<dyn CardStore>) -> Self {
        Self { cards }
    }

    pub async fn resolve(&self, reference: &CardRef) -> Result<Option<Card>, RepoError> {
        self.cards.get(reference).await
    }

    /// Owned cards, without temporary editing copies.
    pub async fn owned_cards(&self, character: CharacterId) -> Result<Vec<Card>, RepoError> {
        Ok(self
            .cards
            .list_for_owner(character)
            .await?
            .into_iter()
            .filter(|card| !card.temporary)
            .collect())
    }

    /// Bind `node` to an existing card owned by `character`.
    pub async fn associate(
        &self,
        character: CharacterId,
        node: &mut Node,
        reference: &CardRef,
    ) -> Result<Card, RepoError> {
        let card = self.owned_card(character, reference).await?;
        node.associate(&card, None);
        Ok(card)
    }

    /// Save an edit to the card bound to `node` and re-bind the node so its
    /// mirrored fields follow. Returns `None` when the node is not bound.
    pub async fn update_bound(
        &self,
        character: CharacterId,
        node: &mut Node,
        edit: &CardEdit,
    ) -> Result<Option<Card>, RepoError> {
        let CardBinding::Bound(reference) = node.card_binding() else {
            return Ok(None);
        };
        let reference = reference.clone();
        let mut card = self.owned_card(character, &reference).await?;

        let patch = card.apply_edit(edit);
        self.cards.update(&reference, patch).await?;
        node.associate(&card, Some(&edit.description));

        tracing::info!(
            character_id = %character,
            node_id = %node.id,
            card = %reference,
            "Bound card updated"
        );
        Ok(Some(card))
    }

    /// Create a real card for a staged node and bind it.
    ///
    /// Promotes a temporary card with the staged name when one exists.
    /// Returns `None` when the node has nothing staged. On error the node is
    /// left staged.
    pub async fn materialize(
        &self,
        character: CharacterId,
        node: &mut Node,
    ) -> Result<Option<CardRef>, RepoError> {
        let Some(new_card) = node.staged_card() else {
            return Ok(None);
        };
        let description = node.domain_card_description.clone();

        let card = match self.find_temporary(character, &new_card.name).await? {
            Some(mut card) => {
                self.cards
                    .update(&card.reference, CardPatch::promote())
                    .await?;
                card.temporary = false;
                tracing::info!(
                    character_id = %character,
                    node_id = %node.id,
                    card = %card.reference,
                    "Promoted temporary card"
                );
                card
            }
            None => {
                let card = self.cards.create(character, new_card).await?;
                tracing::info!(
                    character_id = %character,
                    node_id = %node.id,
                    card = %card.reference,
                    "Created card for unlocked node"
                );
                card
            }
        };

        node.associate(&card, description.as_deref());
        Ok(Some(card.reference))
    }

    /// Create a hidden editing copy of a staged node's card.
    ///
    /// Reuses an existing temporary card with the same name. Returns `None`
    /// when the node has nothing staged.
    pub async fn create_temporary(
        &self,
        character: CharacterId,
        domain: &DomainId,
        node: &Node,
    ) -> Result<Option<Card>, RepoError> {
        let Some(mut new_card) = node.staged_card() else {
            return Ok(None);
        };
        if let Some(existing) = self.find_temporary(character, &new_card.name).await? {
            return Ok(Some(existing));
        }

        prepare_editing_payload(&mut new_card.data, domain);
        let card = self
            .cards
            .create(character, new_card.as_temporary())
            .await?;
        tracing::debug!(
            character_id = %character,
            node_id = %node.id,
            card = %card.reference,
            "Created temporary card for editing"
        );
        Ok(Some(card))
    }

    /// Clear card references that no longer resolve to one of the
    /// character's cards. Returns how many nodes were healed.
    ///
    /// Lookup failures leave the reference in place.
    pub async fn reconcile(&self, character: CharacterId, state: &mut ProgressionState) -> usize {
        let mut healed = 0;
        for node in state.nodes_mut() {
            let CardBinding::Bound(reference) = node.card_binding() else {
                continue;
            };
            let reference = reference.clone();
            match self.cards.get(&reference).await {
                Ok(Some(card)) if card.is_owned_by(character) => {}
                Ok(found) => {
                    tracing::debug!(
                        character_id = %character,
                        node_id = %node.id,
                        card = %reference,
                        foreign = found.is_some(),
                        "Clearing dangling card reference"
                    );
                    node.clear_binding();
                    healed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        character_id = %character,
                        card = %reference,
                        error = %e,
                        "Card lookup failed during reconcile"
                    );
                }
            }
        }
        healed
    }

    async fn owned_card(
        &self,
        character: CharacterId,
        reference: &CardRef,
    ) -> Result<Card, RepoError> {
        self.cards
            .get(reference)
            .await?
            .filter(|card| card.is_owned_by(character))
            .ok_or_else(|| RepoError::not_found("Card", reference))
    }

    async fn find_temporary(
        &self,
        character: CharacterId,
        name: &str,
    ) -> Result<Option<Card>, RepoError> {
        Ok(self
            .cards
            .list_for_owner(character)
            .await?
            .into_iter()
            .find(|card| card.temporary && card.name == name))
    }
}

/// Defaults a temporary editing copy needs: a document type, its domain, and
/// the vault flag that keeps it out of the character's loadout.
fn prepare_editing_payload(data: &mut Value, domain: &DomainId) {
    if data.get("type").and_then(Value::as_str).is_none() {
        set_str(data, "type", DEFAULT_CARD_TYPE);
    }
    let system = object_entry(data, "system");
    if system.get("domain").and_then(Value::as_str).is_none() {
        system.insert("domain".to_string(), Value::String(domain.to_string()));
    }
    system.insert("inVault".to_string(), Value::Bool(true));
}

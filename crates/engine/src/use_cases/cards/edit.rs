//! Edit the card bound to a node (game master only).
//!
//! Saves the new name, image and description to the card document and
//! re-binds the node so its mirrored fields follow.

use talent_tree_domain::{Card, CardEdit, DomainError};

use crate::use_cases::error::ProgressionError;
use crate::use_cases::services::{RequestContext, TreeServices};

pub struct EditBoundCard {
    services: TreeServices,
}

impl EditBoundCard {
    pub fn new(services: TreeServices) -> Self {
        Self { services }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
        edit: CardEdit,
    ) -> Result<Card, ProgressionError> {
        self.run(ctx, domain_id, node_id, edit)
            .await
            .inspect_err(|e| self.services.notify_failure(ctx, e))
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
        edit: CardEdit,
    ) -> Result<Card, ProgressionError> {
        self.services.require_privileged(ctx, "edit cards")?;
        let mut checkout = self.services.checkout(ctx).await?;
        let node = checkout.state.node_mut(domain_id, node_id)?;
        let card = self
            .services
            .cards
            .update_bound(ctx.character_id, node, &edit)
            .await?
            .ok_or_else(|| DomainError::validation(format!("node {node_id} has no bound card")))?;
        self.services.commit(ctx, checkout).await?;
        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::CardStore;
    use crate::use_cases::test_support::{chain_state, Harness};
    use serde_json::json;
    use talent_tree_domain::{CardBinding, CardRef};

    fn edit() -> CardEdit {
        CardEdit {
            name: "Rune Bastion".to_string(),
            img: "bastion.webp".to_string(),
            description: "Wards the whole party".to_string(),
        }
    }

    async fn bound_harness() -> Harness {
        let harness = Harness::new();
        harness
            .cards
            .insert(Card {
                reference: CardRef::new("c-1"),
                owner: harness.character,
                name: "Rune Ward".to_string(),
                img: "ward.webp".to_string(),
                data: json!({ "system": { "description": { "value": "Wards off harm" } } }),
                temporary: false,
            })
            .await;
        let mut state = chain_state(1);
        state.node_mut("arcana", "A").expect("node").domain_card_uuid = Some(CardRef::new("c-1"));
        harness.seed(&state).await;
        harness
    }

    #[tokio::test]
    async fn saves_card_and_rebinds_node() {
        let harness = bound_harness().await;

        let card = EditBoundCard::new(harness.services.clone())
            .execute(&harness.gm(), "arcana", "A", edit())
            .await
            .expect("edit card");
        assert_eq!(card.name, "Rune Bastion");

        let stored = harness
            .cards
            .get(&CardRef::new("c-1"))
            .await
            .expect("get")
            .expect("card");
        assert_eq!(stored.img, "bastion.webp");
        assert_eq!(stored.description().as_deref(), Some("Wards the whole party"));

        let state = harness.state().await;
        let node = state.node("arcana", "A").expect("node");
        assert_eq!(node.card_binding(), CardBinding::Bound(&CardRef::new("c-1")));
        assert_eq!(node.label, "Rune Bastion");
        assert_eq!(node.icon, "bastion.webp");
        assert_eq!(node.description.as_deref(), Some("Wards the whole party"));
    }

    #[tokio::test]
    async fn unbound_node_is_rejected() {
        let harness = bound_harness().await;

        let result = EditBoundCard::new(harness.services.clone())
            .execute(&harness.gm(), "arcana", "B", edit())
            .await;
        assert!(matches!(
            result,
            Err(ProgressionError::Domain(DomainError::Validation(_)))
        ));
        assert_eq!(harness.notifier.levels(), vec!["warn"]);
    }

    #[tokio::test]
    async fn players_cannot_edit_cards() {
        let harness = bound_harness().await;

        let result = EditBoundCard::new(harness.services.clone())
            .execute(&harness.player(), "arcana", "A", edit())
            .await;
        assert!(matches!(result, Err(ProgressionError::PermissionDenied(_))));
        let stored = harness
            .cards
            .get(&CardRef::new("c-1"))
            .await
            .expect("get")
            .expect("card");
        assert_eq!(stored.name, "Rune Ward");
    }
}

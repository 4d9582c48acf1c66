//! Unlock node use case.
//!
//! Spends one level of budget on an available node and, when the node holds
//! a staged card, turns that card into a real document.

use talent_tree_domain::{CardRef, NodeId, ProgressionState};

use crate::use_cases::error::ProgressionError;
use crate::use_cases::services::{RequestContext, TreeServices};

/// Result of a successful unlock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockOutcome {
    pub node_id: NodeId,
    /// Card materialised for the node, if it had one staged
    pub card: Option<CardRef>,
    /// Why materialisation failed; the node stays staged and the unlock holds
    pub card_error: Option<String>,
}

pub struct UnlockNode {
    services: TreeServices,
}

impl UnlockNode {
    pub fn new(services: TreeServices) -> Self {
        Self { services }
    }

    /// Any user controlling the character may unlock.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
    ) -> Result<UnlockOutcome, ProgressionError> {
        self.run(ctx, domain_id, node_id)
            .await
            .inspect_err(|e| self.services.notify_failure(ctx, e))
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
    ) -> Result<UnlockOutcome, ProgressionError> {
        self.services.require_owner(ctx)?;
        let mut checkout = self.services.checkout(ctx).await?;
        let outcome =
            unlock_in_state(&self.services, ctx, &mut checkout.state, domain_id, node_id).await?;
        self.services.commit(ctx, checkout).await?;
        Ok(outcome)
    }
}

/// Unlock inside an already checked-out state.
pub(crate) async fn unlock_in_state(
    services: &TreeServices,
    ctx: &RequestContext,
    state: &mut ProgressionState,
    domain_id: &str,
    node_id: &str,
) -> Result<UnlockOutcome, ProgressionError> {
    state.unlock(domain_id, node_id)?;

    let node = state.node_mut(domain_id, node_id)?;
    let (card, card_error) = match services.cards.materialize(ctx.character_id, node).await {
        Ok(card) => (card, None),
        Err(e) => {
            tracing::warn!(
                character_id = %ctx.character_id,
                node_id = %node_id,
                error = %e,
                "Card materialisation failed; node stays staged"
            );
            services
                .notifier
                .error(&format!("Could not create the card for {}: {e}", node.label));
            (None, Some(e.to_string()))
        }
    };

    tracing::info!(
        character_id = %ctx.character_id,
        domain_id = %domain_id,
        node_id = %node_id,
        unlocked = state.unlocked_nodes().len(),
        level = state.current_level(),
        "Node unlocked"
    );

    Ok(UnlockOutcome {
        node_id: NodeId::new(node_id),
        card,
        card_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{CardStore, MockCardStore, MockNotifier, RepoError};
    use crate::use_cases::progression::LoadTree;
    use crate::use_cases::test_support::{chain_state, Harness};
    use serde_json::json;
    use std::sync::Arc;
    use talent_tree_domain::{CardBinding, CardDraft, DomainError};

    #[tokio::test]
    async fn scenario_a_budget_of_one() {
        let harness = Harness::new();
        harness.seed(&chain_state(1)).await;
        let use_case = UnlockNode::new(harness.services.clone());

        use_case
            .execute(&harness.player(), "arcana", "A")
            .await
            .expect("unlock A");
        let result = use_case.execute(&harness.player(), "arcana", "B").await;

        assert!(matches!(
            result,
            Err(ProgressionError::Domain(DomainError::BudgetExhausted {
                unlocked: 1,
                level: 1
            }))
        ));
        let state = harness.state().await;
        assert_eq!(state.unlocked_nodes(), &[NodeId::new("A")]);
        assert_eq!(harness.notifier.levels(), vec!["warn"]);
    }

    #[tokio::test]
    async fn scenario_b_unlock_chain() {
        let harness = Harness::new();
        harness.seed(&chain_state(3)).await;
        let use_case = UnlockNode::new(harness.services.clone());

        for node in ["A", "B", "C"] {
            use_case
                .execute(&harness.player(), "arcana", node)
                .await
                .unwrap_or_else(|e| panic!("unlock {node}: {e}"));
        }

        let unlocked: Vec<NodeId> = harness.state().await.unlocked_nodes().to_vec();
        assert_eq!(unlocked, vec![NodeId::new("A"), NodeId::new("B"), NodeId::new("C")]);
    }

    #[tokio::test]
    async fn scenario_e_staged_card_is_materialised() {
        let harness = Harness::new();
        let mut state = chain_state(1);
        state
            .node_mut("arcana", "A")
            .expect("node")
            .stage(CardDraft::new("Fireball", "fire.webp", "Boom", json!({})));
        harness.seed(&state).await;

        let outcome = UnlockNode::new(harness.services.clone())
            .execute(&harness.player(), "arcana", "A")
            .await
            .expect("unlock");

        let reference = outcome.card.expect("card created");
        let state = harness.state().await;
        let node = state.node("arcana", "A").expect("node");
        assert_eq!(node.card_binding(), CardBinding::Bound(&reference));
        assert!(node.domain_card_data.is_none());
        assert!(node.domain_card_name.is_none());
        assert!(node.domain_card_img.is_none());
        assert!(node.domain_card_description.is_none());

        let card = harness.cards.get(&reference).await.expect("get").expect("card");
        assert_eq!(card.owner, harness.character);
        assert_eq!(card.name, "Fireball");
    }

    #[tokio::test]
    async fn when_card_creation_fails_unlock_still_commits() {
        let harness = Harness::new();
        let mut state = chain_state(1);
        state
            .node_mut("arcana", "A")
            .expect("node")
            .stage(CardDraft::new("Fireball", "fire.webp", "Boom", json!({})));
        harness.seed(&state).await;

        let mut cards = MockCardStore::new();
        cards.expect_list_for_owner().returning(|_| Ok(vec![]));
        cards
            .expect_create()
            .returning(|_, _| Err(RepoError::storage("create", "no permission")));
        let mut services = harness.services.clone();
        services.cards = Arc::new(crate::entities::CardBinder::new(Arc::new(cards)));

        let outcome = UnlockNode::new(services)
            .execute(&harness.player(), "arcana", "A")
            .await
            .expect("unlock");

        assert!(outcome.card.is_none());
        assert!(outcome.card_error.is_some());
        let state = harness.state().await;
        assert!(state.is_unlocked("A"));
        assert!(state.node("arcana", "A").expect("node").is_staged());
        assert_eq!(harness.notifier.levels(), vec!["error"]);
    }

    #[tokio::test]
    async fn when_not_owner_rejects_without_loading() {
        let mut notifier = MockNotifier::new();
        notifier.expect_error().times(1).return_const(());
        let harness = Harness::new().with_mock_notifier(notifier);
        harness.seed(&chain_state(1)).await;

        let result = UnlockNode::new(harness.services.clone())
            .execute(&harness.stranger(), "arcana", "A")
            .await;

        assert!(matches!(result, Err(ProgressionError::PermissionDenied(_))));
        assert!(harness.state().await.unlocked_nodes().is_empty());
    }

    #[tokio::test]
    async fn when_level_zero_nothing_is_available() {
        let harness = Harness::new();
        harness.seed(&chain_state(0)).await;

        let result = UnlockNode::new(harness.services.clone())
            .execute(&harness.player(), "arcana", "A")
            .await;

        assert!(matches!(
            result,
            Err(ProgressionError::Domain(DomainError::NodeUnavailable(_)))
        ));
    }

    #[tokio::test]
    async fn healed_reference_is_persisted_by_next_commit() {
        let harness = Harness::new();
        let mut state = chain_state(1);
        state.node_mut("arcana", "B").expect("node").domain_card_uuid =
            Some(CardRef::new("deleted"));
        harness.seed(&state).await;

        let view = LoadTree::new(harness.services.clone())
            .execute(&harness.player())
            .await
            .expect("view");
        assert_eq!(view.healed, 1);
        // Reads do not write
        let stored = harness.state().await;
        assert!(stored
            .node("arcana", "B")
            .is_ok_and(|n| n.domain_card_uuid.is_some()));

        UnlockNode::new(harness.services.clone())
            .execute(&harness.player(), "arcana", "A")
            .await
            .expect("unlock");

        let stored = harness.state().await;
        let node = stored.node("arcana", "B").expect("node");
        assert_eq!(node.card_binding(), CardBinding::Unbound);
    }
}

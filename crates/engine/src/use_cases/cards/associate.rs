//! Bind a node to an existing card (game master only).

use talent_tree_domain::{Card, CardRef};

use crate::use_cases::error::ProgressionError;
use crate::use_cases::services::{RequestContext, TreeServices};

pub struct AssociateCard {
    services: TreeServices,
}

impl AssociateCard {
    pub fn new(services: TreeServices) -> Self {
        Self { services }
    }

    /// Bind `reference` to the node, copying the card's name, image and
    /// description. Re-associating the same card changes nothing.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
        reference: &CardRef,
    ) -> Result<Card, ProgressionError> {
        self.run(ctx, domain_id, node_id, reference)
            .await
            .inspect_err(|e| self.services.notify_failure(ctx, e))
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
        reference: &CardRef,
    ) -> Result<Card, ProgressionError> {
        self.services.require_privileged(ctx, "assign cards")?;
        let mut checkout = self.services.checkout(ctx).await?;
        let node = checkout.state.node_mut(domain_id, node_id)?;
        let card = self
            .services
            .cards
            .associate(ctx.character_id, node, reference)
            .await?;
        self.services.commit(ctx, checkout).await?;

        tracing::info!(
            character_id = %ctx.character_id,
            node_id = %node_id,
            card = %reference,
            "Card associated with node"
        );
        Ok(card)
    }
}

//! Stage a card payload on a node (game master only).
//!
//! A locked node keeps the payload until it unlocks. An unlocked node gets
//! its card right away.

use talent_tree_domain::{CardDraft, CardRef};

use crate::use_cases::error::ProgressionError;
use crate::use_cases::services::{RequestContext, TreeServices};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Payload stored; the card is created on unlock
    Staged,
    /// Node was already unlocked and is now bound
    Bound(CardRef),
}

pub struct StageCard {
    services: TreeServices,
}

impl StageCard {
    pub fn new(services: TreeServices) -> Self {
        Self { services }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
        draft: CardDraft,
    ) -> Result<StageOutcome, ProgressionError> {
        self.run(ctx, domain_id, node_id, draft)
            .await
            .inspect_err(|e| self.services.notify_failure(ctx, e))
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
        draft: CardDraft,
    ) -> Result<StageOutcome, ProgressionError> {
        self.services.require_privileged(ctx, "assign cards")?;
        let mut checkout = self.services.checkout(ctx).await?;
        let unlocked = checkout.state.is_unlocked(node_id);
        let node = checkout.state.node_mut(domain_id, node_id)?;
        node.stage(draft);

        let mut outcome = StageOutcome::Staged;
        if unlocked {
            match self.services.cards.materialize(ctx.character_id, node).await {
                Ok(Some(card)) => outcome = StageOutcome::Bound(card),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        character_id = %ctx.character_id,
                        node_id = %node_id,
                        error = %e,
                        "Card creation failed; node stays staged"
                    );
                    self.services
                        .notifier
                        .error(&format!("Could not create the card for {}: {e}", node.label));
                }
            }
        }
        self.services.commit(ctx, checkout).await?;

        tracing::info!(
            character_id = %ctx.character_id,
            domain_id = %domain_id,
            node_id = %node_id,
            outcome = ?outcome,
            "Card staged on node"
        );
        Ok(outcome)
    }
}

//! Open a staged card for editing before its node unlocks.
//!
//! The host can only edit nested card actions on a real document, so this
//! creates a hidden temporary card. The node stays staged; unlocking it
//! later promotes the temporary card.

use talent_tree_domain::{Card, DomainError, DomainId};

use crate::use_cases::error::ProgressionError;
use crate::use_cases::services::{RequestContext, TreeServices};

pub struct StageForEditing {
    services: TreeServices,
}

impl StageForEditing {
    pub fn new(services: TreeServices) -> Self {
        Self { services }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
    ) -> Result<Card, ProgressionError> {
        self.run(ctx, domain_id, node_id)
            .await
            .inspect_err(|e| self.services.notify_failure(ctx, e))
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
    ) -> Result<Card, ProgressionError> {
        self.services.require_privileged(ctx, "edit staged cards")?;
        let checkout = self.services.checkout(ctx).await?;
        let state = &checkout.state;
        let node = state.node(domain_id, node_id)?;

        if state.is_unlocked(node_id) {
            return Err(DomainError::validation(format!(
                "node {node_id} is unlocked; edit its card directly"
            ))
            .into());
        }
        let card = self
            .services
            .cards
            .create_temporary(ctx.character_id, &DomainId::new(domain_id), node)
            .await?
            .ok_or_else(|| DomainError::validation(format!("node {node_id} has no staged card")))?;

        tracing::info!(
            character_id = %ctx.character_id,
            node_id = %node_id,
            card = %card.reference,
            "Staged card opened for editing"
        );
        Ok(card)
    }
}

//! Toggle node use case - the click handler's entry point.
//!
//! Locked nodes are unlocked for anyone controlling the character; unlocked
//! nodes are locked, which only the game master may do.

use crate::use_cases::error::ProgressionError;
use crate::use_cases::services::{RequestContext, TreeServices};

use super::lock_node::{lock_in_state, LockOutcome};
use super::unlock_node::{unlock_in_state, UnlockOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Unlocked(UnlockOutcome),
    Locked(LockOutcome),
}

pub struct ToggleNode {
    services: TreeServices,
}

impl ToggleNode {
    pub fn new(services: TreeServices) -> Self {
        Self { services }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
    ) -> Result<ToggleOutcome, ProgressionError> {
        self.run(ctx, domain_id, node_id)
            .await
            .inspect_err(|e| self.services.notify_failure(ctx, e))
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
    ) -> Result<ToggleOutcome, ProgressionError> {
        self.services.require_owner(ctx)?;
        let mut checkout = self.services.checkout(ctx).await?;

        let outcome = if checkout.state.is_unlocked(node_id) {
            self.services.require_privileged(ctx, "lock nodes")?;
            ToggleOutcome::Locked(lock_in_state(ctx, &mut checkout.state, domain_id, node_id)?)
        } else {
            ToggleOutcome::Unlocked(
                unlock_in_state(&self.services, ctx, &mut checkout.state, domain_id, node_id)
                    .await?,
            )
        };

        self.services.commit(ctx, checkout).await?;
        Ok(outcome)
    }
}

//! Lock node use case (game master only).

use talent_tree_domain::{NodeId, ProgressionState};

use crate::use_cases::error::ProgressionError;
use crate::use_cases::services::{RequestContext, TreeServices};

/// Nodes locked by a request, descendants first and the target last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockOutcome {
    pub locked: Vec<NodeId>,
}

pub struct LockNode {
    services: TreeServices,
}

impl LockNode {
    pub fn new(services: TreeServices) -> Self {
        Self { services }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
    ) -> Result<LockOutcome, ProgressionError> {
        self.run(ctx, domain_id, node_id)
            .await
            .inspect_err(|e| self.services.notify_failure(ctx, e))
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
    ) -> Result<LockOutcome, ProgressionError> {
        self.services.require_privileged(ctx, "lock nodes")?;
        let mut checkout = self.services.checkout(ctx).await?;
        let outcome = lock_in_state(ctx, &mut checkout.state, domain_id, node_id)?;
        self.services.commit(ctx, checkout).await?;
        Ok(outcome)
    }
}

pub(crate) fn lock_in_state(
    ctx: &RequestContext,
    state: &mut ProgressionState,
    domain_id: &str,
    node_id: &str,
) -> Result<LockOutcome, ProgressionError> {
    let mut locked = state.lock(domain_id, node_id)?;
    locked.push(NodeId::new(node_id));

    tracing::info!(
        character_id = %ctx.character_id,
        domain_id = %domain_id,
        node_id = %node_id,
        cascaded = locked.len() - 1,
        "Node locked"
    );
    Ok(LockOutcome { locked })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{chain_state, Harness};
    use talent_tree_domain::DomainError;

    async fn unlocked_chain(harness: &Harness, nodes: &[&str]) {
        let mut state = chain_state(3);
        for node in nodes {
            state.unlock("arcana", node).expect("unlock");
        }
        harness.seed(&state).await;
    }

    #[tokio::test]
    async fn scenario_d_parent_with_unlocked_child_is_rejected() {
        let harness = Harness::new();
        unlocked_chain(&harness, &["A", "B", "C"]).await;

        let result = LockNode::new(harness.services.clone())
            .execute(&harness.gm(), "arcana", "B")
            .await;

        assert!(matches!(
            result,
            Err(ProgressionError::Domain(DomainError::HasUnlockedChildren(_)))
        ));
        assert_eq!(harness.state().await.unlocked_nodes().len(), 3);
        assert_eq!(harness.notifier.levels(), vec!["warn"]);
    }

    #[tokio::test]
    async fn root_is_protected_above_level_one() {
        let harness = Harness::new();
        unlocked_chain(&harness, &["A", "B"]).await;

        let result = LockNode::new(harness.services.clone())
            .execute(&harness.gm(), "arcana", "A")
            .await;

        assert!(matches!(
            result,
            Err(ProgressionError::Domain(DomainError::ProtectedRoot(_)))
        ));
    }

    #[tokio::test]
    async fn leaf_lock_persists() {
        let harness = Harness::new();
        unlocked_chain(&harness, &["A", "B"]).await;

        let outcome = LockNode::new(harness.services.clone())
            .execute(&harness.gm(), "arcana", "B")
            .await
            .expect("lock");

        assert_eq!(outcome.locked, vec![NodeId::new("B")]);
        assert_eq!(harness.state().await.unlocked_nodes(), &[NodeId::new("A")]);
    }

    #[tokio::test]
    async fn players_cannot_lock() {
        let harness = Harness::new();
        unlocked_chain(&harness, &["A", "B"]).await;

        let result = LockNode::new(harness.services.clone())
            .execute(&harness.player(), "arcana", "B")
            .await;

        assert!(matches!(result, Err(ProgressionError::PermissionDenied(_))));
        assert_eq!(harness.notifier.levels(), vec!["error"]);
        assert_eq!(harness.state().await.unlocked_nodes().len(), 2);
    }
}

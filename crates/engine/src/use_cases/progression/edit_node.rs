//! Edit node use case (game master only).

use talent_tree_domain::{Node, NodeEdit};

use crate::use_cases::error::ProgressionError;
use crate::use_cases::services::{RequestContext, TreeServices};

pub struct EditNode {
    services: TreeServices,
}

impl EditNode {
    pub fn new(services: TreeServices) -> Self {
        Self { services }
    }

    /// Change a node's label, icon or description. Blank label and icon
    /// fall back to the defaults.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
        edit: NodeEdit,
    ) -> Result<Node, ProgressionError> {
        self.run(ctx, domain_id, node_id, edit)
            .await
            .inspect_err(|e| self.services.notify_failure(ctx, e))
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
        node_id: &str,
        edit: NodeEdit,
    ) -> Result<Node, ProgressionError> {
        self.services.require_privileged(ctx, "edit nodes")?;
        let mut checkout = self.services.checkout(ctx).await?;
        checkout.state.edit_node(domain_id, node_id, edit)?;
        let state = self.services.commit(ctx, checkout).await?;

        tracing::info!(
            character_id = %ctx.character_id,
            domain_id = %domain_id,
            node_id = %node_id,
            "Node edited"
        );
        Ok(state.node(domain_id, node_id)?.clone())
    }
}

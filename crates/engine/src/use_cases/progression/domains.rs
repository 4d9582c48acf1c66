//! Domain management use cases (game master only).
//!
//! Adds game-rule domains from the catalog, removes them, and installs the
//! standard starting tree.

use std::sync::Arc;

use talent_tree_domain::{Domain, DomainCatalogEntry, DomainError, NodeId, RemovedDomain};

use crate::infrastructure::ports::DomainCatalog;
use crate::use_cases::error::ProgressionError;
use crate::use_cases::services::{RequestContext, TreeServices};

pub struct ManageDomains {
    services: TreeServices,
    catalog: Arc<dyn DomainCatalog>,
}

impl ManageDomains {
    pub fn new(services: TreeServices, catalog: Arc<dyn DomainCatalog>) -> Self {
        Self { services, catalog }
    }

    /// Catalog domains the character's tree does not have yet.
    pub async fn addable(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<DomainCatalogEntry>, ProgressionError> {
        let state = self
            .services
            .store
            .load(ctx.user_id, ctx.character_id)
            .await?;
        let entries = self.catalog.list().await?;
        Ok(entries
            .into_iter()
            .filter(|entry| state.domain(entry.id.as_str()).is_none())
            .collect())
    }

    /// Add an empty domain for a catalog entry.
    pub async fn add(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
    ) -> Result<Domain, ProgressionError> {
        self.add_inner(ctx, domain_id)
            .await
            .inspect_err(|e| self.services.notify_failure(ctx, e))
    }

    async fn add_inner(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
    ) -> Result<Domain, ProgressionError> {
        self.services.require_privileged(ctx, "add domains")?;
        let entry = self
            .catalog
            .list()
            .await?
            .into_iter()
            .find(|entry| entry.id == domain_id)
            .ok_or_else(|| DomainError::not_found("Domain", domain_id))?;

        let mut checkout = self.services.checkout(ctx).await?;
        let domain = Domain::from_catalog(&entry);
        checkout.state.add_domain(domain.clone())?;
        self.services.commit(ctx, checkout).await?;

        tracing::info!(character_id = %ctx.character_id, domain_id = %domain_id, "Domain added");
        self.services
            .notifier
            .info(&format!("Added domain {}", domain.label));
        Ok(domain)
    }

    /// Remove a domain; its unlocked nodes are locked with it.
    pub async fn remove(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
    ) -> Result<RemovedDomain, ProgressionError> {
        self.remove_inner(ctx, domain_id)
            .await
            .inspect_err(|e| self.services.notify_failure(ctx, e))
    }

    async fn remove_inner(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
    ) -> Result<RemovedDomain, ProgressionError> {
        self.services.require_privileged(ctx, "remove domains")?;
        let mut checkout = self.services.checkout(ctx).await?;
        let removed = checkout.state.remove_domain(domain_id)?;
        self.services.commit(ctx, checkout).await?;

        tracing::info!(
            character_id = %ctx.character_id,
            domain_id = %domain_id,
            locked = removed.locked.len(),
            "Domain removed"
        );
        self.services
            .notifier
            .info(&format!("Removed domain {}", removed.domain.label));
        Ok(removed)
    }

    /// Install the standard tree in an empty domain.
    pub async fn create_tree(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
    ) -> Result<(), ProgressionError> {
        self.create_tree_inner(ctx, domain_id)
            .await
            .inspect_err(|e| self.services.notify_failure(ctx, e))
    }

    async fn create_tree_inner(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
    ) -> Result<(), ProgressionError> {
        self.services.require_privileged(ctx, "create trees")?;
        let mut checkout = self.services.checkout(ctx).await?;
        checkout.state.create_tree(domain_id)?;
        self.services.commit(ctx, checkout).await?;
        tracing::info!(character_id = %ctx.character_id, domain_id = %domain_id, "Tree created");
        Ok(())
    }

    /// Replace a domain's nodes with the standard tree, locking its nodes.
    pub async fn recreate_tree(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
    ) -> Result<Vec<NodeId>, ProgressionError> {
        self.recreate_tree_inner(ctx, domain_id)
            .await
            .inspect_err(|e| self.services.notify_failure(ctx, e))
    }

    async fn recreate_tree_inner(
        &self,
        ctx: &RequestContext,
        domain_id: &str,
    ) -> Result<Vec<NodeId>, ProgressionError> {
        self.services.require_privileged(ctx, "recreate trees")?;
        let mut checkout = self.services.checkout(ctx).await?;
        let locked = checkout.state.recreate_tree(domain_id)?;
        self.services.commit(ctx, checkout).await?;
        tracing::info!(
            character_id = %ctx.character_id,
            domain_id = %domain_id,
            locked = locked.len(),
            "Tree recreated"
        );
        Ok(locked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::StaticDomainCatalog;
    use crate::infrastructure::ports::{MockDomainCatalog, RepoError};
    use crate::use_cases::test_support::{chain_state, Harness};
    use talent_tree_domain::{ProgressionState, DEFAULT_DOMAIN_SRC};

    fn catalog() -> Arc<dyn DomainCatalog> {
        Arc::new(StaticDomainCatalog::new(vec![
            DomainCatalogEntry::new("arcana", "Arcana").with_src("icons/arcana.svg"),
            DomainCatalogEntry::new("blade", "Blade"),
        ]))
    }

    #[tokio::test]
    async fn add_domain_from_catalog() {
        let harness = Harness::new();
        let use_case = ManageDomains::new(harness.services.clone(), catalog());

        let domain = use_case.add(&harness.gm(), "blade").await.expect("add");
        assert_eq!(domain.label, "Blade");
        assert_eq!(domain.src.as_deref(), Some(DEFAULT_DOMAIN_SRC));
        assert!(domain.nodes.is_empty());

        let addable = use_case.addable(&harness.player()).await.expect("addable");
        let ids: Vec<&str> = addable.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["arcana"]);
    }

    #[tokio::test]
    async fn duplicate_and_unknown_domains_are_rejected() {
        let harness = Harness::new();
        harness.seed(&chain_state(1)).await;
        let use_case = ManageDomains::new(harness.services.clone(), catalog());

        assert!(matches!(
            use_case.add(&harness.gm(), "arcana").await,
            Err(ProgressionError::Domain(DomainError::AlreadyExists { .. }))
        ));
        assert!(matches!(
            use_case.add(&harness.gm(), "homebrew").await,
            Err(ProgressionError::Domain(DomainError::NotFound { .. }))
        ));
        assert_eq!(harness.notifier.levels(), vec!["warn", "warn"]);
    }

    #[tokio::test]
    async fn catalog_failure_is_reported_as_error() {
        let harness = Harness::new();
        let mut catalog = MockDomainCatalog::new();
        catalog
            .expect_list()
            .returning(|| Err(RepoError::storage("list", "system not ready")));
        let use_case = ManageDomains::new(harness.services.clone(), Arc::new(catalog));

        let result = use_case.add(&harness.gm(), "arcana").await;
        assert!(matches!(result, Err(ProgressionError::Repo(_))));
        assert_eq!(harness.notifier.levels(), vec!["error"]);
    }

    #[tokio::test]
    async fn remove_domain_locks_its_nodes() {
        let harness = Harness::new();
        let mut state = chain_state(2);
        state.unlock("arcana", "A").expect("unlock");
        state.unlock("arcana", "B").expect("unlock");
        harness.seed(&state).await;

        let removed = ManageDomains::new(harness.services.clone(), catalog())
            .remove(&harness.gm(), "arcana")
            .await
            .expect("remove");

        assert_eq!(removed.locked, vec![NodeId::new("A"), NodeId::new("B")]);
        let state = harness.state().await;
        assert!(state.domains().is_empty());
        assert!(state.unlocked_nodes().is_empty());
    }

    #[tokio::test]
    async fn create_and_recreate_template_tree() {
        let harness = Harness::new();
        harness
            .seed(&ProgressionState::default().with_level(2))
            .await;
        let use_case = ManageDomains::new(harness.services.clone(), catalog());

        use_case.add(&harness.gm(), "arcana").await.expect("add");
        use_case
            .create_tree(&harness.gm(), "arcana")
            .await
            .expect("create");
        let state = harness.state().await;
        let domain = state.domain("arcana").expect("domain");
        assert_eq!(domain.nodes.len(), 7);
        assert_eq!(domain.root().map(NodeId::as_str), Some("arcana-node-1"));

        let mut state = state;
        state.unlock("arcana", "arcana-node-1").expect("unlock");
        harness.seed(&state).await;

        let locked = use_case
            .recreate_tree(&harness.gm(), "arcana")
            .await
            .expect("recreate");
        assert_eq!(locked, vec![NodeId::new("arcana-node-1")]);
        assert!(harness.state().await.unlocked_nodes().is_empty());
    }

    #[tokio::test]
    async fn players_cannot_manage_domains() {
        let harness = Harness::new();
        let use_case = ManageDomains::new(harness.services.clone(), catalog());
        assert!(matches!(
            use_case.add(&harness.player(), "arcana").await,
            Err(ProgressionError::PermissionDenied(_))
        ));
        assert!(matches!(
            use_case.create_tree(&harness.player(), "arcana").await,
            Err(ProgressionError::PermissionDenied(_))
        ));
    }
}

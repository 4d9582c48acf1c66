//! Application state and composition.

use std::sync::Arc;

use crate::entities::{CardBinder, ProgressionStore};
use crate::infrastructure::{
    config::TalentTreeConfig,
    locks::CharacterLocks,
    memory::{
        InMemoryCardStore, InMemoryFlagStore, InMemoryLegacyTable, StaticAccessPolicy,
        StaticDomainCatalog, TracingNotifier,
    },
    ports::{AccessPolicy, CardStore, DomainCatalog, FlagStore, LegacyTreeTable, Notifier},
};
use crate::use_cases::{self, TreeServices};

/// Host collaborators the engine is built from.
pub struct Ports {
    pub flags: Arc<dyn FlagStore>,
    /// Legacy world table; `None` when the host no longer has one
    pub legacy: Option<Arc<dyn LegacyTreeTable>>,
    pub cards: Arc<dyn CardStore>,
    pub catalog: Arc<dyn DomainCatalog>,
    pub access: Arc<dyn AccessPolicy>,
    pub notifier: Arc<dyn Notifier>,
}

impl Ports {
    /// In-process adapters: in-memory stores, a fixed access policy and
    /// notifications routed to tracing.
    pub fn in_memory(access: StaticAccessPolicy, catalog: StaticDomainCatalog) -> Self {
        let legacy: Arc<dyn LegacyTreeTable> = Arc::new(InMemoryLegacyTable::new());
        Self {
            flags: Arc::new(InMemoryFlagStore::new()),
            legacy: Some(legacy),
            cards: Arc::new(InMemoryCardStore::new()),
            catalog: Arc::new(catalog),
            access: Arc::new(access),
            notifier: Arc::new(TracingNotifier),
        }
    }
}

/// Main application state.
///
/// Holds the shared services and all use cases.
pub struct App {
    pub config: TalentTreeConfig,
    pub services: TreeServices,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub progression: use_cases::ProgressionUseCases,
    pub cards: use_cases::CardUseCases,
}

impl App {
    pub fn new(ports: Ports, config: TalentTreeConfig) -> Self {
        let store = Arc::new(ProgressionStore::new(
            ports.flags,
            ports.legacy,
            ports.access.clone(),
            config.clone(),
        ));
        let cards = Arc::new(CardBinder::new(ports.cards));
        let services = TreeServices::new(
            store,
            cards,
            ports.access,
            ports.notifier,
            Arc::new(CharacterLocks::new()),
        );

        let use_cases = UseCases {
            progression: use_cases::ProgressionUseCases::new(services.clone(), ports.catalog),
            cards: use_cases::CardUseCases::new(services.clone()),
        };

        tracing::info!(
            flag_scope = %config.flag_scope,
            flag_key = %config.flag_key,
            max_level = config.max_level,
            legacy_mirror = config.legacy_mirror,
            "Talent tree engine ready"
        );

        Self {
            config,
            services,
            use_cases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::RequestContext;
    use talent_tree_domain::{CharacterId, DomainCatalogEntry, UserId};

    #[tokio::test]
    async fn in_memory_app_runs_a_full_session() {
        let gm = UserId::new();
        let player = UserId::new();
        let character = CharacterId::new();
        let ports = Ports::in_memory(
            StaticAccessPolicy::new()
                .with_privileged(gm)
                .with_owner(player, character),
            StaticDomainCatalog::new(vec![DomainCatalogEntry::new("arcana", "Arcana")]),
        );
        let app = App::new(ports, TalentTreeConfig::default());
        let gm_ctx = RequestContext::new(gm, character);
        let player_ctx = RequestContext::new(player, character);
        let progression = &app.use_cases.progression;

        progression.domains.add(&gm_ctx, "arcana").await.expect("add");
        progression
            .domains
            .create_tree(&gm_ctx, "arcana")
            .await
            .expect("create tree");
        progression.level.set(&gm_ctx, 2).await.expect("level");
        progression
            .toggle
            .execute(&player_ctx, "arcana", "arcana-node-1")
            .await
            .expect("unlock root");
        progression
            .toggle
            .execute(&player_ctx, "arcana", "arcana-node-2")
            .await
            .expect("unlock centre");

        let view = progression.load.execute(&player_ctx).await.expect("view");
        assert_eq!(view.state.unlocked_nodes().len(), 2);
        assert_eq!(view.remaining_budget, 0);
        assert!(view.is_available("arcana", "arcana-node-3"));
    }
}

//! Level change use cases (game master only).

use talent_tree_domain::{LevelChange, ProgressionState};

use crate::use_cases::error::ProgressionError;
use crate::use_cases::services::{RequestContext, TreeServices};

/// How to move the character's level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelRequest {
    /// Jump to a level; clamped to the cap
    Set(u32),
    Increase,
    Decrease,
}

pub struct ChangeLevel {
    services: TreeServices,
}

impl ChangeLevel {
    pub fn new(services: TreeServices) -> Self {
        Self { services }
    }

    pub async fn set(
        &self,
        ctx: &RequestContext,
        level: u32,
    ) -> Result<LevelChange, ProgressionError> {
        self.execute(ctx, LevelRequest::Set(level)).await
    }

    pub async fn increase(&self, ctx: &RequestContext) -> Result<LevelChange, ProgressionError> {
        self.execute(ctx, LevelRequest::Increase).await
    }

    pub async fn decrease(&self, ctx: &RequestContext) -> Result<LevelChange, ProgressionError> {
        self.execute(ctx, LevelRequest::Decrease).await
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        request: LevelRequest,
    ) -> Result<LevelChange, ProgressionError> {
        self.run(ctx, request)
            .await
            .inspect_err(|e| self.services.notify_failure(ctx, e))
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        request: LevelRequest,
    ) -> Result<LevelChange, ProgressionError> {
        self.services.require_privileged(ctx, "change levels")?;
        let mut checkout = self.services.checkout(ctx).await?;
        let change = apply(&mut checkout.state, request)?;
        let state = self.services.commit(ctx, checkout).await?;

        tracing::info!(
            character_id = %ctx.character_id,
            previous = change.previous,
            level = change.level,
            locked = change.locked.len(),
            "Level changed"
        );
        if change.over_budget > 0 {
            // No lockable leaf was left; reported rather than forced
            tracing::warn!(
                character_id = %ctx.character_id,
                level = change.level,
                unlocked = state.unlocked_nodes().len(),
                "Unlocked nodes exceed the new level"
            );
            self.services.notifier.warn(&format!(
                "{} unlocked node(s) could not be locked to fit level {}",
                change.over_budget, change.level
            ));
        }
        self.services
            .notifier
            .info(&format!("Level set to {}", change.level));
        Ok(change)
    }
}

fn apply(state: &mut ProgressionState, request: LevelRequest) -> Result<LevelChange, ProgressionError> {
    Ok(match request {
        LevelRequest::Set(level) => state.set_level(level),
        LevelRequest::Increase => state.increase_level()?,
        LevelRequest::Decrease => state.decrease_level()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockNotifier;
    use crate::use_cases::test_support::{chain_state, Harness};
    use talent_tree_domain::{DomainError, NodeId};

    #[tokio::test]
    async fn scenario_c_drop_to_level_one_keeps_root() {
        let harness = Harness::new();
        let mut state = chain_state(3);
        for node in ["A", "B", "C"] {
            state.unlock("arcana", node).expect("unlock");
        }
        harness.seed(&state).await;

        let change = ChangeLevel::new(harness.services.clone())
            .set(&harness.gm(), 1)
            .await
            .expect("set level");

        assert_eq!(change.locked, vec![NodeId::new("B"), NodeId::new("C")]);
        let state = harness.state().await;
        assert_eq!(state.unlocked_nodes(), &[NodeId::new("A")]);
        assert_eq!(state.current_level(), 1);
        assert_eq!(harness.notifier.levels(), vec!["info"]);
    }

    #[tokio::test]
    async fn set_level_clamps_to_cap() {
        let harness = Harness::new();
        harness.seed(&chain_state(0)).await;

        let change = ChangeLevel::new(harness.services.clone())
            .set(&harness.gm(), 99)
            .await
            .expect("set level");
        assert_eq!(change.level, 11);
    }

    #[tokio::test]
    async fn step_changes_stop_at_bounds() {
        let harness = Harness::new();
        harness.seed(&chain_state(0)).await;
        let use_case = ChangeLevel::new(harness.services.clone());

        let result = use_case.decrease(&harness.gm()).await;
        assert!(matches!(
            result,
            Err(ProgressionError::Domain(DomainError::LevelBoundReached { .. }))
        ));

        let change = use_case.increase(&harness.gm()).await.expect("increase");
        assert_eq!((change.previous, change.level), (0, 1));
        assert_eq!(harness.state().await.current_level(), 1);
    }

    #[tokio::test]
    async fn overshoot_is_reported_not_forced() {
        let mut notifier = MockNotifier::new();
        notifier.expect_warn().times(1).return_const(());
        notifier.expect_info().times(1).return_const(());
        let harness = Harness::new().with_mock_notifier(notifier);

        // Three unlocked roots; roots are never shrunk below level 1
        let state: ProgressionState = serde_json::from_value(serde_json::json!({
            "domains": [
                { "id": "a", "label": "A", "nodes": [{ "id": "a1" }] },
                { "id": "b", "label": "B", "nodes": [{ "id": "b1" }] },
                { "id": "c", "label": "C", "nodes": [{ "id": "c1" }] }
            ],
            "unlockedNodes": ["a1", "b1", "c1"],
            "currentLevel": 3,
            "maxLevel": 11
        }))
        .expect("state");
        harness.seed(&state).await;

        let change = ChangeLevel::new(harness.services.clone())
            .set(&harness.gm(), 2)
            .await
            .expect("lower level");

        assert_eq!(change.over_budget, 1);
        assert!(change.locked.is_empty());
        let state = harness.state().await;
        assert_eq!(state.current_level(), 2);
        assert_eq!(state.unlocked_nodes().len(), 3);
    }

    #[tokio::test]
    async fn players_cannot_change_level() {
        let harness = Harness::new();
        harness.seed(&chain_state(1)).await;

        let result = ChangeLevel::new(harness.services.clone())
            .increase(&harness.player())
            .await;
        assert!(matches!(result, Err(ProgressionError::PermissionDenied(_))));
        assert_eq!(harness.state().await.current_level(), 1);
    }
}

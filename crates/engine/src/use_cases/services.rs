//! Collaborators shared by every talent tree use case.

use std::sync::Arc;

use talent_tree_domain::{CharacterId, ProgressionState, UserId};

use super::error::ProgressionError;
use crate::entities::{CardBinder, ProgressionStore};
use crate::infrastructure::locks::{CharacterGuard, CharacterLocks};
use crate::infrastructure::ports::{AccessPolicy, Notifier};

/// Who is acting, on which character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: UserId,
    pub character_id: CharacterId,
}

impl RequestContext {
    pub fn new(user_id: UserId, character_id: CharacterId) -> Self {
        Self {
            user_id,
            character_id,
        }
    }
}

/// Entity modules and ports the tree use cases share.
#[derive(Clone)]
pub struct TreeServices {
    pub(crate) store: Arc<ProgressionStore>,
    pub(crate) cards: Arc<CardBinder>,
    pub(crate) access: Arc<dyn AccessPolicy>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) locks: Arc<CharacterLocks>,
}

/// A loaded state held under the character's lock until committed.
pub(crate) struct Checkout {
    pub state: ProgressionState,
    _guard: CharacterGuard,
}

impl TreeServices {
    pub fn new(
        store: Arc<ProgressionStore>,
        cards: Arc<CardBinder>,
        access: Arc<dyn AccessPolicy>,
        notifier: Arc<dyn Notifier>,
        locks: Arc<CharacterLocks>,
    ) -> Self {
        Self {
            store,
            cards,
            access,
            notifier,
            locks,
        }
    }

    pub(crate) fn require_owner(&self, ctx: &RequestContext) -> Result<(), ProgressionError> {
        if self.access.owns_character(ctx.user_id, ctx.character_id) {
            Ok(())
        } else {
            Err(ProgressionError::permission(format!(
                "user {} does not control character {}",
                ctx.user_id, ctx.character_id
            )))
        }
    }

    pub(crate) fn require_privileged(
        &self,
        ctx: &RequestContext,
        action: &str,
    ) -> Result<(), ProgressionError> {
        if self.access.is_privileged(ctx.user_id) {
            Ok(())
        } else {
            Err(ProgressionError::permission(format!(
                "only the game master can {action}"
            )))
        }
    }

    /// Lock the character and load its state.
    ///
    /// Dangling card references are cleared here so the commit persists the fix.
    pub(crate) async fn checkout(&self, ctx: &RequestContext) -> Result<Checkout, ProgressionError> {
        let guard = self.locks.acquire(ctx.character_id).await;
        let mut state = self.store.load(ctx.user_id, ctx.character_id).await?;
        self.cards.reconcile(ctx.character_id, &mut state).await;
        Ok(Checkout {
            state,
            _guard: guard,
        })
    }

    /// Save a checked-out state and release the character.
    pub(crate) async fn commit(
        &self,
        ctx: &RequestContext,
        checkout: Checkout,
    ) -> Result<ProgressionState, ProgressionError> {
        self.store
            .save(ctx.user_id, ctx.character_id, &checkout.state)
            .await?;
        Ok(checkout.state)
    }

    /// Surface a failed request to the user: rule rejections as warnings,
    /// everything else as errors.
    pub(crate) fn notify_failure(&self, ctx: &RequestContext, err: &ProgressionError) {
        let message = err.to_string();
        match err {
            ProgressionError::Domain(_) => {
                tracing::warn!(
                    user_id = %ctx.user_id,
                    character_id = %ctx.character_id,
                    error = %err,
                    "Talent tree request rejected"
                );
                self.notifier.warn(&message);
            }
            ProgressionError::PermissionDenied(_) => {
                tracing::warn!(
                    user_id = %ctx.user_id,
                    character_id = %ctx.character_id,
                    error = %err,
                    "Talent tree request not permitted"
                );
                self.notifier.error(&message);
            }
            ProgressionError::Repo(_) => {
                tracing::error!(
                    user_id = %ctx.user_id,
                    character_id = %ctx.character_id,
                    error = %err,
                    "Talent tree storage failure"
                );
                self.notifier.error(&message);
            }
        }
    }
}

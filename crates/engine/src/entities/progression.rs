//! Progression storage entity.
//!
//! Loads and saves a character's [`ProgressionState`] through the flag store,
//! falling back to the legacy world table for characters saved by older
//! versions. Legacy data is migrated forward opportunistically.

use std::sync::Arc;

use serde_json::Value;
use talent_tree_domain::{CharacterId, ProgressionState, UserId};

use crate::infrastructure::config::TalentTreeConfig;
use crate::infrastructure::ports::{AccessPolicy, FlagStore, LegacyTreeTable, RepoError};

/// Errors from progression storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("User {user} does not control character {character}")]
    NotOwner { user: UserId, character: CharacterId },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Where a loaded state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSource {
    Flag,
    Legacy,
    Fresh,
}

/// Progression storage - flag store primary, legacy table as fallback/mirror.
pub struct ProgressionStore {
    flags: Arc<dyn FlagStore>,
    legacy: Option<Arc<dyn LegacyTreeTable>>,
    access: Arc<dyn AccessPolicy>,
    config: TalentTreeConfig,
}

impl ProgressionStore {
    pub fn new(
        flags: Arc<dyn FlagStore>,
        legacy: Option<Arc<dyn LegacyTreeTable>>,
        access: Arc<dyn AccessPolicy>,
        config: TalentTreeConfig,
    ) -> Self {
        Self {
            flags,
            legacy,
            access,
            config,
        }
    }

    /// Load the character's state, or a fresh one if nothing is stored.
    pub async fn load(
        &self,
        user: UserId,
        character: CharacterId,
    ) -> Result<ProgressionState, RepoError> {
        self.load_with_source(user, character)
            .await
            .map(|(state, _)| state)
    }

    pub async fn load_with_source(
        &self,
        user: UserId,
        character: CharacterId,
    ) -> Result<(ProgressionState, StateSource), RepoError> {
        let stored = self
            .flags
            .get_flag(character, &self.config.flag_scope, &self.config.flag_key)
            .await?;

        let (mut state, source) = match stored {
            Some(value) => (serde_json::from_value(value)?, StateSource::Flag),
            None => match self.load_legacy(character).await {
                Some(state) => (state, StateSource::Legacy),
                None => (
                    ProgressionState::new(self.config.max_level),
                    StateSource::Fresh,
                ),
            },
        };

        let upgraded = state.upgrade_schema(self.config.max_level);
        let needs_write = source == StateSource::Legacy || upgraded;
        if needs_write && self.access.owns_character(user, character) {
            // Best-effort; the state read this session stays authoritative
            if let Err(e) = self.write_flag(character, &state).await {
                tracing::warn!(
                    character_id = %character,
                    source = ?source,
                    error = %e,
                    "Failed to persist migrated talent tree"
                );
            } else {
                tracing::info!(
                    character_id = %character,
                    source = ?source,
                    max_level = state.max_level(),
                    "Migrated talent tree into character flags"
                );
            }
        }

        Ok((state, source))
    }

    /// Persist `state`. Only users controlling the character may save.
    pub async fn save(
        &self,
        user: UserId,
        character: CharacterId,
        state: &ProgressionState,
    ) -> Result<(), StoreError> {
        if !self.access.owns_character(user, character) {
            return Err(StoreError::NotOwner { user, character });
        }

        let value = self.write_flag(character, state).await?;

        if self.config.legacy_mirror && self.access.is_privileged(user) {
            if let Some(legacy) = &self.legacy {
                if let Err(e) = legacy.put(character, value).await {
                    tracing::warn!(
                        character_id = %character,
                        error = %e,
                        "Failed to mirror talent tree into legacy table"
                    );
                }
            }
        }

        tracing::debug!(
            character_id = %character,
            unlocked = state.unlocked_nodes().len(),
            level = state.current_level(),
            "Saved talent tree"
        );
        Ok(())
    }

    async fn write_flag(
        &self,
        character: CharacterId,
        state: &ProgressionState,
    ) -> Result<Value, RepoError> {
        let value = serde_json::to_value(state)?;
        self.flags
            .set_flag(
                character,
                &self.config.flag_scope,
                &self.config.flag_key,
                value.clone(),
            )
            .await?;
        Ok(value)
    }

    async fn load_legacy(&self, character: CharacterId) -> Option<ProgressionState> {
        let legacy = self.legacy.as_ref()?;
        let value = match legacy.get(character).await {
            Ok(value) => value?,
            Err(e) => {
                tracing::warn!(character_id = %character, error = %e, "Legacy talent tree read failed");
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(character_id = %character, error = %e, "Ignoring unreadable legacy talent tree");
                None
            }
        }
    }
}

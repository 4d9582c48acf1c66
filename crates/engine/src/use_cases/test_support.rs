//! Shared fixtures for use case tests.

use std::sync::{Arc, Mutex};

use talent_tree_domain::{CharacterId, Domain, Node, ProgressionState, UserId};

use super::services::{RequestContext, TreeServices};
use crate::entities::{CardBinder, ProgressionStore};
use crate::infrastructure::config::TalentTreeConfig;
use crate::infrastructure::locks::CharacterLocks;
use crate::infrastructure::memory::{InMemoryCardStore, InMemoryFlagStore, StaticAccessPolicy};
use crate::infrastructure::ports::{MockNotifier, Notifier};

/// Notifications captured for assertions.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub messages: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingNotifier {
    pub fn levels(&self) -> Vec<&'static str> {
        self.messages
            .lock()
            .map(|m| m.iter().map(|(level, _)| *level).collect())
            .unwrap_or_default()
    }

    fn push(&self, level: &'static str, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, message.to_string()));
        }
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.push("info", message);
    }

    fn warn(&self, message: &str) {
        self.push("warn", message);
    }

    fn error(&self, message: &str) {
        self.push("error", message);
    }
}

/// In-memory wiring with one game master, one player and their character.
pub(crate) struct Harness {
    pub services: TreeServices,
    pub flags: Arc<InMemoryFlagStore>,
    pub cards: Arc<InMemoryCardStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub gm: UserId,
    pub player: UserId,
    pub character: CharacterId,
}

impl Harness {
    pub fn new() -> Self {
        let gm = UserId::new();
        let player = UserId::new();
        let character = CharacterId::new();
        let access = Arc::new(
            StaticAccessPolicy::new()
                .with_privileged(gm)
                .with_owner(player, character),
        );
        let flags = Arc::new(InMemoryFlagStore::new());
        let cards = Arc::new(InMemoryCardStore::new());
        let notifier = Arc::new(RecordingNotifier::default());

        let store = Arc::new(ProgressionStore::new(
            flags.clone(),
            None,
            access.clone(),
            TalentTreeConfig::default(),
        ));
        let services = TreeServices::new(
            store,
            Arc::new(CardBinder::new(cards.clone())),
            access,
            notifier.clone(),
            Arc::new(CharacterLocks::new()),
        );

        Self {
            services,
            flags,
            cards,
            notifier,
            gm,
            player,
            character,
        }
    }

    /// Same wiring, but notifications go to a mockall expectation set.
    pub fn with_mock_notifier(mut self, notifier: MockNotifier) -> Self {
        self.services.notifier = Arc::new(notifier);
        self
    }

    pub fn gm(&self) -> RequestContext {
        RequestContext::new(self.gm, self.character)
    }

    pub fn player(&self) -> RequestContext {
        RequestContext::new(self.player, self.character)
    }

    pub fn stranger(&self) -> RequestContext {
        RequestContext::new(UserId::new(), self.character)
    }

    pub async fn seed(&self, state: &ProgressionState) {
        self.services
            .store
            .save(self.gm, self.character, state)
            .await
            .expect("seed state");
    }

    pub async fn state(&self) -> ProgressionState {
        self.services
            .store
            .load(self.gm, self.character)
            .await
            .expect("load state")
    }
}

/// Single `arcana` domain with the chain `A -> B -> C`.
pub(crate) fn chain_state(level: u32) -> ProgressionState {
    ProgressionState::default()
        .with_domain(Domain::new("arcana", "Arcana").with_nodes(vec![
            Node::new("A", "A").with_connections(["B"]),
            Node::new("B", "B").with_connections(["C"]),
            Node::new("C", "C"),
        ]))
        .with_level(level)
}

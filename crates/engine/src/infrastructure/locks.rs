//! Per-character operation serialisation.
//!
//! Every mutating use case holds the character's guard from load to save so
//! a double-click cannot interleave two read-modify-write cycles.

use std::sync::Arc;

use dashmap::DashMap;
use talent_tree_domain::CharacterId;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<CharacterId, Arc<Mutex<()>>>;

/// One async mutex per character with a request in flight.
///
/// Entries are dropped once no guard holds or waits on them, so the map only
/// tracks characters currently being worked on.
#[derive(Default)]
pub struct CharacterLocks {
    locks: Arc<LockMap>,
}

impl CharacterLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `character`.
    pub async fn acquire(&self, character: CharacterId) -> CharacterGuard {
        // Clone the Arc out so the shard lock is released before awaiting
        let lock = self
            .locks
            .entry(character)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        CharacterGuard {
            guard: Some(lock.lock_owned().await),
            character,
            locks: Arc::clone(&self.locks),
        }
    }

    pub fn tracked(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive access to one character; releasing it prunes the idle entry.
pub struct CharacterGuard {
    guard: Option<OwnedMutexGuard<()>>,
    character: CharacterId,
    locks: Arc<LockMap>,
}

impl Drop for CharacterGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map's own handle left: nobody holds or waits on it
        self.locks
            .remove_if(&self.character, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_character_is_serialised() {
        let locks = Arc::new(CharacterLocks::new());
        let character = CharacterId::new();

        let guard = locks.acquire(character).await;
        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(character).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.expect("contender finishes");
    }

    #[tokio::test]
    async fn different_characters_do_not_block() {
        let locks = CharacterLocks::new();
        let _a = locks.acquire(CharacterId::new()).await;
        let _b = locks.acquire(CharacterId::new()).await;
        assert_eq!(locks.tracked(), 2);
    }

    #[tokio::test]
    async fn released_characters_are_forgotten() {
        let locks = Arc::new(CharacterLocks::new());
        let character = CharacterId::new();

        let guard = locks.acquire(character).await;
        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(character).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // A waiter keeps the entry alive
        drop(guard);
        waiter.await.expect("waiter finishes");
        assert_eq!(locks.tracked(), 0);

        let _again = locks.acquire(character).await;
        assert_eq!(locks.tracked(), 1);
    }
}

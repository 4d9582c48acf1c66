//! Host service ports: permissions and user-facing notifications.

use talent_tree_domain::{CharacterId, UserId};

/// Capability checks answered by the host.
#[cfg_attr(test, mockall::automock)]
pub trait AccessPolicy: Send + Sync {
    /// Game-master style actor allowed to edit structure and lock nodes.
    fn is_privileged(&self, user: UserId) -> bool;
    fn owns_character(&self, user: UserId, character: CharacterId) -> bool;
}

/// User-visible notification sink.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

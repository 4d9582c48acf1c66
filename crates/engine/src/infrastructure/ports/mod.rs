//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Progression storage (character flags, legacy world table)
//! - Card documents and the domain catalog
//! - Permissions and notifications (host UI)

mod error;
mod external;
mod repos;

pub use error::RepoError;
pub use external::{AccessPolicy, Notifier};
pub use repos::{CardStore, DomainCatalog, FlagStore, LegacyTreeTable};

#[cfg(test)]
pub use external::{MockAccessPolicy, MockNotifier};
#[cfg(test)]
pub use repos::{MockCardStore, MockDomainCatalog, MockFlagStore, MockLegacyTreeTable};

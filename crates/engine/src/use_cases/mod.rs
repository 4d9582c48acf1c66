//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific area of the talent tree.
//! Use cases check permissions, serialise work per character, orchestrate
//! the entity modules and report failures through the notifier.

pub mod cards;
pub mod error;
pub mod progression;
pub mod services;

#[cfg(test)]
mod test_support;

pub use cards::CardUseCases;
pub use error::ProgressionError;
pub use progression::ProgressionUseCases;
pub use services::{RequestContext, TreeServices};

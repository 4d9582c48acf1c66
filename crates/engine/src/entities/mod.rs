//! Entity modules wrapping domain operations.
//!
//! Each module wraps the domain aggregate and its ports:
//! - `progression` loads and saves a character's tree
//! - `cards` keeps nodes and card documents in step

pub mod cards;
pub mod progression;

pub use cards::CardBinder;
pub use progression::{ProgressionStore, StateSource, StoreError};

//! Aggregate roots - domain objects that own their related data
//!
//! A character's whole talent tree is one aggregate: every mutation goes
//! through [`ProgressionState`] so the unlock budget and reachability rules
//! are checked in one place.

pub mod progression;

pub use progression::{LevelChange, ProgressionState, RemovedDomain, DEFAULT_MAX_LEVEL};

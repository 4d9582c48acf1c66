//! Talent tree engine library.
//!
//! Character progression on a per-domain talent graph, driven through ports
//! the host application implements.
//!
//! ## Structure
//!
//! - `entities/` - Entity modules wrapping domain operations
//! - `use_cases/` - User story orchestration across entities
//! - `infrastructure/` - Port traits, in-memory adapters, config and tracing
//! - `app` - Application composition

pub mod app;
pub mod entities;
pub mod infrastructure;
pub mod use_cases;

pub use app::{App, Ports};

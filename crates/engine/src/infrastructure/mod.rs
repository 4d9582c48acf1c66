//! Infrastructure layer - ports and their in-process adapters.

pub mod config;
pub mod locks;
pub mod memory;
pub mod ports;
pub mod telemetry;

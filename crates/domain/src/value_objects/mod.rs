//! Value objects - Immutable objects defined by their attributes

mod catalog;
mod graph;

pub use catalog::{DomainCatalogEntry, DEFAULT_DOMAIN_SRC};
pub use graph::DomainGraph;

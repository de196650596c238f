//! Resolve the import/include graph of XML Schema and WSDL resources.
//!
//! Starting from seed URIs, [`graph::GraphBuilder`] fetches every reachable
//! resource, records failures on the holders instead of aborting, and
//! produces a [`graph::DependencyGraph`] that can be queried by scope and
//! direction or pruned with collateral removal.

pub mod config;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod graph;
pub mod output;
pub mod resource;
pub mod walk;

pub use errors::{ResgraphError, Result};
pub use graph::{DependencyGraph, GraphBuilder};
pub use resource::{DependencyScope, DependencySummary, Direction, ResourceHolder};

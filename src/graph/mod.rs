pub mod builder;
pub mod cycles;
pub mod ir;
pub mod known;
pub mod policy;
pub mod query;
pub mod removal;
pub mod shared;

pub use builder::{resolve, GraphBuilder};
pub use cycles::{find_import_cycles, ImportCycle};
pub use ir::DependencyGraph;
pub use known::KnownResources;
pub use policy::{ConflictChoice, MissingChoice, ResolvePolicy};
pub use query::{dependants, dependencies, query};
pub use removal::{plan_removal, RemovalPlan};
pub use shared::SharedGraph;

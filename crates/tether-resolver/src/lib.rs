//! Module wiring engine: candidate enumeration with fixed-point rollback,
//! uses-constraint consistency search, wire materialization and dynamic
//! import resolution.

pub mod candidates;
pub mod conflict;
pub mod dynamic;
pub mod error;
pub mod graph;
pub mod package_space;
pub mod resolver;
pub mod search;
pub mod uses;
pub mod wiring;

pub use conflict::{ConflictReport, UsesConflict};
pub use dynamic::DynamicImport;
pub use error::{FailureReason, ResolveError};
pub use graph::WireGraph;
pub use resolver::{Resolution, Resolver};
pub use search::SearchStats;

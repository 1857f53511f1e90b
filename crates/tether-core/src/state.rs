//! The query interface the resolution engine runs against.

use std::sync::Arc;

use crate::capability::Capability;
use crate::module::{Module, ModuleId};
use crate::requirement::Requirement;

/// A stable view of the module universe for the duration of one resolve call.
///
/// Implementations decide candidate order; the engine preserves it and
/// always tries resolved providers before unresolved ones.
pub trait ResolverState {
    /// Every known module. Used for the singleton scan.
    fn modules(&self) -> Vec<&Module>;

    fn module(&self, id: &ModuleId) -> Option<&Module>;

    /// Capabilities of already-resolved modules satisfying `req`.
    fn resolved_candidates(&self, req: &Requirement) -> Vec<Arc<Capability>>;

    /// Capabilities of not-yet-resolved modules satisfying `req`.
    fn unresolved_candidates(&self, req: &Requirement) -> Vec<Arc<Capability>>;
}

//! Dynamic imports: wiring one more package into an already resolved module.

use std::sync::Arc;

use tether_core::{Module, Requirement, Wire, WireMap};

/// A dynamically imported package: the new wire for the importer plus the
/// wires of any provider that had to be resolved for it.
#[derive(Debug, Clone)]
pub struct DynamicImport {
    pub wire: Wire,
    pub wires: WireMap,
}

/// The dynamic-import requirement of `importer` covering `package`.
///
/// `None` when the importer exports the package itself, already has a wire
/// that can load it, or declares no matching dynamic import. Patterns match
/// everything (`*`), exactly, or by prefix (`com.acme.*`).
pub fn find_allowed_dynamic_import<'m>(
    importer: &'m Module,
    package: &str,
) -> Option<&'m Arc<Requirement>> {
    if importer.exports(package) {
        return None;
    }
    if importer.wires().iter().any(|w| w.has_package(package)) {
        return None;
    }
    importer
        .dynamic_requirements
        .iter()
        .find(|req| req.matches_dynamic(package))
}

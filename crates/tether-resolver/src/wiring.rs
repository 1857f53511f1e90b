//! Turn an accepted candidate configuration into proposed wires.

use std::collections::HashSet;
use std::sync::Arc;

use tether_core::{Module, ModuleId, Namespace, ResolverState, Wire, WireMap};

use crate::candidates::CandidateMap;
use crate::package_space::PackageSpaces;

/// Wires for `root` and every unresolved module its selection reaches.
///
/// Per module, package wires come first in requirement order, followed by
/// module wires. A package a module selected from itself is not wired.
pub fn materialize(state: &dyn ResolverState, candidates: &CandidateMap, root: &ModuleId) -> WireMap {
    let spaces = PackageSpaces::new(state, candidates);
    let mut wires = WireMap::new();
    populate_wires(&spaces, root, &mut wires);
    wires
}

fn populate_wires(spaces: &PackageSpaces<'_>, importer: &ModuleId, wires: &mut WireMap) {
    if wires.contains_key(importer) {
        return;
    }
    if spaces.state().module(importer).is_some_and(Module::is_resolved) {
        return;
    }
    let Some(sets) = spaces.candidates().sets(importer) else {
        tracing::trace!("{importer} has no candidates; nothing to wire");
        return;
    };

    // cycle guard
    wires.insert(importer.clone(), Vec::new());

    let mut package_wires = Vec::new();
    let mut module_wires = Vec::new();
    for set in sets {
        let cap = set.selected();
        if set.requirement.namespace == Namespace::Module {
            let mut visited = HashSet::from([importer.clone()]);
            let packages = spaces.exported_and_reexported(&cap.module, &mut visited);
            module_wires.push(Wire::module(
                importer.clone(),
                Arc::clone(&set.requirement),
                Arc::clone(cap),
                packages,
            ));
        } else if cap.module != *importer {
            package_wires.push(Wire::package(
                importer.clone(),
                Arc::clone(&set.requirement),
                Arc::clone(cap),
            ));
        }
        populate_wires(spaces, &cap.module, wires);
    }

    package_wires.extend(module_wires);
    tracing::trace!("{importer}: {} wire(s)", package_wires.len());
    wires.insert(importer.clone(), package_wires);
}

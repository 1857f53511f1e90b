//! Uses constraints: what a module is implicitly bound to through the
//! `uses` lists of every capability it can see.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tether_core::{Capability, ModuleId, PackageSpace, ResolvedPackage, ResolverState};

use crate::candidates::CandidateMap;
use crate::package_space::PackageSpaces;

/// Implied providers per used package, in discovery order.
pub type UsesMap = BTreeMap<String, Vec<ResolvedPackage>>;

/// Compute the uses constraints of everything visible to `module`.
pub fn uses_constraints(spaces: &mut PackageSpaces<'_>, module: &ModuleId) -> UsesMap {
    let mut uses = UsesMap::new();
    let mut visited = HashSet::new();
    let space = spaces.of(module);
    for rp in space.values() {
        for cap in rp.capabilities() {
            collect(spaces, cap, &mut uses, &mut visited);
        }
    }
    uses
}

fn collect(
    spaces: &mut PackageSpaces<'_>,
    cap: &Arc<Capability>,
    uses: &mut UsesMap,
    visited: &mut HashSet<Arc<Capability>>,
) {
    if !visited.insert(Arc::clone(cap)) || cap.uses.is_empty() {
        return;
    }
    let space = spaces.of(&cap.module);
    for used in &cap.uses {
        let Some(rp) = space.get(used) else {
            // nothing to constrain against; the declaration goes unchecked
            tracing::debug!("{cap} uses {used}, which {} cannot see", cap.module);
            continue;
        };
        for provider in rp.capabilities() {
            collect(spaces, provider, uses, visited);
        }
        uses.entry(used.clone()).or_default().push(rp.clone());
    }
}

/// A visible package whose implied providers are incomparable with the
/// providers the module actually sees.
#[derive(Debug, Clone)]
pub struct Violation {
    pub package: String,
    /// What the module sees, widened by any compatible constraints checked
    /// before the conflict. Keeps the origin of the import, if any.
    pub visible: ResolvedPackage,
    pub implied: ResolvedPackage,
}

/// Check `uses` against a fixed package space.
///
/// For each constrained package the space can see: an implied value that is
/// a subset is absorbed, a superset replaces the current value, anything
/// else is a violation.
pub fn first_violation(space: &PackageSpace, uses: &UsesMap) -> Option<Violation> {
    for (package, constraints) in uses {
        let Some(visible) = space.get(package) else {
            continue;
        };
        let mut current = visible.clone();
        for implied in constraints {
            if implied.is_subset_of(&current) {
                continue;
            }
            if current.is_subset_of(implied) {
                current = implied.clone().with_origin(current.origin().cloned());
                continue;
            }
            return Some(Violation {
                package: package.clone(),
                visible: current,
                implied: implied.clone(),
            });
        }
    }
    None
}

/// Uses constraints of a module from committed wires only.
pub fn uses_constraints_of(state: &dyn ResolverState, module: &ModuleId) -> UsesMap {
    let candidates = CandidateMap::new();
    let mut spaces = PackageSpaces::new(state, &candidates);
    uses_constraints(&mut spaces, module)
}

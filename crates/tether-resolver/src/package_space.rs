//! Package spaces: every package a module can see and who provides it.
//!
//! A module present in the candidate map is computed from its currently
//! selected candidates. Any other module is treated as resolved and computed
//! from its committed wires.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use tether_core::package::merge_into;
use tether_core::{
    ImportOrigin, Module, ModuleId, Namespace, PackageSpace, Requirement, ResolvedPackage,
    ResolverState,
};

use crate::candidates::CandidateMap;

/// Package-space calculator memoized for one consistency attempt.
pub struct PackageSpaces<'a> {
    state: &'a dyn ResolverState,
    candidates: &'a CandidateMap,
    cache: HashMap<ModuleId, Rc<PackageSpace>>,
}

impl<'a> PackageSpaces<'a> {
    pub fn new(state: &'a dyn ResolverState, candidates: &'a CandidateMap) -> Self {
        Self {
            state,
            candidates,
            cache: HashMap::new(),
        }
    }

    pub fn state(&self) -> &'a dyn ResolverState {
        self.state
    }

    pub fn candidates(&self) -> &'a CandidateMap {
        self.candidates
    }

    /// The package space of `id`, computed once per calculator.
    pub fn of(&mut self, id: &ModuleId) -> Rc<PackageSpace> {
        if let Some(space) = self.cache.get(id) {
            return Rc::clone(space);
        }
        let space = Rc::new(self.compute(id));
        self.cache.insert(id.clone(), Rc::clone(&space));
        space
    }

    fn compute(&self, id: &ModuleId) -> PackageSpace {
        let Some(module) = self.state.module(id) else {
            tracing::trace!("No module {id}; empty package space");
            return PackageSpace::new();
        };
        let mut space = self.required(module);
        merge_into(&mut space, exported(module));
        // explicit imports win over anything seen through a require
        space.extend(self.imported(module));
        space
    }

    fn imported(&self, module: &Module) -> PackageSpace {
        let mut space = PackageSpace::new();
        match self.candidates.sets(&module.id) {
            Some(sets) => {
                for set in sets {
                    let cap = set.selected();
                    if !cap.is_package() {
                        continue;
                    }
                    let origin = ImportOrigin {
                        importer: module.id.clone(),
                        requirement: set.requirement_index,
                    };
                    let rp = ResolvedPackage::from_capability(Arc::clone(cap)).with_origin(Some(origin));
                    space.insert(cap.name.clone(), rp);
                }
            }
            None => {
                for wire in module.wires().iter().filter(|w| !w.is_module_wire()) {
                    let name = &wire.capability.name;
                    let rp = space
                        .remove(name)
                        .unwrap_or_else(|| ResolvedPackage::new(name.clone()))
                        .with_capability(Arc::clone(&wire.capability));
                    space.insert(name.clone(), rp);
                }
            }
        }
        space
    }

    fn required(&self, module: &Module) -> PackageSpace {
        let mut space = PackageSpace::new();
        for (provider, _) in self.module_dependencies(module) {
            let mut visited = HashSet::from([module.id.clone()]);
            merge_into(&mut space, self.exported_and_reexported(&provider, &mut visited));
        }
        space
    }

    /// Module-level dependencies of `module` in requirement order: the
    /// selected providers when it is being resolved, its wires otherwise.
    fn module_dependencies(&self, module: &Module) -> Vec<(ModuleId, Arc<Requirement>)> {
        match self.candidates.sets(&module.id) {
            Some(sets) => sets
                .iter()
                .filter(|set| set.selected().namespace == Namespace::Module)
                .map(|set| (set.selected().module.clone(), Arc::clone(&set.requirement)))
                .collect(),
            None => module
                .wires()
                .iter()
                .filter(|w| w.is_module_wire())
                .map(|w| (w.exporter.clone(), Arc::clone(&w.requirement)))
                .collect(),
        }
    }

    /// Packages `id` exposes to a module requiring it: its own exports plus
    /// the packages it re-exports from its own module dependencies.
    ///
    /// Every transitively required package is collected so that packages
    /// reached both privately and through a re-export merge into one value;
    /// only the re-exported ones are kept.
    pub fn exported_and_reexported(
        &self,
        id: &ModuleId,
        visited: &mut HashSet<ModuleId>,
    ) -> PackageSpace {
        let mut space = PackageSpace::new();
        if !visited.insert(id.clone()) {
            return space;
        }
        let Some(module) = self.state.module(id) else {
            return space;
        };

        let mut all_required = PackageSpace::new();
        let mut reexported = BTreeSet::new();
        for (provider, requirement) in self.module_dependencies(module) {
            let nested = self.exported_and_reexported(&provider, visited);
            if requirement.is_reexport() {
                reexported.extend(nested.keys().cloned());
            }
            merge_into(&mut all_required, nested);
        }
        for name in reexported {
            if let Some(rp) = all_required.remove(&name) {
                space.insert(name, rp);
            }
        }

        for cap in module.package_capabilities() {
            let rp = space
                .remove(&cap.name)
                .unwrap_or_else(|| ResolvedPackage::new(cap.name.clone()))
                .with_capability(Arc::clone(cap));
            space.insert(cap.name.clone(), rp);
        }
        space
    }
}

fn exported(module: &Module) -> PackageSpace {
    let mut space = PackageSpace::new();
    for cap in module.package_capabilities() {
        let rp = space
            .remove(&cap.name)
            .unwrap_or_else(|| ResolvedPackage::new(cap.name.clone()))
            .with_capability(Arc::clone(cap));
        space.insert(cap.name.clone(), rp);
    }
    space
}

/// Package space of a module from committed wires only.
pub fn package_space(state: &dyn ResolverState, module: &ModuleId) -> PackageSpace {
    let candidates = CandidateMap::new();
    let mut spaces = PackageSpaces::new(state, &candidates);
    let space = spaces.of(module);
    (*space).clone()
}

//! In-memory module registry implementing [`ResolverState`].

use std::collections::HashMap;
use std::sync::Arc;

use tether_util::errors::{TetherError, TetherResult};

use crate::capability::Capability;
use crate::module::{Module, ModuleId};
use crate::requirement::Requirement;
use crate::state::ResolverState;
use crate::wire::{Wire, WireMap};

/// Modules in registration order.
///
/// Candidates are returned highest capability version first; equal
/// versions keep registration order.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
    index: HashMap<ModuleId, usize>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module. Ids must be unique.
    pub fn add(&mut self, module: Module) -> TetherResult<()> {
        if self.index.contains_key(&module.id) {
            return Err(TetherError::Universe {
                message: format!("duplicate module id '{}'", module.id),
            }
            .into());
        }
        self.index.insert(module.id.clone(), self.modules.len());
        self.modules.push(module);
        Ok(())
    }

    pub fn get(&self, id: &ModuleId) -> Option<&Module> {
        self.index.get(id).map(|&i| &self.modules[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Attach every proposed wire list and mark those modules resolved.
    ///
    /// Returns the number of modules committed.
    pub fn commit(&mut self, wires: WireMap) -> usize {
        let mut committed = 0;
        for (id, module_wires) in wires {
            match self.index.get(&id) {
                Some(&i) => {
                    self.modules[i].commit(module_wires);
                    committed += 1;
                }
                None => tracing::warn!("Ignoring wires for unknown module {id}"),
            }
        }
        committed
    }

    /// Append a dynamically created wire to its importer.
    pub fn attach_wire(&mut self, wire: Wire) -> bool {
        match self.index.get(&wire.importer) {
            Some(&i) => {
                self.modules[i].attach_wire(wire);
                true
            }
            None => false,
        }
    }

    fn candidates(&self, req: &Requirement, resolved: bool) -> Vec<Arc<Capability>> {
        let mut found: Vec<Arc<Capability>> = self
            .modules
            .iter()
            .filter(|m| m.is_resolved() == resolved)
            .flat_map(|m| m.capabilities.iter())
            .filter(|cap| req.is_satisfied_by(cap))
            .cloned()
            .collect();
        // stable: equal versions keep registration order
        found.sort_by(|a, b| b.version.cmp(&a.version));
        tracing::trace!(
            "{} {} candidate(s) for {req}",
            found.len(),
            if resolved { "resolved" } else { "unresolved" }
        );
        found
    }
}

impl ResolverState for ModuleRegistry {
    fn modules(&self) -> Vec<&Module> {
        self.modules.iter().collect()
    }

    fn module(&self, id: &ModuleId) -> Option<&Module> {
        self.get(id)
    }

    fn resolved_candidates(&self, req: &Requirement) -> Vec<Arc<Capability>> {
        self.candidates(req, true)
    }

    fn unresolved_candidates(&self, req: &Requirement) -> Vec<Arc<Capability>> {
        self.candidates(req, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;

    fn module(id: &str, version: (u64, u64, u64), exports: &[&str]) -> Module {
        let mut b = Module::builder(id, id, Version::new(version.0, version.1, version.2));
        for p in exports {
            b = b.export(p);
        }
        b.finish()
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut reg = ModuleRegistry::new();
        reg.add(module("a", (1, 0, 0), &[])).unwrap();
        let err = reg.add(module("a", (2, 0, 0), &[])).unwrap_err();
        assert!(err.to_string().contains("duplicate module id"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn candidates_ordered_by_version_then_registration() {
        let mut reg = ModuleRegistry::new();
        reg.add(module("old", (1, 0, 0), &["p"])).unwrap();
        reg.add(module("new", (2, 0, 0), &["p"])).unwrap();
        reg.add(module("twin", (1, 0, 0), &["p"])).unwrap();

        let found = reg.unresolved_candidates(&Requirement::import("p"));
        let owners: Vec<&str> = found.iter().map(|c| c.module.as_str()).collect();
        assert_eq!(owners, vec!["new", "old", "twin"]);
        assert!(reg.resolved_candidates(&Requirement::import("p")).is_empty());
    }

    #[test]
    fn commit_moves_module_to_resolved_candidates() {
        let mut reg = ModuleRegistry::new();
        reg.add(module("a", (1, 0, 0), &["p"])).unwrap();
        let mut wires = WireMap::new();
        wires.insert(ModuleId::new("a"), Vec::new());
        wires.insert(ModuleId::new("ghost"), Vec::new());
        assert_eq!(reg.commit(wires), 1);
        assert!(reg.get(&ModuleId::new("a")).unwrap().is_resolved());
        assert_eq!(reg.resolved_candidates(&Requirement::import("p")).len(), 1);
        assert!(reg.unresolved_candidates(&Requirement::import("p")).is_empty());
    }
}

//! Candidate enumeration: for every unresolved module reachable from a root,
//! the ordered providers eligible for each of its requirements.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

use tether_core::config::{PlatformConfig, ResolverConfig};
use tether_core::{Capability, ImportOrigin, Module, ModuleId, Requirement, ResolverState};

use crate::error::ResolveError;

/// The eligible providers for one requirement and the one currently tried.
///
/// A set is never empty: requirements left without candidates either fail
/// their module or, when optional, get no set at all.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    pub module: ModuleId,
    /// Position of `requirement` in the module's requirement list.
    pub requirement_index: usize,
    pub requirement: Arc<Requirement>,
    candidates: Vec<Arc<Capability>>,
    index: usize,
    rotated: usize,
}

impl CandidateSet {
    pub fn new(
        module: ModuleId,
        requirement_index: usize,
        requirement: Arc<Requirement>,
        candidates: Vec<Arc<Capability>>,
    ) -> Self {
        Self {
            module,
            requirement_index,
            requirement,
            candidates,
            index: 0,
            rotated: 0,
        }
    }

    pub fn selected(&self) -> &Arc<Capability> {
        &self.candidates[self.index]
    }

    pub fn candidates(&self) -> &[Arc<Capability>] {
        &self.candidates
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rotations(&self) -> usize {
        self.rotated
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn origin(&self) -> ImportOrigin {
        ImportOrigin {
            importer: self.module.clone(),
            requirement: self.requirement_index,
        }
    }

    /// Select the next candidate. On overflow the selection wraps to the
    /// first candidate and `false` is returned so the caller can carry.
    pub fn advance(&mut self) -> bool {
        if self.index + 1 < self.candidates.len() {
            self.index += 1;
            true
        } else {
            self.index = 0;
            false
        }
    }

    pub fn can_rotate(&self) -> bool {
        self.candidates.len() > 1 && self.rotated < self.candidates.len()
    }

    /// Move the first candidate to the end.
    pub fn rotate(&mut self) {
        self.candidates.rotate_left(1);
        self.rotated += 1;
    }

    /// Branching factor used to order the odometer.
    pub fn weight(&self) -> usize {
        if self.candidates.len() > 1 {
            self.candidates.len()
        } else {
            0
        }
    }

    fn retain(&mut self, keep: impl FnMut(&Arc<Capability>) -> bool) {
        self.candidates.retain(keep);
        if self.index >= self.candidates.len() {
            self.index = 0;
        }
    }
}

/// Candidate sets per unresolved module, in requirement order.
#[derive(Debug, Clone, Default)]
pub struct CandidateMap {
    entries: BTreeMap<ModuleId, Vec<CandidateSet>>,
}

impl CandidateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, module: &ModuleId) -> bool {
        self.entries.contains_key(module)
    }

    pub fn sets(&self, module: &ModuleId) -> Option<&[CandidateSet]> {
        self.entries.get(module).map(Vec::as_slice)
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleId> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set_for(&self, origin: &ImportOrigin) -> Option<&CandidateSet> {
        self.entries
            .get(&origin.importer)?
            .iter()
            .find(|set| set.requirement_index == origin.requirement)
    }

    fn insert(&mut self, module: ModuleId, sets: Vec<CandidateSet>) {
        self.entries.insert(module, sets);
    }

    /// Remove `invalid` and strip every capability it provides from the
    /// remaining sets. A module whose non-optional set empties as a result
    /// is removed in turn, until nothing changes.
    ///
    /// Returns every removed module with the requirement that emptied, if
    /// any.
    pub fn remove_invalid(
        &mut self,
        invalid: &ModuleId,
    ) -> Vec<(ModuleId, Option<Arc<Requirement>>)> {
        let mut removed = Vec::new();
        let mut worklist: VecDeque<(ModuleId, Option<Arc<Requirement>>)> =
            VecDeque::from([(invalid.clone(), None)]);

        while let Some((id, cause)) = worklist.pop_front() {
            self.entries.remove(&id);
            tracing::debug!("Rolling back candidates of {id}");

            for (module, sets) in self.entries.iter_mut() {
                sets.retain_mut(|set| {
                    set.retain(|cap| cap.module != id);
                    if !set.is_empty() {
                        return true;
                    }
                    let queued = worklist.iter().any(|(m, _)| m == module);
                    if !set.requirement.optional && !queued {
                        worklist.push_back((module.clone(), Some(Arc::clone(&set.requirement))));
                    }
                    false
                });
            }
            removed.push((id, cause));
        }
        removed
    }

    /// Drop candidates whose unresolved provider is no longer in the map,
    /// then roll back every module left with an empty non-optional set.
    fn sweep_dangling(
        &mut self,
        state: &dyn ResolverState,
    ) -> Vec<(ModuleId, Option<Arc<Requirement>>)> {
        let present: BTreeSet<ModuleId> = self.entries.keys().cloned().collect();
        let mut invalid: Vec<(ModuleId, Arc<Requirement>)> = Vec::new();

        for (module, sets) in self.entries.iter_mut() {
            sets.retain_mut(|set| {
                set.retain(|cap| present.contains(&cap.module) || is_resolved(state, &cap.module));
                if !set.is_empty() {
                    return true;
                }
                if !set.requirement.optional {
                    invalid.push((module.clone(), Arc::clone(&set.requirement)));
                }
                false
            });
        }

        let mut removed = Vec::new();
        for (module, requirement) in invalid {
            if !self.contains(&module) {
                continue;
            }
            tracing::debug!("Candidates of {module} for {requirement} were rolled back");
            let mut cascade = self.remove_invalid(&module);
            if let Some(first) = cascade.first_mut() {
                first.1 = Some(requirement);
            }
            removed.extend(cascade);
        }
        removed
    }

    /// Drop every entry that no candidate list reachable from `root` still
    /// points at. Rolled-back providers can leave such entries behind.
    fn retain_reachable(&mut self, root: &ModuleId) -> Vec<ModuleId> {
        let mut reachable = BTreeSet::new();
        let mut stack = vec![root.clone()];
        while let Some(id) = stack.pop() {
            let Some(sets) = self.entries.get(&id) else {
                continue;
            };
            if !reachable.insert(id) {
                continue;
            }
            for set in sets {
                stack.extend(
                    set.candidates()
                        .iter()
                        .filter(|cap| !reachable.contains(&cap.module))
                        .map(|cap| cap.module.clone()),
                );
            }
        }

        let orphans: Vec<ModuleId> = self
            .entries
            .keys()
            .filter(|id| !reachable.contains(*id))
            .cloned()
            .collect();
        for id in &orphans {
            tracing::debug!("Dropped candidates of {id}: not reachable from {root}");
            self.entries.remove(id);
        }
        orphans
    }

    /// Modules by descending weight; ties keep module id order.
    pub fn search_order(&self) -> Vec<ModuleId> {
        let mut order: Vec<(&ModuleId, usize)> = self
            .entries
            .iter()
            .map(|(id, sets)| (id, sets.iter().map(CandidateSet::weight).sum()))
            .collect();
        order.sort_by_key(|&(_, weight)| Reverse(weight));
        order.into_iter().map(|(id, _)| id.clone()).collect()
    }

    /// Advance the configuration like an odometer over `order`.
    ///
    /// Returns `false` once every set has overflowed.
    pub fn increment(&mut self, order: &[ModuleId]) -> bool {
        for id in order {
            let Some(sets) = self.entries.get_mut(id) else {
                continue;
            };
            for set in sets.iter_mut() {
                if set.advance() {
                    tracing::trace!("Odometer advanced {id} {} to {}", set.requirement, set.selected());
                    return true;
                }
            }
        }
        false
    }

    /// Rotate the set that selected an import, if its budget allows.
    pub fn rotate(&mut self, origin: &ImportOrigin) -> bool {
        let Some(set) = self
            .entries
            .get_mut(&origin.importer)
            .and_then(|sets| sets.iter_mut().find(|s| s.requirement_index == origin.requirement))
        else {
            return false;
        };
        if !set.can_rotate() {
            return false;
        }
        set.rotate();
        tracing::debug!(
            "Rotated candidates of {} for {} (now {})",
            origin.importer,
            set.requirement,
            set.selected()
        );
        true
    }
}

fn is_resolved(state: &dyn ResolverState, id: &ModuleId) -> bool {
    state.module(id).is_some_and(Module::is_resolved)
}

/// Build the candidate map for `root`.
pub fn populate(
    state: &dyn ResolverState,
    config: &ResolverConfig,
    root: &ModuleId,
) -> Result<CandidateMap, ResolveError> {
    let mut builder = CandidateBuilder {
        state,
        config,
        visiting: HashSet::new(),
        map: CandidateMap::new(),
    };
    builder.populate(root)?;

    let removed = builder.map.sweep_dangling(state);
    builder.map.retain_reachable(root);
    if !builder.map.contains(root) {
        let cause = removed
            .into_iter()
            .find(|(id, _)| id == root)
            .and_then(|(_, req)| req);
        return Err(match cause {
            Some(req) => ResolveError::unsatisfied(root.clone(), req),
            None => ResolveError::exhausted(),
        });
    }
    Ok(builder.map)
}

struct CandidateBuilder<'a> {
    state: &'a dyn ResolverState,
    config: &'a ResolverConfig,
    visiting: HashSet<ModuleId>,
    map: CandidateMap,
}

impl<'a> CandidateBuilder<'a> {
    fn populate(&mut self, id: &ModuleId) -> Result<(), ResolveError> {
        if self.map.contains(id) || self.visiting.contains(id) {
            return Ok(());
        }
        let state = self.state;
        let module = state
            .module(id)
            .ok_or_else(|| ResolveError::unknown_module(id.clone()))?;

        verify_execution_environment(module, &self.config.execution_environments)?;
        verify_native_libraries(module, &self.config.platform)?;

        self.visiting.insert(id.clone());
        let result = self.populate_requirements(module);
        self.visiting.remove(id);

        match result {
            Ok(sets) => {
                self.map.insert(id.clone(), sets);
                Ok(())
            }
            Err(e) => {
                self.map.remove_invalid(id);
                Err(e)
            }
        }
    }

    fn populate_requirements(&mut self, module: &Module) -> Result<Vec<CandidateSet>, ResolveError> {
        let mut sets = Vec::with_capacity(module.requirements.len());

        for (index, req) in module.requirements.iter().enumerate() {
            let mut found = self.state.resolved_candidates(req);
            found.extend(self.state.unresolved_candidates(req));

            let mut last_error = None;
            let mut viable = Vec::with_capacity(found.len());
            for cap in found {
                match self.populate_provider(&cap) {
                    Ok(()) => viable.push(cap),
                    Err(e) => {
                        tracing::debug!("Pruned {cap} for {} {req}: {e}", module.id);
                        last_error = Some(e);
                    }
                }
            }

            if !viable.is_empty() {
                sets.push(CandidateSet::new(module.id.clone(), index, Arc::clone(req), viable));
            } else if !req.optional {
                return Err(last_error
                    .unwrap_or_else(|| ResolveError::unsatisfied(module.id.clone(), Arc::clone(req))));
            }
        }
        Ok(sets)
    }

    fn populate_provider(&mut self, cap: &Capability) -> Result<(), ResolveError> {
        let provider = self
            .state
            .module(&cap.module)
            .ok_or_else(|| ResolveError::unknown_module(cap.module.clone()))?;
        if provider.is_resolved() {
            return Ok(());
        }
        self.populate(&cap.module)
    }
}

/// The module's required environments, if declared, must intersect the
/// supported ones. An empty supported list disables the check.
pub fn verify_execution_environment(
    module: &Module,
    supported: &[String],
) -> Result<(), ResolveError> {
    let Some(required) = module.execution_environment.as_deref().map(str::trim) else {
        return Ok(());
    };
    if required.is_empty() || supported.is_empty() {
        return Ok(());
    }
    let found = required
        .split(',')
        .map(str::trim)
        .any(|env| supported.iter().any(|s| s.trim() == env));
    if found {
        Ok(())
    } else {
        Err(ResolveError::execution_environment(module.id.clone(), required))
    }
}

/// Declared native libraries must have a variant for the platform, and
/// every matching entry must ship in the module's content.
pub fn verify_native_libraries(
    module: &Module,
    platform: &PlatformConfig,
) -> Result<(), ResolveError> {
    let Some(ref libs) = module.native_libraries else {
        return Ok(());
    };
    let matching: Vec<_> = libs
        .iter()
        .filter(|lib| lib.matches_platform(&platform.os, &platform.arch))
        .collect();
    if matching.is_empty() {
        return Err(ResolveError::native_library(
            module.id.clone(),
            "No matching native libraries found.",
        ));
    }
    for lib in matching {
        if let Some(ref entry) = lib.entry {
            if !module.has_entry(entry) {
                return Err(ResolveError::native_library(
                    module.id.clone(),
                    format!("Native library does not exist: {entry}"),
                ));
            }
        }
    }
    Ok(())
}

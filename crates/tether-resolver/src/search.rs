//! Consistency search over candidate configurations.
//!
//! Each attempt checks singleton uniqueness, then class-space consistency,
//! against a fresh package-space calculator. A conflicting import with
//! rotation budget left is rotated and the same logical configuration is
//! re-tested; otherwise the odometer advances.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tether_core::config::SearchConfig;
use tether_core::{ImportOrigin, ModuleId, ResolverState};

use crate::candidates::CandidateMap;
use crate::conflict::{ConflictReport, UsesConflict};
use crate::error::ResolveError;
use crate::package_space::PackageSpaces;
use crate::uses::{first_violation, uses_constraints};

/// Counters for one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub attempts: usize,
    pub rotations: usize,
    pub increments: usize,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attempt(s), {} rotation(s), {} increment(s)",
            self.attempts, self.rotations, self.increments
        )
    }
}

/// What the search does after checking one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Consistent,
    /// A conflicting candidate set was rotated; test again without advancing.
    RetrySameConfiguration,
    Advance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Consistent,
    /// The import that selected the conflicting package, when known.
    Conflict(Option<ImportOrigin>),
}

/// Search until the configuration reachable from `root` is consistent.
///
/// On success the candidate map holds the accepted selection.
pub fn find_consistent(
    state: &dyn ResolverState,
    candidates: &mut CandidateMap,
    root: &ModuleId,
    config: &SearchConfig,
    stats: &mut SearchStats,
    report: &mut ConflictReport,
) -> Result<(), ResolveError> {
    let singletons = resolved_singletons(state);
    let mut order: Option<Vec<ModuleId>> = None;

    loop {
        if let Some(limit) = config.attempt_limit() {
            if stats.attempts >= limit {
                tracing::debug!("Giving up on {root} after {limit} attempts");
                return Err(ResolveError::attempt_limit(limit));
            }
        }
        stats.attempts += 1;

        match evaluate(state, candidates, root, &singletons, config.rotation, report) {
            Verdict::Consistent => {
                tracing::debug!("Consistent configuration for {root} ({stats})");
                return Ok(());
            }
            Verdict::RetrySameConfiguration => stats.rotations += 1,
            Verdict::Advance => {
                let order = order.get_or_insert_with(|| candidates.search_order());
                if !candidates.increment(order) {
                    tracing::debug!("Candidate configurations for {root} exhausted ({stats})");
                    return Err(ResolveError::exhausted());
                }
                stats.increments += 1;
            }
        }
    }
}

/// Check the current configuration once and apply any rotation.
pub fn evaluate(
    state: &dyn ResolverState,
    candidates: &mut CandidateMap,
    root: &ModuleId,
    singletons: &HashSet<String>,
    rotation: bool,
    report: &mut ConflictReport,
) -> Verdict {
    let outcome = {
        let mut spaces = PackageSpaces::new(state, candidates);
        if !singleton_consistent(&mut spaces, root, singletons.clone()) {
            Outcome::Conflict(None)
        } else {
            class_space_consistent(&mut spaces, root, &mut HashSet::new(), report)
        }
    };

    match outcome {
        Outcome::Consistent => Verdict::Consistent,
        Outcome::Conflict(origin) => {
            if let Some(origin) = origin.filter(|_| rotation) {
                if candidates.rotate(&origin) {
                    return Verdict::RetrySameConfiguration;
                }
            }
            Verdict::Advance
        }
    }
}

fn resolved_singletons(state: &dyn ResolverState) -> HashSet<String> {
    state
        .modules()
        .into_iter()
        .filter(|m| m.is_resolved() && m.singleton)
        .map(|m| m.symbolic_name.clone())
        .collect()
}

/// `root` and every unresolved module providing a package it can see or
/// selected by one of its candidate sets, recursively, must not repeat a
/// singleton symbolic name.
fn singleton_consistent(
    spaces: &mut PackageSpaces<'_>,
    root: &ModuleId,
    mut names: HashSet<String>,
) -> bool {
    check_singletons(spaces, root, &mut names, &mut HashSet::new())
}

fn check_singletons(
    spaces: &mut PackageSpaces<'_>,
    id: &ModuleId,
    names: &mut HashSet<String>,
    visited: &mut HashSet<ModuleId>,
) -> bool {
    if !visited.insert(id.clone()) {
        return true;
    }
    let state = spaces.state();
    let Some(module) = state.module(id) else {
        return true;
    };
    if module.singleton && !names.insert(module.symbolic_name.clone()) {
        tracing::debug!("Singleton {} would be resolved twice ({id})", module.symbolic_name);
        return false;
    }

    let space = spaces.of(id);
    for rp in space.values() {
        for cap in rp.capabilities() {
            let unresolved = state.module(&cap.module).is_some_and(|m| !m.is_resolved());
            if unresolved && !check_singletons(spaces, &cap.module, names, visited) {
                return false;
            }
        }
    }

    // selected providers, including ones that add nothing to the space
    let candidates = spaces.candidates();
    for set in candidates.sets(id).unwrap_or_default() {
        let provider = &set.selected().module;
        let unresolved = state.module(provider).is_some_and(|m| !m.is_resolved());
        if unresolved && !check_singletons(spaces, provider, names, visited) {
            return false;
        }
    }
    true
}

/// Providers first, then the module's own uses constraints against its
/// own package space.
fn class_space_consistent(
    spaces: &mut PackageSpaces<'_>,
    id: &ModuleId,
    visited: &mut HashSet<ModuleId>,
    report: &mut ConflictReport,
) -> Outcome {
    if !visited.insert(id.clone()) {
        return Outcome::Consistent;
    }

    let space = spaces.of(id);
    for rp in space.values() {
        for cap in rp.capabilities() {
            let outcome = class_space_consistent(spaces, &cap.module, visited, report);
            if outcome != Outcome::Consistent {
                return outcome;
            }
        }
    }

    let uses = uses_constraints(spaces, id);
    match first_violation(&space, &uses) {
        None => Outcome::Consistent,
        Some(violation) => {
            tracing::debug!(
                "Constraint violation for {id} detected; module can see {} and {}",
                violation.visible,
                violation.implied
            );
            report.add(UsesConflict {
                module: id.clone(),
                package: violation.package,
                visible: violation.visible.to_string(),
                implied: violation.implied.to_string(),
            });
            Outcome::Conflict(violation.visible.origin().cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;
    use tether_core::config::ResolverConfig;
    use tether_core::{Capability, Module, ModuleRegistry, Requirement, WireMap};

    use crate::candidates::populate;

    fn v(major: u64) -> Version {
        Version::new(major, 0, 0)
    }

    /// app imports q from [x, b] while p's only provider c pins q to b.
    fn pinned_registry() -> ModuleRegistry {
        let mut reg = ModuleRegistry::new();
        reg.add(Module::builder("app", "app", v(1)).import("p").import("q").finish())
            .unwrap();
        reg.add(
            Module::builder("c", "c", v(1))
                .export_uses("p", &["q"])
                .requirement(Requirement::import("q").with_attribute("vendor", "b"))
                .finish(),
        )
        .unwrap();
        reg.add(Module::builder("x", "x", v(1)).export("q").finish()).unwrap();
        let vendor_q = Capability::for_package(ModuleId::new("b"), "q", v(1)).with_attribute("vendor", "b");
        reg.add(Module::builder("b", "b", v(1)).capability(vendor_q).finish())
            .unwrap();
        reg
    }

    #[test]
    fn conflicting_import_is_rotated_then_accepted() {
        let reg = pinned_registry();
        let root = ModuleId::new("app");
        let mut candidates = populate(&reg, &ResolverConfig::default(), &root).unwrap();
        let mut report = ConflictReport::new();
        let none = HashSet::new();

        let verdict = evaluate(&reg, &mut candidates.clone(), &root, &none, false, &mut report);
        assert_eq!(verdict, Verdict::Advance);
        assert_eq!(report.len(), 1);
        assert_eq!(report.conflicts[0].module, root);
        assert_eq!(report.conflicts[0].package, "q");

        let verdict = evaluate(&reg, &mut candidates, &root, &none, true, &mut report);
        assert_eq!(verdict, Verdict::RetrySameConfiguration);
        let verdict = evaluate(&reg, &mut candidates, &root, &none, true, &mut report);
        assert_eq!(verdict, Verdict::Consistent);
    }

    #[test]
    fn odometer_finds_the_same_answer_without_rotation() {
        let reg = pinned_registry();
        let root = ModuleId::new("app");
        let mut candidates = populate(&reg, &ResolverConfig::default(), &root).unwrap();
        let config = SearchConfig {
            rotation: false,
            max_attempts: None,
        };
        let mut stats = SearchStats::default();
        let mut report = ConflictReport::new();
        find_consistent(&reg, &mut candidates, &root, &config, &mut stats, &mut report).unwrap();
        assert_eq!(stats.rotations, 0);
        assert_eq!(stats.increments, 1);
        assert_eq!(stats.attempts, 2);
    }

    #[test]
    fn attempt_limit_stops_the_search() {
        let reg = pinned_registry();
        let root = ModuleId::new("app");
        let mut candidates = populate(&reg, &ResolverConfig::default(), &root).unwrap();
        let config = SearchConfig {
            rotation: true,
            max_attempts: Some(1),
        };
        let mut stats = SearchStats::default();
        let mut report = ConflictReport::new();
        let err = find_consistent(&reg, &mut candidates, &root, &config, &mut stats, &mut report)
            .unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(err.message, "Unable to resolve within 1 attempts.");
        assert_eq!(stats.attempts, 1);
    }

    #[test]
    fn singleton_collision_with_resolved_module_exhausts() {
        let mut reg = ModuleRegistry::new();
        reg.add(Module::builder("app", "app", v(1)).import("p").finish()).unwrap();
        reg.add(Module::builder("s1", "s", v(1)).singleton().finish()).unwrap();
        reg.add(Module::builder("s2", "s", v(2)).singleton().export("p").finish())
            .unwrap();
        let mut committed = WireMap::new();
        committed.insert(ModuleId::new("s1"), Vec::new());
        reg.commit(committed);

        let root = ModuleId::new("app");
        let mut candidates = populate(&reg, &ResolverConfig::default(), &root).unwrap();
        let mut stats = SearchStats::default();
        let mut report = ConflictReport::new();
        let err = find_consistent(
            &reg,
            &mut candidates,
            &root,
            &SearchConfig::default(),
            &mut stats,
            &mut report,
        )
        .unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(stats.attempts, 1);
        assert!(report.is_empty());
    }

    #[test]
    fn stats_display() {
        let stats = SearchStats {
            attempts: 3,
            rotations: 1,
            increments: 1,
        };
        assert_eq!(stats.to_string(), "3 attempt(s), 1 rotation(s), 1 increment(s)");
    }
}

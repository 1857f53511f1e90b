//! Resolver entry points.

use std::sync::Arc;

use tether_core::config::ResolverConfig;
use tether_core::{ModuleId, ResolverState, Wire, WireMap};

use crate::candidates::{populate, CandidateMap};
use crate::conflict::ConflictReport;
use crate::dynamic::{find_allowed_dynamic_import, DynamicImport};
use crate::error::ResolveError;
use crate::package_space::PackageSpaces;
use crate::search::{find_consistent, SearchStats};
use crate::uses::{first_violation, uses_constraints};
use crate::wiring::materialize;

/// The outcome of resolving one root module.
///
/// Wires are only proposed; committing them is up to the caller.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub wires: WireMap,
    pub stats: SearchStats,
    pub conflicts: ConflictReport,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    /// Total number of proposed wires.
    pub fn wire_count(&self) -> usize {
        self.wires.values().map(Vec::len).sum()
    }
}

/// The module wiring resolver.
///
/// Holds only configuration; every call works on its own candidate map and
/// caches, so one resolver can serve many callers.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `root` against `state`.
    ///
    /// An already resolved root yields an empty resolution.
    pub fn resolve(
        &self,
        state: &dyn ResolverState,
        root: &ModuleId,
    ) -> Result<Resolution, ResolveError> {
        let module = state
            .module(root)
            .ok_or_else(|| ResolveError::unknown_module(root.clone()))?;
        if module.is_resolved() {
            tracing::debug!("{root} is already resolved");
            return Ok(Resolution::default());
        }

        let mut candidates = populate(state, &self.config, root)?;
        tracing::debug!("Candidate map for {root} covers {} module(s)", candidates.len());

        let mut stats = SearchStats::default();
        let mut conflicts = ConflictReport::new();
        find_consistent(
            state,
            &mut candidates,
            root,
            &self.config.search,
            &mut stats,
            &mut conflicts,
        )?;

        let wires = materialize(state, &candidates, root);
        tracing::info!("Resolved {root}: {} module(s) wired ({stats})", wires.len());
        Ok(Resolution {
            wires,
            stats,
            conflicts,
        })
    }

    /// Wire `package` into `importer` through one of its dynamic imports.
    ///
    /// Providers are tried resolved first. `None` when no dynamic import
    /// covers the package or no provider fits the importer's package space.
    pub fn resolve_dynamic(
        &self,
        state: &dyn ResolverState,
        importer: &ModuleId,
        package: &str,
    ) -> Option<DynamicImport> {
        let module = state.module(importer)?;
        let dynamic = find_allowed_dynamic_import(module, package)?;
        let target = dynamic.with_target(package);

        let mut found = state.resolved_candidates(&target);
        found.extend(state.unresolved_candidates(&target));

        for cap in found {
            match self.resolve_dynamic_provider(state, &cap.module, importer) {
                Ok(Some(wires)) => {
                    let wire = Wire::package(importer.clone(), Arc::clone(dynamic), cap);
                    tracing::debug!("Dynamically wired {wire}");
                    return Some(DynamicImport { wire, wires });
                }
                Ok(None) => {}
                Err(e) => tracing::debug!("Skipping {cap} for dynamic import of {package}: {e}"),
            }
        }
        tracing::debug!("No provider for dynamic import of {package} into {importer}");
        None
    }

    /// Resolve `provider` if needed, then check its uses constraints
    /// against the importer's fixed package space.
    fn resolve_dynamic_provider(
        &self,
        state: &dyn ResolverState,
        provider: &ModuleId,
        importer: &ModuleId,
    ) -> Result<Option<WireMap>, ResolveError> {
        let module = state
            .module(provider)
            .ok_or_else(|| ResolveError::unknown_module(provider.clone()))?;

        let candidates = if module.is_resolved() {
            CandidateMap::new()
        } else {
            let mut candidates = populate(state, &self.config, provider)?;
            find_consistent(
                state,
                &mut candidates,
                provider,
                &self.config.search,
                &mut SearchStats::default(),
                &mut ConflictReport::new(),
            )?;
            candidates
        };

        let mut spaces = PackageSpaces::new(state, &candidates);
        let importer_space = spaces.of(importer);
        let uses = uses_constraints(&mut spaces, provider);
        if let Some(violation) = first_violation(&importer_space, &uses) {
            tracing::debug!(
                "Constraint violation for {importer} detected; module can see {} and {}",
                violation.visible,
                violation.implied
            );
            return Ok(None);
        }

        Ok(Some(materialize(state, &candidates, provider)))
    }
}

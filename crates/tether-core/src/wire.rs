//! Wires: directed edges from a requirer to the capability chosen for it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::capability::{Capability, Namespace};
use crate::module::ModuleId;
use crate::package::PackageSpace;
use crate::requirement::Requirement;

/// An immutable edge from `importer` to `exporter` satisfying `requirement`.
#[derive(Debug, Clone)]
pub struct Wire {
    pub importer: ModuleId,
    pub requirement: Arc<Requirement>,
    pub exporter: ModuleId,
    pub capability: Arc<Capability>,
    /// Module-level wires only: every package the exporter exports or
    /// re-exports, flattened. Empty for package wires.
    pub packages: PackageSpace,
}

/// Proposed wires per module, as produced by one resolution.
pub type WireMap = BTreeMap<ModuleId, Vec<Wire>>;

impl Wire {
    pub fn package(
        importer: ModuleId,
        requirement: Arc<Requirement>,
        capability: Arc<Capability>,
    ) -> Self {
        Self {
            importer,
            requirement,
            exporter: capability.module.clone(),
            capability,
            packages: PackageSpace::new(),
        }
    }

    pub fn module(
        importer: ModuleId,
        requirement: Arc<Requirement>,
        capability: Arc<Capability>,
        packages: PackageSpace,
    ) -> Self {
        Self {
            importer,
            requirement,
            exporter: capability.module.clone(),
            capability,
            packages,
        }
    }

    pub fn is_module_wire(&self) -> bool {
        self.capability.namespace == Namespace::Module
    }

    /// Whether loading `package` through this wire is possible.
    pub fn has_package(&self, package: &str) -> bool {
        if self.is_module_wire() {
            self.packages.contains_key(package)
        } else {
            self.capability.name == package
        }
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({} {})",
            self.importer, self.exporter, self.capability.namespace, self.capability.name
        )
    }
}

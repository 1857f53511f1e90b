//! Modules: the unit of resolution.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::capability::{Capability, Namespace};
use crate::requirement::Requirement;
use crate::wire::Wire;

/// Unique identity of a module within one registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A native library variant declared by a module.
///
/// Empty `os` or `arch` lists match any platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeLibrary {
    /// Path of the library inside the module's content, if any.
    #[serde(default)]
    pub entry: Option<String>,
    #[serde(default)]
    pub os: Vec<String>,
    #[serde(default)]
    pub arch: Vec<String>,
}

impl NativeLibrary {
    pub fn matches_platform(&self, os: &str, arch: &str) -> bool {
        let os_ok = self.os.is_empty() || self.os.iter().any(|o| o.eq_ignore_ascii_case(os));
        let arch_ok =
            self.arch.is_empty() || self.arch.iter().any(|a| a.eq_ignore_ascii_case(arch));
        os_ok && arch_ok
    }
}

/// A module with its declared metadata and, once resolved, its wires.
#[derive(Debug, Clone)]
pub struct Module {
    pub id: ModuleId,
    pub symbolic_name: String,
    pub version: Version,
    /// At most one resolved module per symbolic name when set.
    pub singleton: bool,
    pub requirements: Vec<Arc<Requirement>>,
    pub dynamic_requirements: Vec<Arc<Requirement>>,
    pub capabilities: Vec<Arc<Capability>>,
    /// Comma-separated list of acceptable execution environments.
    pub execution_environment: Option<String>,
    /// `None` when the module declares no native code at all.
    pub native_libraries: Option<Vec<NativeLibrary>>,
    /// Entries shipped in the module's content.
    pub content: BTreeSet<String>,
    resolved: bool,
    wires: Vec<Wire>,
}

impl Module {
    pub fn builder(
        id: impl Into<String>,
        symbolic_name: impl Into<String>,
        version: Version,
    ) -> ModuleBuilder {
        ModuleBuilder::new(ModuleId::new(id), symbolic_name.into(), version)
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Committed wires; empty while unresolved.
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Attach the wires proposed by a resolution and mark the module resolved.
    pub fn commit(&mut self, wires: Vec<Wire>) {
        self.wires = wires;
        self.resolved = true;
    }

    /// Append a single wire to an already-resolved module (dynamic imports).
    pub fn attach_wire(&mut self, wire: Wire) {
        self.wires.push(wire);
    }

    pub fn package_capabilities(&self) -> impl Iterator<Item = &Arc<Capability>> {
        self.capabilities
            .iter()
            .filter(|cap| cap.namespace == Namespace::Package)
    }

    pub fn exports(&self, package: &str) -> bool {
        self.package_capabilities().any(|cap| cap.name == package)
    }

    pub fn has_entry(&self, entry: &str) -> bool {
        self.content.contains(entry)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} {}]", self.id, self.symbolic_name, self.version)
    }
}

/// Incremental construction of a [`Module`].
///
/// Every module gets a module-level capability for its symbolic name as
/// its first capability, so require-style dependencies can target it.
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    fn new(id: ModuleId, symbolic_name: String, version: Version) -> Self {
        let own = Capability::for_module(id.clone(), symbolic_name.clone(), version.clone());
        Self {
            module: Module {
                id,
                symbolic_name,
                version,
                singleton: false,
                requirements: Vec::new(),
                dynamic_requirements: Vec::new(),
                capabilities: vec![Arc::new(own)],
                execution_environment: None,
                native_libraries: None,
                content: BTreeSet::new(),
                resolved: false,
                wires: Vec::new(),
            },
        }
    }

    pub fn singleton(mut self) -> Self {
        self.module.singleton = true;
        self
    }

    /// Export `package` at the module's own version.
    pub fn export(self, package: &str) -> Self {
        self.export_uses(package, &[])
    }

    pub fn export_uses(self, package: &str, uses: &[&str]) -> Self {
        let version = self.module.version.clone();
        let cap = Capability::for_package(self.module.id.clone(), package, version)
            .with_uses(uses.iter().copied());
        self.capability(cap)
    }

    /// Add a capability; its owning module is forced to this module.
    pub fn capability(mut self, mut cap: Capability) -> Self {
        cap.module = self.module.id.clone();
        self.module.capabilities.push(Arc::new(cap));
        self
    }

    pub fn import(self, package: &str) -> Self {
        self.requirement(Requirement::import(package))
    }

    pub fn require(self, symbolic_name: &str) -> Self {
        self.requirement(Requirement::require(symbolic_name))
    }

    pub fn requirement(mut self, req: Requirement) -> Self {
        self.module.requirements.push(Arc::new(req));
        self
    }

    pub fn dynamic_import(mut self, pattern: &str) -> Self {
        self.module
            .dynamic_requirements
            .push(Arc::new(Requirement::import(pattern)));
        self
    }

    pub fn dynamic_requirement(mut self, req: Requirement) -> Self {
        self.module.dynamic_requirements.push(Arc::new(req));
        self
    }

    pub fn execution_environment(mut self, env: &str) -> Self {
        self.module.execution_environment = Some(env.to_string());
        self
    }

    /// Declare native code. Calling this with an empty list still declares
    /// native code, which then matches no platform.
    pub fn native_libraries(mut self, libs: Vec<NativeLibrary>) -> Self {
        self.module.native_libraries = Some(libs);
        self
    }

    pub fn content(mut self, entry: &str) -> Self {
        self.module.content.insert(entry.to_string());
        self
    }

    pub fn finish(self) -> Module {
        self.module
    }
}

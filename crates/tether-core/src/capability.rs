//! Capabilities: named, namespaced facts a module offers to others.

use std::collections::BTreeMap;
use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::module::ModuleId;

/// The namespace a capability or requirement lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    /// A single exported package (import-style dependencies).
    Package,
    /// A whole module by symbolic name (require-style dependencies).
    Module,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Package => f.write_str("package"),
            Namespace::Module => f.write_str("module"),
        }
    }
}

/// A capability declared by a module.
///
/// Package capabilities carry a `uses` list: the other packages that appear
/// in the exported package's signatures. Anyone who sees this capability is
/// bound to the same providers for those packages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capability {
    pub module: ModuleId,
    pub namespace: Namespace,
    pub name: String,
    pub version: Version,
    pub attributes: BTreeMap<String, String>,
    pub uses: Vec<String>,
}

impl Capability {
    /// An exported package.
    pub fn for_package(module: ModuleId, package: impl Into<String>, version: Version) -> Self {
        Self {
            module,
            namespace: Namespace::Package,
            name: package.into(),
            version,
            attributes: BTreeMap::new(),
            uses: Vec::new(),
        }
    }

    /// The module-level capability every module offers under its symbolic name.
    pub fn for_module(module: ModuleId, symbolic_name: impl Into<String>, version: Version) -> Self {
        Self {
            module,
            namespace: Namespace::Module,
            name: symbolic_name.into(),
            version,
            attributes: BTreeMap::new(),
            uses: Vec::new(),
        }
    }

    pub fn with_uses<I, S>(mut self, uses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uses = uses.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn is_package(&self) -> bool {
        self.namespace == Namespace::Package
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.name, self.version, self.module)
    }
}

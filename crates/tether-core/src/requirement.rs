//! Requirements: constraints a module needs satisfied by another module's capability.

use std::collections::BTreeMap;
use std::fmt;

use semver::VersionReq;
use serde::{Deserialize, Serialize};

use crate::capability::{Capability, Namespace};

/// Whether packages obtained through a module-level requirement are
/// passed on to the requirer's own requirers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    #[default]
    Private,
    Reexport,
}

/// A requirement declared by a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub namespace: Namespace,
    /// Package name or module symbolic name. Dynamic imports may use `*`
    /// or a `prefix.*` wildcard here.
    pub name: String,
    pub version: Option<VersionReq>,
    /// Attributes the capability must carry with exactly these values.
    pub attributes: BTreeMap<String, String>,
    pub optional: bool,
    pub visibility: Visibility,
}

impl Requirement {
    /// An import-style dependency on a package.
    pub fn import(package: impl Into<String>) -> Self {
        Self {
            namespace: Namespace::Package,
            name: package.into(),
            version: None,
            attributes: BTreeMap::new(),
            optional: false,
            visibility: Visibility::Private,
        }
    }

    /// A require-style dependency on a whole module.
    pub fn require(symbolic_name: impl Into<String>) -> Self {
        Self {
            namespace: Namespace::Module,
            ..Self::import(symbolic_name)
        }
    }

    pub fn with_version(mut self, version: VersionReq) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn reexport(mut self) -> Self {
        self.visibility = Visibility::Reexport;
        self
    }

    pub fn is_reexport(&self) -> bool {
        self.visibility == Visibility::Reexport
    }

    /// Returns `true` if `cap` can satisfy this requirement.
    pub fn is_satisfied_by(&self, cap: &Capability) -> bool {
        if cap.namespace != self.namespace || cap.name != self.name {
            return false;
        }
        if let Some(ref range) = self.version {
            if !range.matches(&cap.version) {
                return false;
            }
        }
        self.attributes
            .iter()
            .all(|(key, value)| cap.attributes.get(key) == Some(value))
    }

    /// Returns `true` if this dynamic-import requirement covers `package`.
    ///
    /// `*` matches everything, `com.acme.*` matches every package starting
    /// with `com.acme.`, anything else must match exactly.
    pub fn matches_dynamic(&self, package: &str) -> bool {
        let target = self.name.as_str();
        if target == "*" || target == package {
            return true;
        }
        match target.strip_suffix('*') {
            Some(prefix) if prefix.ends_with('.') => package.starts_with(prefix),
            _ => false,
        }
    }

    /// A precise package requirement for `package`, keeping every other
    /// constraint of this (possibly wildcarded) requirement.
    pub fn with_target(&self, package: &str) -> Self {
        Self {
            namespace: Namespace::Package,
            name: package.to_string(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.namespace {
            Namespace::Package => "import",
            Namespace::Module => "require",
        };
        write!(f, "{verb} {}", self.name)?;
        if let Some(ref range) = self.version {
            write!(f, " ({range})")?;
        }
        if self.optional {
            f.write_str(" [optional]")?;
        }
        Ok(())
    }
}

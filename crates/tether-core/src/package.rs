//! Resolved packages: which capabilities provide a package as seen from one module.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::capability::Capability;
use crate::module::ModuleId;

/// Identifies the candidate set that selected an imported package: the
/// importing module and the index of its requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImportOrigin {
    pub importer: ModuleId,
    pub requirement: usize,
}

/// A package name together with the ordered capabilities providing it.
///
/// More than one capability accumulates when the package is reachable along
/// several paths (e.g. exported locally and re-exported by a required
/// module). Values are immutable; combining two produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub name: String,
    capabilities: Vec<Arc<Capability>>,
    origin: Option<ImportOrigin>,
}

/// Every package visible to a module, keyed by package name.
pub type PackageSpace = BTreeMap<String, ResolvedPackage>;

impl ResolvedPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: Vec::new(),
            origin: None,
        }
    }

    /// A package provided by exactly one capability.
    pub fn from_capability(cap: Arc<Capability>) -> Self {
        Self {
            name: cap.name.clone(),
            capabilities: vec![cap],
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: Option<ImportOrigin>) -> Self {
        self.origin = origin;
        self
    }

    pub fn capabilities(&self) -> &[Arc<Capability>] {
        &self.capabilities
    }

    pub fn origin(&self) -> Option<&ImportOrigin> {
        self.origin.as_ref()
    }

    pub fn contains(&self, cap: &Capability) -> bool {
        self.capabilities.iter().any(|c| **c == *cap)
    }

    /// This package plus `cap`, unless it is already present.
    pub fn with_capability(&self, cap: Arc<Capability>) -> Self {
        let mut next = self.clone();
        if !next.contains(&cap) {
            next.capabilities.push(cap);
        }
        next
    }

    /// Order-preserving, duplicate-free union. Keeps this value's origin.
    pub fn union(&self, other: &ResolvedPackage) -> Self {
        other
            .capabilities
            .iter()
            .fold(self.clone(), |acc, cap| acc.with_capability(Arc::clone(cap)))
    }

    /// Every capability of `self` also provides the package in `other`.
    pub fn is_subset_of(&self, other: &ResolvedPackage) -> bool {
        self.capabilities.iter().all(|cap| other.contains(cap))
    }

    /// Either side contains the other.
    pub fn is_comparable_with(&self, other: &ResolvedPackage) -> bool {
        self.is_subset_of(other) || other.is_subset_of(self)
    }
}

impl fmt::Display for ResolvedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> [", self.name)?;
        for (i, cap) in self.capabilities.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{cap}")?;
        }
        f.write_str("]")
    }
}

/// Merge `incoming` into `space`, unioning packages present on both sides.
pub fn merge_into(space: &mut PackageSpace, incoming: PackageSpace) {
    for (name, rp) in incoming {
        let merged = match space.get(&name) {
            Some(existing) => existing.union(&rp),
            None => rp,
        };
        space.insert(name, merged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;

    fn cap(module: &str) -> Arc<Capability> {
        Arc::new(Capability::for_package(
            ModuleId::new(module),
            "p",
            Version::new(1, 0, 0),
        ))
    }

    #[test]
    fn union_preserves_order_and_dedupes() {
        let a = ResolvedPackage::from_capability(cap("a")).with_capability(cap("b"));
        let b = ResolvedPackage::from_capability(cap("c")).with_capability(cap("a"));
        let u = a.union(&b);
        let owners: Vec<&str> = u.capabilities().iter().map(|c| c.module.as_str()).collect();
        assert_eq!(owners, vec!["a", "b", "c"]);
        // inputs untouched
        assert_eq!(a.capabilities().len(), 2);
        assert_eq!(b.capabilities().len(), 2);
    }

    #[test]
    fn subset_relation() {
        let small = ResolvedPackage::from_capability(cap("a"));
        let big = small.with_capability(cap("b"));
        let other = ResolvedPackage::from_capability(cap("c"));
        assert!(small.is_subset_of(&big));
        assert!(!big.is_subset_of(&small));
        assert!(small.is_comparable_with(&big));
        assert!(!small.is_comparable_with(&other));
        assert!(ResolvedPackage::new("p").is_subset_of(&other));
    }

    #[test]
    fn union_keeps_left_origin() {
        let origin = ImportOrigin {
            importer: ModuleId::new("x"),
            requirement: 2,
        };
        let left = ResolvedPackage::from_capability(cap("a")).with_origin(Some(origin.clone()));
        let right = ResolvedPackage::from_capability(cap("b"));
        assert_eq!(left.union(&right).origin(), Some(&origin));
        assert_eq!(right.union(&left).origin(), None);
    }

    #[test]
    fn merge_into_unions_shared_keys() {
        let mut space = PackageSpace::new();
        space.insert("p".into(), ResolvedPackage::from_capability(cap("a")));
        let mut incoming = PackageSpace::new();
        incoming.insert("p".into(), ResolvedPackage::from_capability(cap("b")));
        incoming.insert(
            "q".into(),
            ResolvedPackage::new("q").with_capability(cap("c")),
        );
        merge_into(&mut space, incoming);
        assert_eq!(space["p"].capabilities().len(), 2);
        assert!(space.contains_key("q"));
    }

    #[test]
    fn display_lists_providers() {
        let rp = ResolvedPackage::from_capability(cap("a"));
        assert_eq!(rp.to_string(), "p -> [p 1.0.0 (a)]");
    }
}

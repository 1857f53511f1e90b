//! Uses-constraint conflicts observed while searching for a consistent wiring.

use std::fmt;

use serde::Serialize;
use tether_core::ModuleId;

/// Every distinct conflict seen during one resolve call, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConflictReport {
    pub conflicts: Vec<UsesConflict>,
}

/// A module that could see one set of providers for a package while a
/// `uses` constraint implied an incomparable set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsesConflict {
    pub module: ModuleId,
    pub package: String,
    pub visible: String,
    pub implied: String,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a conflict unless an identical one was already seen.
    pub fn add(&mut self, conflict: UsesConflict) {
        if !self.conflicts.contains(&conflict) {
            self.conflicts.push(conflict);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No uses conflicts.");
        }
        writeln!(f, "Uses conflicts ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(f, "  {c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for UsesConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: sees {} but a uses constraint implies {}",
            self.module, self.visible, self.implied
        )
    }
}

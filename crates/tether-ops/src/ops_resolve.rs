//! Operation: resolve a module and report its wires.

use std::fmt::Write as _;

use serde::Serialize;
use tether_core::{Wire, WireMap};
use tether_resolver::{ConflictReport, SearchStats};
use tether_util::errors::{TetherError, TetherResult};

use crate::session::Session;

/// Options for `tether resolve`.
#[derive(Debug, Default)]
pub struct ResolveOptions {
    /// Emit the report as JSON.
    pub json: bool,
    /// Include every uses conflict met during the search.
    pub conflicts: bool,
}

/// What one `resolve` produced.
#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub root: String,
    /// The root was already resolved; nothing new was wired.
    pub already_resolved: bool,
    pub modules: Vec<ModuleWires>,
    pub stats: SearchStats,
    pub conflicts: ConflictReport,
}

#[derive(Debug, Serialize)]
pub struct ModuleWires {
    pub module: String,
    pub wires: Vec<WireEntry>,
}

#[derive(Debug, Serialize)]
pub struct WireEntry {
    /// `package` or `module`.
    pub kind: String,
    pub name: String,
    pub exporter: String,
    /// Packages reachable through a module wire.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,
}

impl From<&Wire> for WireEntry {
    fn from(wire: &Wire) -> Self {
        Self {
            kind: wire.capability.namespace.to_string(),
            name: wire.capability.name.clone(),
            exporter: wire.exporter.to_string(),
            packages: wire.packages.keys().cloned().collect(),
        }
    }
}

/// Resolve `root` and commit the result.
pub fn resolve(session: &mut Session, root: &str) -> TetherResult<ResolveReport> {
    let id = session.module_id(root)?;
    let already_resolved = session.registry().get(&id).is_some_and(|m| m.is_resolved());
    let resolution = session.resolve_and_commit(&id)?;

    Ok(ResolveReport {
        root: id.to_string(),
        already_resolved,
        modules: module_wires(&resolution.wires),
        stats: resolution.stats,
        conflicts: resolution.conflicts,
    })
}

fn module_wires(wires: &WireMap) -> Vec<ModuleWires> {
    wires
        .iter()
        .map(|(id, wires)| ModuleWires {
            module: id.to_string(),
            wires: wires.iter().map(WireEntry::from).collect(),
        })
        .collect()
}

/// Render a report for stdout.
pub fn render(report: &ResolveReport, opts: &ResolveOptions) -> TetherResult<String> {
    if opts.json {
        return serde_json::to_string_pretty(report).map_err(|e| {
            TetherError::Generic {
                message: format!("Failed to serialize report: {e}"),
            }
            .into()
        });
    }

    let mut out = String::new();
    if report.already_resolved {
        let _ = writeln!(out, "{} is already resolved.", report.root);
    }
    for module in &report.modules {
        let _ = writeln!(out, "{}", module.module);
        if module.wires.is_empty() {
            let _ = writeln!(out, "  (no wires)");
        }
        for wire in &module.wires {
            let _ = write!(out, "  {} {} -> {}", wire.kind, wire.name, wire.exporter);
            if !wire.packages.is_empty() {
                let _ = write!(out, " [{}]", wire.packages.join(", "));
            }
            out.push('\n');
        }
    }
    if opts.conflicts {
        let _ = writeln!(out, "{}", report.conflicts.to_string().trim_end());
    }
    Ok(out)
}

//! Operation: display the wire tree of a module.

use std::fmt::Write as _;

use tether_resolver::WireGraph;
use tether_util::errors::TetherResult;

use crate::session::Session;

/// Options for `tether tree`.
#[derive(Debug, Default)]
pub struct TreeOptions {
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
    /// Show the wire path from the root to this module.
    pub why: Option<String>,
    /// Show the modules wired to the root instead of the ones it is wired to.
    pub inverted: bool,
}

/// Resolve `root` if needed, then render its wire tree.
pub fn tree(session: &mut Session, root: &str, opts: &TreeOptions) -> TetherResult<String> {
    let id = session.module_id(root)?;
    session.resolve_and_commit(&id)?;

    if opts.inverted {
        let graph = WireGraph::from_committed(session.registry());
        return Ok(graph.print_inverted_tree(id.as_str()));
    }

    let graph = WireGraph::from_state(session.registry(), &id);

    if let Some(ref target) = opts.why {
        let mut out = String::new();
        match graph.find_path(target) {
            Some(path) => {
                let _ = writeln!(out, "Path to {target}:");
                for (i, node) in path.iter().enumerate() {
                    let indent = "  ".repeat(i);
                    let _ = writeln!(out, "{indent}{node}");
                }
            }
            None => {
                let _ = writeln!(out, "Module '{target}' is not wired from {id}.");
            }
        }
        return Ok(out);
    }

    if graph.is_empty() {
        tracing::debug!("{id} has no wires");
    }
    Ok(graph.print_tree(opts.depth))
}

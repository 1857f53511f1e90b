//! Wire graph construction and traversal.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use semver::Version;
use tether_core::{ModuleId, ResolverState, Wire, WireMap};

/// A module in the wire graph.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct WireNode {
    pub id: ModuleId,
    pub symbolic_name: String,
    pub version: Version,
}

impl fmt::Display for WireNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id.as_str() == self.symbolic_name {
            write!(f, "{} v{}", self.id, self.version)
        } else {
            write!(f, "{} ({} v{})", self.id, self.symbolic_name, self.version)
        }
    }
}

/// Edge label: every wire between the same importer and exporter.
#[derive(Debug, Clone, Default)]
pub struct WireEdge {
    pub labels: Vec<String>,
}

impl fmt::Display for WireEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels.join(", "))
    }
}

/// A wire graph backed by petgraph, rooted at one module.
pub struct WireGraph {
    graph: DiGraph<WireNode, WireEdge>,
    index: HashMap<ModuleId, NodeIndex>,
    pub root: Option<NodeIndex>,
}

impl WireGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            root: None,
        }
    }

    /// Graph of everything reachable from `root` through committed wires.
    pub fn from_state(state: &dyn ResolverState, root: &ModuleId) -> Self {
        Self::from_wires(state, root, &WireMap::new())
    }

    /// Graph reachable from `root`, preferring `proposed` wires over the
    /// committed ones of the same module.
    pub fn from_wires(state: &dyn ResolverState, root: &ModuleId, proposed: &WireMap) -> Self {
        let mut g = Self::new();
        let Some(root_idx) = g.add_module(state, root) else {
            return g;
        };
        g.set_root(root_idx);

        let mut queue = VecDeque::from([root.clone()]);
        let mut seen = HashSet::from([root.clone()]);
        while let Some(id) = queue.pop_front() {
            let wires: &[Wire] = match proposed.get(&id) {
                Some(wires) => wires,
                None => match state.module(&id) {
                    Some(module) => module.wires(),
                    None => &[],
                },
            };
            for wire in wires {
                let (Some(from), Some(to)) = (g.find(&wire.importer), g.add_module(state, &wire.exporter))
                else {
                    continue;
                };
                let label = format!("{} {}", wire.capability.namespace, wire.capability.name);
                g.add_edge(from, to, label);
                if seen.insert(wire.exporter.clone()) {
                    queue.push_back(wire.exporter.clone());
                }
            }
        }
        g
    }

    /// Unrooted graph of every resolved module and its committed wires.
    pub fn from_committed(state: &dyn ResolverState) -> Self {
        let mut g = Self::new();
        for module in state.modules().into_iter().filter(|m| m.is_resolved()) {
            let Some(from) = g.add_module(state, &module.id) else {
                continue;
            };
            for wire in module.wires() {
                if let Some(to) = g.add_module(state, &wire.exporter) {
                    let label = format!("{} {}", wire.capability.namespace, wire.capability.name);
                    g.add_edge(from, to, label);
                }
            }
        }
        g
    }

    fn add_module(&mut self, state: &dyn ResolverState, id: &ModuleId) -> Option<NodeIndex> {
        let module = state.module(id)?;
        Some(self.add_node(WireNode {
            id: module.id.clone(),
            symbolic_name: module.symbolic_name.clone(),
            version: module.version.clone(),
        }))
    }

    /// Add or retrieve a node. If the id already exists, returns the existing index.
    pub fn add_node(&mut self, node: WireNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node.id) {
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        idx
    }

    pub fn set_root(&mut self, idx: NodeIndex) {
        self.root = Some(idx);
    }

    /// Add a wire from `from` to `to`, merging labels of parallel wires.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, label: String) {
        match self.graph.find_edge(from, to) {
            Some(edge) => self.graph[edge].labels.push(label),
            None => {
                self.graph.add_edge(from, to, WireEdge { labels: vec![label] });
            }
        }
    }

    pub fn find(&self, id: &ModuleId) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &WireNode {
        &self.graph[idx]
    }

    /// All wired modules (excluding root), in insertion order.
    pub fn all_nodes(&self) -> Vec<&WireNode> {
        self.graph
            .node_indices()
            .filter(|&idx| Some(idx) != self.root)
            .map(|idx| &self.graph[idx])
            .collect()
    }

    /// Exporters `idx` is wired to, in wire order.
    pub fn dependencies_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &WireEdge)> {
        let mut deps: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target(), e.weight()))
            .collect();
        // petgraph walks outgoing edges newest first
        deps.sort_by_key(|(edge, _, _)| *edge);
        deps.into_iter().map(|(_, target, w)| (target, w)).collect()
    }

    /// Importers wired to `idx`.
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &WireEdge)> {
        let mut deps: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.id(), e.source(), e.weight()))
            .collect();
        deps.sort_by_key(|(edge, _, _)| *edge);
        deps.into_iter().map(|(_, source, w)| (source, w)).collect()
    }

    /// Print the wire tree to a string.
    pub fn print_tree(&self, max_depth: Option<usize>) -> String {
        let mut output = String::new();
        let Some(root) = self.root else {
            return output;
        };
        output.push_str(&format!("{}\n", self.graph[root]));

        let mut visited = HashSet::new();
        visited.insert(root);
        let deps = self.dependencies_of(root);
        let count = deps.len();
        for (i, (idx, edge)) in deps.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_subtree(&mut output, *idx, edge, "", is_last, 1, max_depth, &mut visited);
        }
        output
    }

    #[allow(clippy::too_many_arguments)]
    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        edge: &WireEdge,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        let node = &self.graph[idx];
        output.push_str(&format!("{prefix}{connector}{node} [{edge}]\n"));

        if let Some(max) = max_depth {
            if depth >= max {
                return;
            }
        }

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.dependencies_of(idx);
        let count = deps.len();
        for (i, (child, child_edge)) in deps.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_subtree(
                output,
                *child,
                child_edge,
                &child_prefix,
                is_last,
                depth + 1,
                max_depth,
                visited,
            );
        }

        visited.remove(&idx);
    }

    /// Find the wire path from root to a module.
    ///
    /// Accepts either a module id or a symbolic name.
    pub fn find_path(&self, target: &str) -> Option<Vec<&WireNode>> {
        let root = self.root?;
        let target = self.resolve_key(target)?;
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        if self.dfs_path(root, target, &mut path, &mut visited) {
            Some(path.iter().map(|&idx| &self.graph[idx]).collect())
        } else {
            None
        }
    }

    /// Exact module id first, then the first node with that symbolic name.
    fn resolve_key(&self, key: &str) -> Option<NodeIndex> {
        if let Some(&idx) = self.index.get(&ModuleId::new(key)) {
            return Some(idx);
        }
        self.graph
            .node_indices()
            .find(|&idx| self.graph[idx].symbolic_name == key)
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for (next, _) in self.dependencies_of(current) {
            if self.dfs_path(next, target, path, visited) {
                return true;
            }
        }
        path.pop();
        visited.remove(&current);
        false
    }

    /// Inverted tree: who is wired to `target`, transitively.
    pub fn print_inverted_tree(&self, target: &str) -> String {
        let mut output = String::new();
        let Some(idx) = self.resolve_key(target) else {
            return output;
        };
        output.push_str(&format!("{}\n", self.graph[idx]));

        let mut visited = HashSet::new();
        visited.insert(idx);
        let dependents = self.dependents_of(idx);
        let count = dependents.len();
        for (i, (dep_idx, edge)) in dependents.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_inverted_subtree(&mut output, *dep_idx, edge, "", is_last, &mut visited);
        }
        output
    }

    fn print_inverted_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        edge: &WireEdge,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        let node = &self.graph[idx];
        output.push_str(&format!("{prefix}{connector}{node} [{edge}]\n"));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let dependents = self.dependents_of(idx);
        let count = dependents.len();
        for (i, (dep_idx, dep_edge)) in dependents.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_inverted_subtree(output, *dep_idx, dep_edge, &child_prefix, is_last, visited);
        }

        visited.remove(&idx);
    }

    /// Number of wired modules (excluding root).
    pub fn len(&self) -> usize {
        let total = self.graph.node_count();
        if self.root.is_some() {
            total.saturating_sub(1)
        } else {
            total
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for WireGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> WireNode {
        WireNode {
            id: ModuleId::new(id),
            symbolic_name: id.to_string(),
            version: Version::new(1, 0, 0),
        }
    }

    fn sample() -> WireGraph {
        let mut g = WireGraph::new();
        let app = g.add_node(node("app"));
        let api = g.add_node(node("api"));
        let base = g.add_node(node("base"));
        g.set_root(app);
        g.add_edge(app, api, "package com.acme.api".into());
        g.add_edge(app, api, "package com.acme.spi".into());
        g.add_edge(app, base, "module base".into());
        g.add_edge(api, base, "package com.acme.util".into());
        g
    }

    #[test]
    fn duplicate_add_returns_same_index() {
        let mut g = WireGraph::new();
        let a = g.add_node(node("a"));
        let b = g.add_node(node("a"));
        assert_eq!(a, b);
        assert_eq!(g.find(&ModuleId::new("a")), Some(a));
    }

    #[test]
    fn parallel_wires_merge_labels() {
        let g = sample();
        let app = g.find(&ModuleId::new("app")).unwrap();
        let deps = g.dependencies_of(app);
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].1.to_string(), "package com.acme.api, package com.acme.spi");
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn tree_printing() {
        let g = sample();
        let tree = g.print_tree(None);
        let expected = "\
app v1.0.0
├── api v1.0.0 [package com.acme.api, package com.acme.spi]
│   └── base v1.0.0 [package com.acme.util]
└── base v1.0.0 [module base]
";
        assert_eq!(tree, expected);

        let shallow = g.print_tree(Some(1));
        assert!(!shallow.contains("com.acme.util"));
    }

    #[test]
    fn path_and_inverted_tree() {
        let g = sample();
        let path: Vec<String> = g
            .find_path("base")
            .unwrap()
            .iter()
            .map(|n| n.id.to_string())
            .collect();
        assert_eq!(path, vec!["app", "api", "base"]);
        assert!(g.find_path("missing").is_none());

        let inverted = g.print_inverted_tree("base");
        assert!(inverted.starts_with("base v1.0.0\n"));
        assert!(inverted.contains("api v1.0.0 [package com.acme.util]"));
        assert!(inverted.contains("app v1.0.0 [module base]"));
    }

    #[test]
    fn built_from_committed_wires() {
        use crate::Resolver;
        use tether_core::{Module, ModuleRegistry};

        let mut reg = ModuleRegistry::new();
        reg.add(Module::builder("app", "app", Version::new(1, 0, 0)).import("p").finish())
            .unwrap();
        reg.add(Module::builder("lib", "lib", Version::new(1, 0, 0)).export("p").finish())
            .unwrap();
        let root = ModuleId::new("app");
        let resolution = Resolver::new().resolve(&reg, &root).unwrap();

        let proposed = WireGraph::from_wires(&reg, &root, &resolution.wires);
        assert_eq!(proposed.len(), 1);

        reg.commit(resolution.wires);
        let committed = WireGraph::from_state(&reg, &root);
        assert_eq!(committed.print_tree(None), "app v1.0.0\n└── lib v1.0.0 [package p]\n");

        let all = WireGraph::from_committed(&reg);
        assert!(all.root.is_none());
        assert!(all.print_inverted_tree("lib").contains("app v1.0.0 [package p]"));
    }

    #[test]
    fn symbolic_name_display() {
        let n = WireNode {
            id: ModuleId::new("api-2"),
            symbolic_name: "com.acme.api".into(),
            version: Version::new(2, 0, 0),
        };
        assert_eq!(n.to_string(), "api-2 (com.acme.api v2.0.0)");
    }
}

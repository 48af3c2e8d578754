//! Dependency tree rendering from an expansion trace.
//!
//! Every trace entry corresponds to a node the expander considered; included
//! entries form the tree, omitted ones can be shown annotated with the
//! reason they lost.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use javelin_core::Lib;
use javelin_ext::Registry;
use javelin_resolver::{TraceEntry, TraceLog};

struct TreeNode {
    lib: Lib,
    summary: String,
    include: bool,
    annotation: Option<String>,
}

/// Render the dependency tree recorded in `trace`, summarizing coordinates
/// through their procurers. With `show_omitted`, nodes the expander rejected
/// appear annotated with their reason.
pub fn render_tree(trace: &TraceLog, registry: &Registry, show_omitted: bool) -> String {
    let mut graph: DiGraph<TreeNode, ()> = DiGraph::new();
    let mut by_path: HashMap<Vec<Lib>, NodeIndex> = HashMap::new();
    let mut roots: Vec<NodeIndex> = Vec::new();

    for entry in &trace.log {
        if !entry.include && !show_omitted {
            continue;
        }
        let idx = graph.add_node(node_for(entry, registry));
        if entry.include {
            let mut full_path = entry.path.clone();
            full_path.push(entry.lib.clone());
            by_path.insert(full_path, idx);
        }
        if entry.path.is_empty() {
            roots.push(idx);
        } else if let Some(&parent) = by_path.get(&entry.path) {
            graph.add_edge(parent, idx, ());
        }
    }

    let mut output = String::new();
    for root in roots {
        let node = &graph[root];
        output.push_str(&format!("{} {}\n", node.lib, node.summary));
        render_children(&graph, root, "", &mut output);
    }
    output
}

fn node_for(entry: &TraceEntry, registry: &Registry) -> TreeNode {
    let summary = registry
        .procurer_for(&entry.use_coord)
        .map(|p| p.coord_summary(&entry.lib, &entry.use_coord))
        .unwrap_or_else(|_| entry.coord_id.to_string());
    TreeNode {
        lib: entry.lib.clone(),
        summary,
        include: entry.include,
        annotation: (!entry.include).then(|| entry.reason.to_string()),
    }
}

fn render_children(
    graph: &DiGraph<TreeNode, ()>,
    idx: NodeIndex,
    prefix: &str,
    output: &mut String,
) {
    // petgraph iterates outgoing neighbors in reverse insertion order
    let children: Vec<NodeIndex> = {
        let mut c: Vec<_> = graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        c.reverse();
        c
    };
    let count = children.len();
    for (i, child_idx) in children.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        let node = &graph[*child_idx];
        match &node.annotation {
            Some(reason) => output.push_str(&format!(
                "{prefix}{connector}{} {} ({reason})\n",
                node.lib, node.summary
            )),
            None => output.push_str(&format!(
                "{prefix}{connector}{} {}\n",
                node.lib, node.summary
            )),
        }
        if node.include {
            let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
            render_children(graph, *child_idx, &child_prefix, output);
        }
    }
}

//! Dependency graph construction, cycle detection, and topological
//! layering over a workspace manifest's project entries.

use std::collections::{HashMap, VecDeque};

use super::error::{Error, Result};
use super::manifest::Manifest;

/// Node index into `Graph::nodes`, in workspace declaration order.
pub type NodeId = usize;

pub struct Graph {
    /// Project names, in declaration order; `edges[i]` holds the indices
    /// of `nodes[i]`'s in-workspace dependencies.
    pub nodes: Vec<String>,
    pub edges: Vec<Vec<NodeId>>,
}

impl Graph {
    /// Builds the graph from a manifest. Depends entries naming a project
    /// not declared in the workspace are treated as external runtime
    /// dependencies and silently elided from the graph (they are still
    /// forwarded to the host package manager at install time, just not
    /// here).
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let index: HashMap<&str, NodeId> = manifest
            .projects
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.as_str(), i))
            .collect();

        let nodes: Vec<String> = manifest.projects.iter().map(|p| p.name.clone()).collect();
        let edges: Vec<Vec<NodeId>> = manifest
            .projects
            .iter()
            .map(|p| {
                p.depends
                    .iter()
                    .filter_map(|dep| index.get(dep.as_str()).copied())
                    .collect()
            })
            .collect();

        Graph { nodes, edges }
    }

    /// Iterative three-color DFS. On a back-edge, returns the full cycle
    /// as project names, e.g. `a -> b -> c -> a`.
    pub fn detect_cycle(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let mut color = vec![Color::White; self.nodes.len()];
        let mut stack_path: Vec<NodeId> = Vec::new();

        for start in 0..self.nodes.len() {
            if color[start] != Color::White {
                continue;
            }
            let mut frame_stack: Vec<(NodeId, usize)> = vec![(start, 0)];
            color[start] = Color::Gray;
            stack_path.push(start);

            while let Some((node, next_edge)) = frame_stack.last().copied() {
                let neighbors = &self.edges[node];
                if next_edge >= neighbors.len() {
                    color[node] = Color::Black;
                    stack_path.pop();
                    frame_stack.pop();
                    continue;
                }
                frame_stack.last_mut().unwrap().1 += 1;
                let next = neighbors[next_edge];
                match color[next] {
                    Color::White => {
                        color[next] = Color::Gray;
                        stack_path.push(next);
                        frame_stack.push((next, 0));
                    }
                    Color::Gray => {
                        let cycle_start = stack_path.iter().position(|&n| n == next).unwrap();
                        let mut names: Vec<&str> = stack_path[cycle_start..]
                            .iter()
                            .map(|&n| self.nodes[n].as_str())
                            .collect();
                        names.push(&self.nodes[next]);
                        return Err(Error::Cycle(names.join(" -> ")));
                    }
                    Color::Black => {}
                }
            }
        }
        Ok(())
    }

    /// Nodes that directly depend on `node` -- the reverse of `edges`.
    pub fn dependents_of(&self, node: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(dependent, deps)| deps.contains(&node).then_some(dependent))
            .collect()
    }

    /// Kahn's-algorithm topological layering. Layer 0 holds every node
    /// with in-degree 0; each later layer holds nodes whose in-edges all
    /// terminate in already-emitted layers. Ties within a layer keep
    /// workspace declaration order. Call only after `detect_cycle`
    /// succeeds -- a cyclic graph would otherwise silently drop nodes.
    pub fn layers(&self) -> Vec<Vec<NodeId>> {
        let mut in_degree = vec![0usize; self.nodes.len()];
        for targets in &self.edges {
            for &t in targets {
                in_degree[t] += 1;
            }
        }
        // dependents[i] = nodes that depend on i, i.e. reverse edges.
        let mut dependents: Vec<Vec<NodeId>> = vec![Vec::new(); self.nodes.len()];
        for (node, targets) in self.edges.iter().enumerate() {
            for &t in targets {
                dependents[t].push(node);
            }
        }

        let mut remaining = in_degree.clone();
        let mut ready: VecDeque<NodeId> = (0..self.nodes.len())
            .filter(|&n| in_degree[n] == 0)
            .collect();

        let mut layers = Vec::new();
        while !ready.is_empty() {
            let mut layer: Vec<NodeId> = ready.drain(..).collect();
            layer.sort_unstable();
            let mut next_ready = Vec::new();
            for &node in &layer {
                for &dependent in &dependents[node] {
                    remaining[dependent] -= 1;
                    if remaining[dependent] == 0 {
                        next_ready.push(dependent);
                    }
                }
            }
            layers.push(layer);
            ready.extend(next_ready);
        }
        layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::manifest::ProjectEntry;

    fn manifest(projects: Vec<(&str, Vec<&str>)>) -> Manifest {
        Manifest {
            name: "ws".into(),
            description: String::new(),
            build_dir: "/tmp".into(),
            output: "artifacts".into(),
            clean_previous: false,
            projects: projects
                .into_iter()
                .map(|(name, deps)| ProjectEntry {
                    name: name.to_string(),
                    depends: deps.into_iter().map(String::from).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn layers_a_diamond_dependency() {
        let m = manifest(vec![
            ("a", vec![]),
            ("b", vec!["a"]),
            ("c", vec!["a"]),
            ("d", vec!["b", "c"]),
        ]);
        let graph = Graph::from_manifest(&m);
        graph.detect_cycle().unwrap();
        let layers = graph.layers();
        assert_eq!(layers, vec![vec![0], vec![1, 2], vec![3]]);
    }

    #[test]
    fn detects_a_cycle() {
        let m = manifest(vec![("a", vec!["b"]), ("b", vec!["c"]), ("c", vec!["a"])]);
        let graph = Graph::from_manifest(&m);
        let err = graph.detect_cycle().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("a"));
        assert!(message.contains("b"));
        assert!(message.contains("c"));
    }

    #[test]
    fn elides_external_dependencies() {
        let m = manifest(vec![("a", vec!["libc-external"])]);
        let graph = Graph::from_manifest(&m);
        assert_eq!(graph.edges, vec![Vec::<NodeId>::new()]);
    }
}

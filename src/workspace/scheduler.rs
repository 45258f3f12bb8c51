//! Layer-barrier execution: every node in a topological layer runs on its
//! own thread, joined before the next layer starts, mirroring the
//! stdin/stdout/stderr thread-per-stream idiom the shell dumper already
//! uses for a child process.

use std::collections::HashMap;

use super::graph::{Graph, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOutcome {
    Success,
    Failed(String),
    Skipped,
}

/// Runs `build` for every node in `graph`, one topological layer at a
/// time. A node whose direct predecessor failed or was skipped is never
/// run and is recorded `Skipped`. Returns every node's final outcome,
/// keyed by `NodeId`.
pub fn execute<F>(graph: &Graph, build: F) -> HashMap<NodeId, NodeOutcome>
where
    F: Fn(NodeId) -> Result<(), String> + Sync,
{
    execute_with_seed(graph, HashMap::new(), build)
}

/// Same as [`execute`], but nodes already present in `seed` (e.g. ones a
/// `--from`/`--to` range excludes, treated as already-satisfied since
/// their prior artifact remains consumable) are never run and their seeded
/// outcome participates in the predecessor check for later layers.
pub fn execute_with_seed<F>(graph: &Graph, seed: HashMap<NodeId, NodeOutcome>, build: F) -> HashMap<NodeId, NodeOutcome>
where
    F: Fn(NodeId) -> Result<(), String> + Sync,
{
    let mut outcomes: HashMap<NodeId, NodeOutcome> = seed;

    for layer in graph.layers() {
        let runnable: Vec<NodeId> = layer
            .into_iter()
            .filter(|node| !outcomes.contains_key(node))
            .filter(|&node| {
                let predecessor_ok = graph.edges[node]
                    .iter()
                    .all(|p| matches!(outcomes.get(p), Some(NodeOutcome::Success)));
                if !predecessor_ok {
                    outcomes.insert(node, NodeOutcome::Skipped);
                }
                predecessor_ok
            })
            .collect();

        if runnable.is_empty() {
            continue;
        }

        let results: Vec<(NodeId, NodeOutcome)> = std::thread::scope(|scope| {
            let handles: Vec<_> = runnable
                .iter()
                .map(|&node| {
                    let build = &build;
                    scope.spawn(move || {
                        log::info!("starting build for workspace node {node}");
                        let outcome = match build(node) {
                            Ok(()) => NodeOutcome::Success,
                            Err(message) => {
                                log::error!("node {node} failed: {message}");
                                NodeOutcome::Failed(message)
                            }
                        };
                        (node, outcome)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("worker thread panicked"))
                .collect()
        });

        for (node, outcome) in results {
            outcomes.insert(node, outcome);
        }
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::manifest::{Manifest, ProjectEntry};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

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
    fn cascades_failure_as_skipped() {
        let m = manifest(vec![("a", vec![]), ("b", vec!["a"]), ("c", vec!["b"])]);
        let graph = Graph::from_manifest(&m);
        let outcomes = execute(&graph, |node| {
            if node == 0 {
                Err("boom".to_string())
            } else {
                Ok(())
            }
        });
        assert_eq!(outcomes[&0], NodeOutcome::Failed("boom".to_string()));
        assert_eq!(outcomes[&1], NodeOutcome::Skipped);
        assert_eq!(outcomes[&2], NodeOutcome::Skipped);
    }

    #[test]
    fn independent_subtrees_still_run() {
        let m = manifest(vec![("a", vec![]), ("b", vec![]), ("c", vec!["a"])]);
        let graph = Graph::from_manifest(&m);
        let calls = AtomicUsize::new(0);
        let seen: Mutex<Vec<NodeId>> = Mutex::new(Vec::new());
        let outcomes = execute(&graph, |node| {
            calls.fetch_add(1, Ordering::SeqCst);
            seen.lock().unwrap().push(node);
            if node == 0 {
                Err("boom".to_string())
            } else {
                Ok(())
            }
        });
        assert_eq!(outcomes[&1], NodeOutcome::Success);
        assert_eq!(outcomes[&2], NodeOutcome::Skipped);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

//! End-to-end workspace loading: manifest parsing, cycle detection
//! reporting the full cycle path, and topological layering, exercised
//! through `Workspace::load` against a real `yap.json` on disk rather
//! than constructing a `Graph` directly.

use std::fs;

fn write_manifest(dir: &std::path::Path, json: &str) {
    fs::write(dir.join("yap.json"), json).unwrap();
}

#[test]
fn loads_and_layers_a_diamond_workspace() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(
        dir.path(),
        r#"{
            "name": "demo",
            "projects": [
                { "name": "base", "depends": [] },
                { "name": "left", "depends": ["base"] },
                { "name": "right", "depends": ["base"] },
                { "name": "top", "depends": ["left", "right"] }
            ]
        }"#,
    );

    let workspace = yap::Workspace::load(dir.path()).unwrap();
    let order = workspace.topological_order();
    let names: Vec<&str> = order.iter().map(|&n| workspace.graph.nodes[n].as_str()).collect();

    assert_eq!(names[0], "base");
    assert_eq!(names[3], "top");
    assert!(names[1..3].contains(&"left"));
    assert!(names[1..3].contains(&"right"));
}

#[test]
fn rejects_a_cyclic_workspace_before_any_build_starts() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(
        dir.path(),
        r#"{
            "name": "demo",
            "projects": [
                { "name": "a", "depends": ["b"] },
                { "name": "b", "depends": ["a"] }
            ]
        }"#,
    );

    let err = yap::Workspace::load(dir.path()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains('a'));
    assert!(message.contains('b'));
}

#[test]
fn external_runtime_dependency_is_elided_from_the_graph() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(
        dir.path(),
        r#"{
            "name": "demo",
            "projects": [
                { "name": "app", "depends": ["glibc"] }
            ]
        }"#,
    );

    let workspace = yap::Workspace::load(dir.path()).unwrap();
    assert_eq!(workspace.graph.edges, vec![Vec::<usize>::new()]);
}

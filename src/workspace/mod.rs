//! The workspace driver: loads `yap.json`, builds the dependency graph,
//! and runs each project's recipe through source acquisition, the
//! build/package scripts, and its format emitter, one topological layer
//! at a time.

pub mod error;
pub mod graph;
pub mod manifest;
pub mod scheduler;

pub use error::{Error, Result};
pub use manifest::Manifest;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::constants::{canonicalize_architecture, package_manager_for_distro};
use crate::recipe::{BuildPaths, Recipe, RecipeParser, Selector};
use crate::shell::Runner;

/// Guards every call into the host package manager. `Update`,
/// `PrepareEnvironment`, `Prepare`, and `Install` all mutate the same
/// system package database, which is not safe for concurrent access, so
/// every node's call to one of them -- even across different topological
/// layers running on different threads -- is serialized through this
/// lock rather than relying on the layer barrier alone.
static EMITTER_LOCK: Mutex<()> = Mutex::new(());

use graph::{Graph, NodeId};
use scheduler::{execute_with_seed, NodeOutcome};

/// CLI-level knobs that shape a build run, independent of any one
/// project's recipe.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub distro: String,
    pub codename: String,
    pub clean_build: bool,
    pub skip_sync: bool,
    pub no_build: bool,
    pub no_make_deps: bool,
    pub from: Option<String>,
    pub to: Option<String>,
    pub ssh_passphrase: Option<String>,
    pub pkgver_override: Option<String>,
    pub pkgrel_override: Option<String>,
    pub install_successors: bool,
}

pub struct Workspace {
    pub root: PathBuf,
    pub manifest: Manifest,
    pub graph: Graph,
}

impl Workspace {
    pub fn load(root: &Path) -> Result<Self> {
        let manifest = Manifest::load(&root.join("yap.json"))?;
        let graph = Graph::from_manifest(&manifest);
        graph.detect_cycle()?;
        Ok(Self { root: root.to_path_buf(), manifest, graph })
    }

    /// The project names in one topological-layer execution order,
    /// flattened; used to resolve `--from`/`--to` into a node range.
    pub fn topological_order(&self) -> Vec<NodeId> {
        self.graph.layers().into_iter().flatten().collect()
    }

    fn range(&self, options: &BuildOptions) -> std::collections::HashSet<NodeId> {
        let order = self.topological_order();
        let from_index = options
            .from
            .as_ref()
            .and_then(|name| order.iter().position(|&n| self.graph.nodes[n] == *name))
            .unwrap_or(0);
        let to_index = options
            .to
            .as_ref()
            .and_then(|name| order.iter().position(|&n| self.graph.nodes[n] == *name))
            .unwrap_or(order.len().saturating_sub(1));
        order[from_index..=to_index.max(from_index)].iter().copied().collect()
    }

    /// Runs the full lifecycle for every in-range project, respecting
    /// dependency order and cascading failures as "skipped".
    pub fn build_all(&self, artifacts_root: &Path, options: &BuildOptions) -> Result<HashMap<String, NodeOutcome>> {
        let in_range = self.range(options);
        let mut seed: HashMap<NodeId, NodeOutcome> = HashMap::new();
        for node in 0..self.graph.nodes.len() {
            if !in_range.contains(&node) {
                seed.insert(node, NodeOutcome::Success);
            }
        }

        let build_dir = PathBuf::from(&self.manifest.build_dir);
        let output_dir = artifacts_root.join(&self.manifest.output).join(&options.distro);
        std::fs::create_dir_all(&output_dir)?;

        let build_fn = |node: NodeId| -> std::result::Result<(), String> {
            self.build_node(node, &build_dir, &output_dir, options)
                .map_err(|e| e.to_string())
        };

        let outcomes = execute_with_seed(&self.graph, seed, build_fn);
        Ok(outcomes.into_iter().map(|(id, outcome)| (self.graph.nodes[id].clone(), outcome)).collect())
    }

    fn build_node(&self, node: NodeId, build_dir: &Path, output_dir: &Path, options: &BuildOptions) -> Result<()> {
        let name = &self.graph.nodes[node];
        let project_dir = self.root.join(name);
        let pkgbuild_path = project_dir.join("PKGBUILD");

        let packager = package_manager_for_distro(&options.distro)
            .ok_or_else(|| Error::UnknownDistro(options.distro.clone()))?;
        let arch = canonicalize_architecture(std::env::consts::ARCH).unwrap_or("x86_64").to_string();
        let selector = Selector::new(arch.clone(), packager, options.distro.clone(), options.codename.clone());

        let node_build_dir = build_dir.join(name);
        if options.clean_build && node_build_dir.exists() {
            std::fs::remove_dir_all(&node_build_dir)?;
        }
        let source_dir = node_build_dir.join("src");
        let package_dir = node_build_dir.join("pkg");
        std::fs::create_dir_all(&source_dir)?;
        std::fs::create_dir_all(&package_dir)?;

        let paths = BuildPaths {
            start_dir: project_dir.clone(),
            home: self.root.clone(),
            source_dir: source_dir.clone(),
            package_dir: package_dir.clone(),
            pkg_dest: output_dir.to_path_buf(),
            yap_version: env!("CARGO_PKG_VERSION").to_string(),
        };

        let parser = RecipeParser::new()?;
        let mut recipe = parser.parse_one(&pkgbuild_path, &selector, paths)?;
        if let Some(pkgver) = &options.pkgver_override {
            recipe.pkg_ver = pkgver.clone();
        }
        if let Some(pkgrel) = &options.pkgrel_override {
            recipe.pkg_rel = pkgrel.clone();
        }

        crate::source::fetch_all(
            &recipe.source,
            &recipe.hash_sums,
            &recipe.start_dir,
            &recipe.source_dir,
            &recipe.home,
            options.ssh_passphrase.as_deref(),
        )?;

        if !options.no_build {
            self.run_lifecycle_scripts(&pkgbuild_path, &recipe)?;
        }

        let emitter = crate::pack::dispatch(recipe.pkg_type);
        {
            let _guard = EMITTER_LOCK.lock().unwrap();
            if !options.skip_sync {
                emitter.update()?;
            }
            emitter.prepare_environment()?;
            if !options.no_make_deps {
                emitter.prepare(&recipe.make_depends)?;
            }
        }
        emitter.prepare_fakeroot(&mut recipe, output_dir)?;
        let artifact = emitter.build_package(&recipe, output_dir)?;
        log::info!("wrote artifact {}", artifact.display());

        if options.install_successors && !self.graph.dependents_of(node).is_empty() {
            let _guard = EMITTER_LOCK.lock().unwrap();
            if let Err(e) = emitter.install(&artifact) {
                log::warn!("post-build install of {} failed: {e}", artifact.display());
            }
        }
        Ok(())
    }

    fn run_lifecycle_scripts(&self, pkgbuild_path: &Path, recipe: &Recipe) -> Result<()> {
        let runner = Runner::new()?;
        let scope = recipe.to_scope();
        let env: Vec<(String, String)> = vec![
            ("srcdir".to_string(), recipe.source_dir.to_string_lossy().into_owned()),
            ("pkgdir".to_string(), recipe.package_dir.to_string_lossy().into_owned()),
            ("startdir".to_string(), recipe.start_dir.to_string_lossy().into_owned()),
            ("pkgname".to_string(), recipe.pkg_name.clone()),
            ("pkgver".to_string(), recipe.pkg_ver.clone()),
            ("pkgrel".to_string(), recipe.pkg_rel.clone()),
        ];
        if let Some(body) = &recipe.build {
            runner.run_function(pkgbuild_path, body, &scope, env.clone())?;
        }
        if let Some(body) = &recipe.package {
            runner.run_function(pkgbuild_path, body, &scope, env)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manifest::ProjectEntry;

    fn manifest(projects: Vec<(&str, Vec<&str>)>) -> Manifest {
        Manifest {
            name: "ws".into(),
            description: String::new(),
            build_dir: "/tmp".into(),
            output: "artifacts".into(),
            clean_previous: false,
            projects: projects
                .into_iter()
                .map(|(name, deps)| ProjectEntry { name: name.to_string(), depends: deps.into_iter().map(String::from).collect() })
                .collect(),
        }
    }

    #[test]
    fn range_defaults_to_full_topological_order() {
        let m = manifest(vec![("a", vec![]), ("b", vec!["a"])]);
        let graph = Graph::from_manifest(&m);
        let workspace = Workspace { root: "/tmp/ws".into(), manifest: m, graph };
        let options = BuildOptions::default();
        let range = workspace.range(&options);
        assert_eq!(range.len(), 2);
    }

    #[test]
    fn range_restricts_to_from_to_names() {
        let m = manifest(vec![("a", vec![]), ("b", vec!["a"]), ("c", vec!["b"])]);
        let graph = Graph::from_manifest(&m);
        let workspace = Workspace { root: "/tmp/ws".into(), manifest: m, graph };
        let options = BuildOptions { from: Some("b".into()), to: Some("b".into()), ..Default::default() };
        let range = workspace.range(&options);
        assert_eq!(range, std::collections::HashSet::from([1]));
    }
}

//! The parsed-and-resolved PKGBUILD: the Recipe model, directive
//! resolution, dependency/version types, and the two-pass parser that
//! turns a recipe file plus a selector tuple into a `Recipe`.

pub mod dependency;
pub mod directive;
pub mod error;
mod parser;

use std::path::PathBuf;

pub use dependency::{Dependency, DependencyOrder, OrderedVersion, Provide, UnorderedVersion};
pub use directive::Selector;
pub use error::{Error, Result};
pub use parser::RecipeParser;

use crate::constants::PackageManager;
use crate::shell::{Scope, Value};

/// The in-memory, fully resolved Recipe -- the Rust rendition of a
/// PKGBUILD after directive resolution has picked one value per field for
/// the current build selector.
#[derive(Debug, Clone, Default)]
pub struct Recipe {
    pub pkg_name: String,
    pub pkg_ver: String,
    pub pkg_rel: String,
    pub pkg_desc: String,
    pub url: String,
    pub maintainer: String,
    pub section: String,
    pub priority: String,
    pub epoch: String,

    pub arch: Vec<String>,
    pub license: Vec<String>,
    pub copyright: Vec<String>,
    pub source: Vec<String>,
    pub depends: Vec<String>,
    pub make_depends: Vec<String>,
    pub opt_depends: Vec<String>,
    pub provides: Vec<String>,
    pub conflicts: Vec<String>,
    pub replaces: Vec<String>,
    pub backup: Vec<String>,
    pub hash_sums: Vec<String>,

    pub build: Option<String>,
    pub package: Option<String>,
    pub pre_inst: Option<String>,
    pub post_inst: Option<String>,
    pub pre_rm: Option<String>,
    pub post_rm: Option<String>,
    pub pre_trans: Option<String>,
    pub post_trans: Option<String>,

    pub start_dir: PathBuf,
    pub home: PathBuf,
    pub source_dir: PathBuf,
    pub package_dir: PathBuf,
    pub pkg_dest: PathBuf,

    pub arch_computed: String,
    pub installed_size: u64,
    pub build_date: i64,
    pub checksum: String,
    pub pkg_type: PackageManager,
    pub yap_version: String,

    pub strip_enabled: bool,
    pub clean_build: bool,

    pub distro: String,
    pub codename: String,
}

impl Default for PackageManager {
    fn default() -> Self {
        PackageManager::Pacman
    }
}

/// The build-workspace roots the PKGBUILD itself never declares -- these
/// come from the workspace driver, not from directive resolution.
#[derive(Debug, Clone)]
pub struct BuildPaths {
    pub start_dir: PathBuf,
    pub home: PathBuf,
    pub source_dir: PathBuf,
    pub package_dir: PathBuf,
    pub pkg_dest: PathBuf,
    pub yap_version: String,
}

impl Recipe {
    pub fn parsed_dependencies(&self) -> Result<Vec<Dependency>> {
        self.depends.iter().map(|s| Dependency::try_from(s.as_str())).collect()
    }

    pub fn parsed_provides(&self) -> Result<Vec<Provide>> {
        self.provides.iter().map(|s| Provide::try_from(s.as_str())).collect()
    }

    /// Builds the substitution scope a `build()`/`package()` body is
    /// expanded against before it runs: the resolved scalar/array fields
    /// under their PKGBUILD names, plus the build-workspace roots the
    /// PKGBUILD itself never declares.
    pub fn to_scope(&self) -> Scope {
        let mut scope = Scope::new();
        scope.set("pkgname", Value::Scalar(self.pkg_name.clone()));
        scope.set("pkgver", Value::Scalar(self.pkg_ver.clone()));
        scope.set("pkgrel", Value::Scalar(self.pkg_rel.clone()));
        scope.set("pkgdesc", Value::Scalar(self.pkg_desc.clone()));
        scope.set("url", Value::Scalar(self.url.clone()));
        scope.set("epoch", Value::Scalar(self.epoch.clone()));
        scope.set("arch", Value::Array(self.arch.clone()));
        scope.set("license", Value::Array(self.license.clone()));
        scope.set("source", Value::Array(self.source.clone()));
        scope.set("depends", Value::Array(self.depends.clone()));
        scope.set("makedepends", Value::Array(self.make_depends.clone()));
        scope.set("optdepends", Value::Array(self.opt_depends.clone()));
        scope.set("provides", Value::Array(self.provides.clone()));
        scope.set("conflicts", Value::Array(self.conflicts.clone()));
        scope.set("replaces", Value::Array(self.replaces.clone()));
        scope.set("backup", Value::Array(self.backup.clone()));
        scope.set("pkgdir", Value::Scalar(self.package_dir.to_string_lossy().into_owned()));
        scope.set("srcdir", Value::Scalar(self.source_dir.to_string_lossy().into_owned()));
        scope.set("startdir", Value::Scalar(self.start_dir.to_string_lossy().into_owned()));
        scope
    }

    /// Renders the resolved recipe back to `.SRCINFO`-style `key = value`
    /// text, mirroring how a real PKGBUILD's generated SRCINFO looks.
    /// Used by the `graph` CLI command and by parse-then-stringify tests.
    pub fn to_srcinfo(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("pkgbase = {}\n", self.pkg_name));
        out.push_str(&format!("\tpkgdesc = {}\n", self.pkg_desc));
        out.push_str(&format!("\tpkgver = {}\n", self.pkg_ver));
        out.push_str(&format!("\tpkgrel = {}\n", self.pkg_rel));
        if !self.epoch.is_empty() {
            out.push_str(&format!("\tepoch = {}\n", self.epoch));
        }
        out.push_str(&format!("\turl = {}\n", self.url));
        for arch in &self.arch {
            out.push_str(&format!("\tarch = {arch}\n"));
        }
        for license in &self.license {
            out.push_str(&format!("\tlicense = {license}\n"));
        }
        for dep in &self.depends {
            out.push_str(&format!("\tdepends = {dep}\n"));
        }
        for dep in &self.make_depends {
            out.push_str(&format!("\tmakedepends = {dep}\n"));
        }
        for (source, hash) in self.source.iter().zip(self.hash_sums.iter()) {
            out.push_str(&format!("\tsource = {source}\n"));
            out.push_str(&format!("\tsha256sums = {hash}\n"));
        }
        out.push_str(&format!("\npkgname = {}\n", self.pkg_name));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srcinfo_round_trip_carries_core_fields() {
        let recipe = Recipe {
            pkg_name: "foo".into(),
            pkg_ver: "1.0".into(),
            pkg_rel: "1".into(),
            pkg_desc: "a package".into(),
            arch: vec!["x86_64".into()],
            depends: vec!["glibc".into()],
            ..Default::default()
        };
        let rendered = recipe.to_srcinfo();
        assert!(rendered.contains("pkgver = 1.0"));
        assert!(rendered.contains("depends = glibc"));
        assert!(rendered.contains("arch = x86_64"));
    }
}

use std::path::{Path, PathBuf};

use crate::shell::{Dumper, PkgbuildDump, Value};

use super::error::{Error, Result};
use super::{BuildPaths, Recipe, Selector};

/// Drives a [`Dumper`] and turns its output into resolved [`Recipe`]s.
pub struct RecipeParser {
    dumper: Dumper,
}

impl RecipeParser {
    pub fn new() -> Result<Self> {
        Ok(Self { dumper: Dumper::new().map_err(|e| Error::Dump(PathBuf::new(), e))? })
    }

    pub fn with_dumper(dumper: Dumper) -> Self {
        Self { dumper }
    }

    pub fn parse_one(&self, path: &Path, selector: &Selector, paths: BuildPaths) -> Result<Recipe> {
        let dump = self
            .dumper
            .dump_one(Some(path))
            .map_err(|e| Error::Dump(path.to_path_buf(), e))?;
        resolve(&dump, selector, paths)
    }
}

fn scalar(dump: &PkgbuildDump, field: &str, selector: &Selector) -> Option<String> {
    match super::directive::resolve(dump, field, selector) {
        Some(Value::Scalar(s)) => Some(s.clone()),
        Some(Value::Array(items)) => items.first().cloned(),
        None => None,
    }
}

fn array(dump: &PkgbuildDump, field: &str, selector: &Selector) -> Vec<String> {
    match super::directive::resolve(dump, field, selector) {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Scalar(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn function(dump: &PkgbuildDump, field: &str, selector: &Selector) -> Option<String> {
    super::directive::resolve_function(dump, field, selector).map(str::to_string)
}

/// Pass 2: resolves every Recipe field from the pass-1 dump, validating
/// the invariants the parser contract requires.
fn resolve(dump: &PkgbuildDump, selector: &Selector, paths: BuildPaths) -> Result<Recipe> {
    let pkg_name = scalar(dump, "pkgname", selector).filter(|s| !s.is_empty()).ok_or(Error::MissingField("pkgname"))?;
    let pkg_ver = scalar(dump, "pkgver", selector).filter(|s| !s.is_empty()).ok_or(Error::MissingField("pkgver"))?;
    let pkg_rel = scalar(dump, "pkgrel", selector).filter(|s| !s.is_empty()).ok_or(Error::MissingField("pkgrel"))?;
    if !pkg_rel.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::NonDecimalPkgRel(pkg_rel));
    }

    let source = array(dump, "source", selector);
    let hash_sums = array(dump, "cksums", selector)
        .into_iter()
        .chain(array(dump, "md5sums", selector))
        .chain(array(dump, "sha1sums", selector))
        .chain(array(dump, "sha224sums", selector))
        .chain(array(dump, "sha256sums", selector))
        .chain(array(dump, "sha384sums", selector))
        .chain(array(dump, "sha512sums", selector))
        .chain(array(dump, "b2sums", selector))
        .collect::<Vec<_>>();
    // Real PKGBUILDs declare exactly one *sums family; if none at all were
    // declared but sources were, that's only an error when sources exist.
    if !source.is_empty() && hash_sums.is_empty() {
        return Err(Error::SourceHashCountMismatch { sources: source.len(), hashes: 0 });
    }
    if !hash_sums.is_empty() && hash_sums.len() != source.len() {
        return Err(Error::SourceHashCountMismatch { sources: source.len(), hashes: hash_sums.len() });
    }

    Ok(Recipe {
        pkg_name,
        pkg_ver,
        pkg_rel,
        pkg_desc: scalar(dump, "pkgdesc", selector).unwrap_or_default(),
        url: scalar(dump, "url", selector).unwrap_or_default(),
        maintainer: scalar(dump, "maintainer", selector).unwrap_or_default(),
        section: scalar(dump, "section", selector).unwrap_or_default(),
        priority: scalar(dump, "priority", selector).unwrap_or_default(),
        epoch: scalar(dump, "epoch", selector).unwrap_or_default(),

        arch: array(dump, "arch", selector),
        license: array(dump, "license", selector),
        copyright: array(dump, "copyright", selector),
        source,
        depends: array(dump, "depends", selector),
        make_depends: array(dump, "makedepends", selector),
        opt_depends: array(dump, "optdepends", selector),
        provides: array(dump, "provides", selector),
        conflicts: array(dump, "conflicts", selector),
        replaces: array(dump, "replaces", selector),
        backup: array(dump, "backup", selector),
        hash_sums,

        build: function(dump, "build", selector),
        package: function(dump, "package", selector),
        pre_inst: function(dump, "preinst", selector),
        post_inst: function(dump, "postinst", selector),
        pre_rm: function(dump, "prerm", selector),
        post_rm: function(dump, "postrm", selector),
        pre_trans: function(dump, "pretrans", selector),
        post_trans: function(dump, "posttrans", selector),

        start_dir: paths.start_dir,
        home: paths.home,
        source_dir: paths.source_dir,
        package_dir: paths.package_dir,
        pkg_dest: paths.pkg_dest,

        arch_computed: selector.arch.clone(),
        installed_size: 0,
        build_date: 0,
        checksum: String::new(),
        pkg_type: selector.packager,
        yap_version: paths.yap_version,

        strip_enabled: true,
        clean_build: false,

        distro: selector.distro.clone(),
        codename: selector.codename.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PackageManager;
    use crate::shell::PkgbuildDump;

    fn dump_with(vars: Vec<(&str, Value)>) -> PkgbuildDump {
        PkgbuildDump {
            vars: vars.into_iter().map(|(n, v)| (n.to_string(), v)).collect(),
            functions: Vec::new(),
        }
    }

    fn test_paths() -> BuildPaths {
        BuildPaths {
            start_dir: "/tmp/start".into(),
            home: "/root".into(),
            source_dir: "/tmp/src".into(),
            package_dir: "/tmp/pkg".into(),
            pkg_dest: "/tmp/dest".into(),
            yap_version: "0.1.0".into(),
        }
    }

    fn sel() -> Selector {
        Selector::new("x86_64", PackageManager::Pacman, "arch", "")
    }

    #[test]
    fn rejects_missing_pkgname() {
        let dump = dump_with(vec![("pkgver", Value::Scalar("1.0".into()))]);
        assert!(matches!(resolve(&dump, &sel(), test_paths()), Err(Error::MissingField("pkgname"))));
    }

    #[test]
    fn rejects_non_decimal_pkgrel() {
        let dump = dump_with(vec![
            ("pkgname", Value::Scalar("foo".into())),
            ("pkgver", Value::Scalar("1.0".into())),
            ("pkgrel", Value::Scalar("1a".into())),
        ]);
        assert!(matches!(resolve(&dump, &sel(), test_paths()), Err(Error::NonDecimalPkgRel(_))));
    }

    #[test]
    fn rejects_source_hash_count_mismatch() {
        let dump = dump_with(vec![
            ("pkgname", Value::Scalar("foo".into())),
            ("pkgver", Value::Scalar("1.0".into())),
            ("pkgrel", Value::Scalar("1".into())),
            ("source", Value::Array(vec!["a.tar.gz".into(), "b.tar.gz".into()])),
            ("sha256sums", Value::Array(vec!["SKIP".into()])),
        ]);
        assert!(matches!(
            resolve(&dump, &sel(), test_paths()),
            Err(Error::SourceHashCountMismatch { sources: 2, hashes: 1 })
        ));
    }

    #[test]
    fn resolves_a_minimal_recipe() {
        let dump = dump_with(vec![
            ("pkgname", Value::Scalar("foo".into())),
            ("pkgver", Value::Scalar("1.0".into())),
            ("pkgrel", Value::Scalar("1".into())),
            ("arch", Value::Array(vec!["x86_64".into()])),
            ("depends", Value::Array(vec!["glibc".into()])),
        ]);
        let recipe = resolve(&dump, &sel(), test_paths()).unwrap();
        assert_eq!(recipe.pkg_name, "foo");
        assert_eq!(recipe.depends, vec!["glibc".to_string()]);
        assert_eq!(recipe.arch_computed, "x86_64");
    }
}

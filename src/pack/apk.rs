//! Alpine `.apk` emitter: a gzip tar of PackageDir plus a `.PKGINFO`
//! side file, install hooks, and an `abuild`-compatible APKBUILD spec.

use std::path::{Path, PathBuf};

use crate::archive::{build_tar, Compression};
use crate::constants::{apk_architecture, implicit_build_dependencies, PackageManager};
use crate::fswalk::walk;
use crate::recipe::Recipe;

use super::error::Result;
use super::{build_date_now, installed_size, run_host_command, Emitter};

pub struct ApkEmitter;

fn pkginfo_text(recipe: &Recipe) -> String {
    let mut out = String::new();
    out.push_str(&format!("pkgname = {}\n", recipe.pkg_name));
    out.push_str(&format!("pkgver = {}-r{}\n", recipe.pkg_ver, recipe.pkg_rel));
    out.push_str(&format!("pkgdesc = {}\n", recipe.pkg_desc));
    out.push_str(&format!("url = {}\n", recipe.url));
    out.push_str(&format!("builddate = {}\n", recipe.build_date));
    out.push_str(&format!("size = {}\n", recipe.installed_size));
    out.push_str(&format!("arch = {}\n", recipe.arch_computed));
    for license in &recipe.license {
        out.push_str(&format!("license = {license}\n"));
    }
    for depend in &recipe.depends {
        out.push_str(&format!("depend = {depend}\n"));
    }
    for provide in &recipe.provides {
        out.push_str(&format!("provides = {provide}\n"));
    }
    out
}

fn apkbuild_text(recipe: &Recipe) -> String {
    format!(
        "pkgname={}\npkgver={}\npkgrel={}\npkgdesc=\"{}\"\nurl=\"{}\"\narch=\"{}\"\nlicense=\"{}\"\n",
        recipe.pkg_name,
        recipe.pkg_ver,
        recipe.pkg_rel,
        recipe.pkg_desc,
        recipe.url,
        recipe.arch_computed,
        recipe.license.join(" "),
    )
}

fn write_hook(package_dir: &Path, name: &str, body: &Option<String>) -> Result<()> {
    if let Some(body) = body {
        let path = package_dir.join(name);
        std::fs::write(&path, body)?;
        let mut perms = std::fs::metadata(&path)?.permissions();
        std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
        std::fs::set_permissions(&path, perms)?;
    }
    Ok(())
}

impl ApkEmitter {
    pub fn filename(recipe: &Recipe) -> String {
        format!(
            "{}-{}-r{}.{}.apk",
            recipe.pkg_name,
            recipe.pkg_ver,
            recipe.pkg_rel,
            recipe.arch_computed
        )
    }
}

impl Emitter for ApkEmitter {
    fn update(&self) -> Result<()> {
        run_host_command("apk", &["update"])
    }

    fn prepare_environment(&self) -> Result<()> {
        let mut args = vec!["add"];
        args.extend(implicit_build_dependencies(PackageManager::Apk));
        run_host_command("apk", &args)
    }

    fn prepare(&self, make_depends: &[String]) -> Result<()> {
        if make_depends.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add"];
        args.extend(make_depends.iter().map(String::as_str));
        run_host_command("apk", &args)
    }

    fn prepare_fakeroot(&self, recipe: &mut Recipe, _artifacts_path: &Path) -> Result<()> {
        let entries = walk(&recipe.package_dir, &recipe.backup).map_err(|e| super::Error::Message(e.to_string()))?;
        recipe.installed_size = installed_size(&entries);
        recipe.build_date = build_date_now();
        recipe.arch_computed = apk_architecture(&recipe.arch_computed).to_string();

        write_hook(&recipe.package_dir, ".pre-install", &recipe.pre_inst)?;
        write_hook(&recipe.package_dir, ".post-install", &recipe.post_inst)?;
        write_hook(&recipe.package_dir, ".pre-deinstall", &recipe.pre_rm)?;
        write_hook(&recipe.package_dir, ".post-deinstall", &recipe.post_rm)?;

        std::fs::write(recipe.package_dir.join(".PKGINFO"), pkginfo_text(recipe))?;
        std::fs::write(recipe.package_dir.join("APKBUILD"), apkbuild_text(recipe))?;
        Ok(())
    }

    fn build_package(&self, recipe: &Recipe, artifacts_path: &Path) -> Result<PathBuf> {
        let bytes = build_tar(&recipe.package_dir, Compression::Gzip)?;
        let dest = artifacts_path.join(Self::filename(recipe));
        crate::archive::write_file(&dest, &bytes)?;
        Ok(dest)
    }

    fn install(&self, artifact: &Path) -> Result<()> {
        run_host_command("apk", &["add", "--allow-untrusted", &artifact.to_string_lossy()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> Recipe {
        Recipe {
            pkg_name: "foo".into(),
            pkg_ver: "1.0".into(),
            pkg_rel: "2".into(),
            arch_computed: "x86_64".into(),
            ..Default::default()
        }
    }

    #[test]
    fn builds_expected_filename() {
        assert_eq!(ApkEmitter::filename(&recipe()), "foo-1.0-r2.x86_64.apk");
    }

    #[test]
    fn pkginfo_contains_core_fields() {
        let text = pkginfo_text(&recipe());
        assert!(text.contains("pkgname = foo"));
        assert!(text.contains("pkgver = 1.0-r2"));
    }
}

//! Pacman-archive emitter: `.PKGINFO`, `.BUILDINFO`, a gzipped `.MTREE`
//! manifest, and an optional install hook, tarred with zstd.

use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::archive::{build_tar, Compression};
use crate::constants::{implicit_build_dependencies, pacman_architecture, PackageManager};
use crate::fswalk::{walk, ContentKind, FileContent};
use crate::recipe::Recipe;

use super::error::Result;
use super::{build_date_now, installed_size, run_host_command, Emitter};

pub struct PacmanEmitter;

fn pkginfo_text(recipe: &Recipe) -> String {
    let mut out = String::new();
    out.push_str(&format!("pkgname = {}\n", recipe.pkg_name));
    out.push_str(&format!("pkgver = {}-{}\n", recipe.pkg_ver, recipe.pkg_rel));
    out.push_str(&format!("pkgdesc = {}\n", recipe.pkg_desc));
    out.push_str(&format!("url = {}\n", recipe.url));
    out.push_str(&format!("builddate = {}\n", recipe.build_date));
    out.push_str(&format!("size = {}\n", recipe.installed_size));
    out.push_str(&format!("arch = {}\n", recipe.arch_computed));
    for license in &recipe.license {
        out.push_str(&format!("license = {license}\n"));
    }
    for dep in &recipe.depends {
        out.push_str(&format!("depend = {dep}\n"));
    }
    for dep in &recipe.make_depends {
        out.push_str(&format!("makedepend = {dep}\n"));
    }
    for provide in &recipe.provides {
        out.push_str(&format!("provides = {provide}\n"));
    }
    for conflict in &recipe.conflicts {
        out.push_str(&format!("conflict = {conflict}\n"));
    }
    for backup in &recipe.backup {
        out.push_str(&format!("backup = {backup}\n"));
    }
    out
}

fn buildinfo_text(recipe: &Recipe) -> String {
    format!(
        "format = 2\npkgname = {}\npkgver = {}-{}\npkgarch = {}\nbuilddate = {}\nbuildtool = yap\nbuildtoolver = {}\n",
        recipe.pkg_name, recipe.pkg_ver, recipe.pkg_rel, recipe.arch_computed, recipe.build_date, recipe.yap_version,
    )
}

fn mtree_text(entries: &[FileContent]) -> String {
    let mut out = String::from("#mtree\n");
    for entry in entries {
        let basename = entry.path.rsplit('/').next().unwrap_or(&entry.path);
        if basename.starts_with('.') {
            continue;
        }
        match entry.kind {
            ContentKind::Directory => {
                out.push_str(&format!("./{} type=dir mode=0{:o}\n", entry.path.trim_start_matches('/'), entry.mode & 0o7777));
            }
            ContentKind::Symlink => {
                out.push_str(&format!(
                    "./{} type=link link={} mode=0{:o}\n",
                    entry.path.trim_start_matches('/'),
                    entry.symlink_target.as_deref().unwrap_or(""),
                    entry.mode & 0o7777
                ));
            }
            ContentKind::File | ContentKind::ConfigNoReplace => {
                out.push_str(&format!(
                    "./{} type=file mode=0{:o} size={} time={} sha256digest={}\n",
                    entry.path.trim_start_matches('/'),
                    entry.mode & 0o7777,
                    entry.size,
                    entry.mtime,
                    entry.sha256.as_deref().unwrap_or("")
                ));
            }
        }
    }
    out
}

fn gzip_bytes(text: &str) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(text.as_bytes())?;
    Ok(encoder.finish()?)
}

/// Renders the `<pkgname>.install` side file pacman runs its own
/// lifecycle functions out of, or `None` when the recipe declares no
/// hooks at all (no file is written in that case).
fn install_hook_text(recipe: &Recipe) -> Option<String> {
    let hooks: [(&str, &Option<String>); 6] = [
        ("pre_install", &recipe.pre_inst),
        ("post_install", &recipe.post_inst),
        ("pre_upgrade", &recipe.pre_trans),
        ("post_upgrade", &recipe.post_trans),
        ("pre_remove", &recipe.pre_rm),
        ("post_remove", &recipe.post_rm),
    ];
    if hooks.iter().all(|(_, body)| body.is_none()) {
        return None;
    }
    let mut out = String::new();
    for (name, body) in hooks {
        if let Some(body) = body {
            out.push_str(&format!("{name}() {{\n{body}\n}}\n\n"));
        }
    }
    Some(out)
}

impl PacmanEmitter {
    pub fn filename(recipe: &Recipe) -> String {
        let version = if recipe.epoch.is_empty() {
            format!("{}-{}", recipe.pkg_ver, recipe.pkg_rel)
        } else {
            format!("{}:{}-{}", recipe.epoch, recipe.pkg_ver, recipe.pkg_rel)
        };
        format!("{}-{}-{}.pkg.tar.zst", recipe.pkg_name, version, recipe.arch_computed)
    }
}

impl Emitter for PacmanEmitter {
    fn update(&self) -> Result<()> {
        run_host_command("pacman", &["-Sy", "--noconfirm"])
    }

    fn prepare_environment(&self) -> Result<()> {
        let mut args = vec!["-S", "--noconfirm"];
        args.extend(implicit_build_dependencies(PackageManager::Pacman));
        run_host_command("pacman", &args)
    }

    fn prepare(&self, make_depends: &[String]) -> Result<()> {
        if make_depends.is_empty() {
            return Ok(());
        }
        let mut args = vec!["-S", "--noconfirm"];
        args.extend(make_depends.iter().map(String::as_str));
        run_host_command("pacman", &args)
    }

    fn prepare_fakeroot(&self, recipe: &mut Recipe, _artifacts_path: &Path) -> Result<()> {
        let entries = walk(&recipe.package_dir, &recipe.backup).map_err(|e| super::Error::Message(e.to_string()))?;
        recipe.installed_size = installed_size(&entries);
        recipe.build_date = build_date_now();
        recipe.arch_computed = pacman_architecture(&recipe.arch_computed).to_string();

        let pkgbuild_path = recipe.start_dir.join("PKGBUILD");
        if let Ok(text) = std::fs::read(&pkgbuild_path) {
            recipe.checksum = hex::encode(Sha256::digest(&text));
        }

        std::fs::write(recipe.package_dir.join(".PKGINFO"), pkginfo_text(recipe))?;
        std::fs::write(recipe.package_dir.join(".BUILDINFO"), buildinfo_text(recipe))?;
        let mtree_gz = gzip_bytes(&mtree_text(&entries))?;
        std::fs::write(recipe.package_dir.join(".MTREE"), mtree_gz)?;
        if let Some(install) = install_hook_text(recipe) {
            std::fs::write(recipe.package_dir.join(format!("{}.install", recipe.pkg_name)), install)?;
        }
        Ok(())
    }

    fn build_package(&self, recipe: &Recipe, artifacts_path: &Path) -> Result<PathBuf> {
        let bytes = build_tar(&recipe.package_dir, Compression::Zstd)?;
        let dest = artifacts_path.join(Self::filename(recipe));
        crate::archive::write_file(&dest, &bytes)?;
        Ok(dest)
    }

    fn install(&self, artifact: &Path) -> Result<()> {
        run_host_command("pacman", &["-U", "--noconfirm", &artifact.to_string_lossy()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_includes_epoch_when_present() {
        let recipe = Recipe {
            pkg_name: "foo".into(),
            pkg_ver: "1.0".into(),
            pkg_rel: "1".into(),
            epoch: "2".into(),
            arch_computed: "x86_64".into(),
            ..Default::default()
        };
        assert_eq!(PacmanEmitter::filename(&recipe), "foo-2:1.0-1-x86_64.pkg.tar.zst");
    }

    #[test]
    fn filename_omits_epoch_when_absent() {
        let recipe = Recipe {
            pkg_name: "foo".into(),
            pkg_ver: "1.0".into(),
            pkg_rel: "1".into(),
            arch_computed: "x86_64".into(),
            ..Default::default()
        };
        assert_eq!(PacmanEmitter::filename(&recipe), "foo-1.0-1-x86_64.pkg.tar.zst");
    }

    #[test]
    fn mtree_skips_dotfile_basenames() {
        let entries = vec![FileContent {
            path: "/etc/.hidden".into(),
            mode: 0o644,
            mtime: 0,
            size: 0,
            sha256: Some("deadbeef".into()),
            symlink_target: None,
            kind: ContentKind::File,
        }];
        assert!(!mtree_text(&entries).contains("hidden"));
    }
}

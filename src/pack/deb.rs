//! Debian `.deb` emitter: an `ar` container wrapping `debian-binary`,
//! `control.tar.zst`, and `data.tar.zst`.

use std::path::{Path, PathBuf};

use crate::archive::{build_ar, build_tar, build_tar_excluding, Compression};
use crate::constants::{deb_architecture, implicit_build_dependencies, PackageManager};
use crate::fswalk::walk;
use crate::recipe::Recipe;

use super::error::Result;
use super::{build_date_now, installed_size, rewrite_deb_dependency, run_host_command, Emitter};

pub struct DebEmitter;

const MAINTAINER_GUARD: &str = "case \"$1\" in purge|remove|abort-install) ;; *) exit 0 ;; esac\n";

fn control_text(recipe: &Recipe) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!("Package: {}\n", recipe.pkg_name));
    out.push_str(&format!("Version: {}-{}\n", recipe.pkg_ver, recipe.pkg_rel));
    out.push_str(&format!("Architecture: {}\n", recipe.arch_computed));
    out.push_str(&format!("Maintainer: {}\n", recipe.maintainer));
    out.push_str(&format!("Installed-Size: {}\n", recipe.installed_size / 1024));
    if !recipe.depends.is_empty() {
        let rewritten: Result<Vec<String>> = recipe.depends.iter().map(|d| rewrite_deb_dependency(d)).collect();
        out.push_str(&format!("Depends: {}\n", rewritten?.join(", ")));
    }
    if !recipe.provides.is_empty() {
        out.push_str(&format!("Provides: {}\n", recipe.provides.join(", ")));
    }
    if !recipe.conflicts.is_empty() {
        out.push_str(&format!("Conflicts: {}\n", recipe.conflicts.join(", ")));
    }
    if !recipe.replaces.is_empty() {
        out.push_str(&format!("Replaces: {}\n", recipe.replaces.join(", ")));
    }
    out.push_str(&format!("Section: {}\n", recipe.section));
    out.push_str(&format!("Priority: {}\n", if recipe.priority.is_empty() { "optional" } else { &recipe.priority }));
    out.push_str(&format!("Homepage: {}\n", recipe.url));
    out.push_str(&format!("Description: {}\n", recipe.pkg_desc));
    Ok(out)
}

fn write_maintainer_script(debian_dir: &Path, name: &str, body: &Option<String>, guarded: bool) -> Result<()> {
    let Some(body) = body else { return Ok(()) };
    let mut text = String::from("#!/bin/sh\nset -e\n");
    if guarded {
        text.push_str(MAINTAINER_GUARD);
    }
    text.push_str(body);
    let path = debian_dir.join(name);
    std::fs::write(&path, text)?;
    let mut perms = std::fs::metadata(&path)?.permissions();
    std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
    std::fs::set_permissions(&path, perms)?;
    Ok(())
}

impl DebEmitter {
    pub fn filename(recipe: &Recipe) -> String {
        format!("{}_{}-{}_{}.deb", recipe.pkg_name, recipe.pkg_ver, recipe.pkg_rel, recipe.arch_computed)
    }
}

impl Emitter for DebEmitter {
    fn update(&self) -> Result<()> {
        run_host_command("apt-get", &["update"])
    }

    fn prepare_environment(&self) -> Result<()> {
        let mut args = vec!["install", "-y"];
        args.extend(implicit_build_dependencies(PackageManager::Deb));
        run_host_command("apt-get", &args)
    }

    fn prepare(&self, make_depends: &[String]) -> Result<()> {
        if make_depends.is_empty() {
            return Ok(());
        }
        let mut args = vec!["install", "-y"];
        args.extend(make_depends.iter().map(String::as_str));
        run_host_command("apt-get", &args)
    }

    fn prepare_fakeroot(&self, recipe: &mut Recipe, _artifacts_path: &Path) -> Result<()> {
        let entries = walk(&recipe.package_dir, &recipe.backup).map_err(|e| super::Error::Message(e.to_string()))?;
        recipe.installed_size = installed_size(&entries);
        recipe.build_date = build_date_now();
        recipe.arch_computed = deb_architecture(&recipe.arch_computed).to_string();
        if !recipe.codename.is_empty() {
            recipe.pkg_rel = format!("{}{}", recipe.pkg_rel, recipe.codename);
        } else if !recipe.distro.is_empty() {
            recipe.pkg_rel = format!("{}{}", recipe.pkg_rel, recipe.distro);
        }

        let debian_dir = recipe.package_dir.join("DEBIAN");
        std::fs::create_dir_all(&debian_dir)?;
        std::fs::write(debian_dir.join("control"), control_text(recipe)?)?;
        if !recipe.backup.is_empty() {
            let conffiles: Vec<String> = recipe
                .backup
                .iter()
                .map(|p| if p.starts_with('/') { p.clone() } else { format!("/{p}") })
                .collect();
            std::fs::write(debian_dir.join("conffiles"), conffiles.join("\n") + "\n")?;
        }
        write_maintainer_script(&debian_dir, "preinst", &recipe.pre_inst, false)?;
        write_maintainer_script(&debian_dir, "postinst", &recipe.post_inst, false)?;
        write_maintainer_script(&debian_dir, "prerm", &recipe.pre_rm, true)?;
        write_maintainer_script(&debian_dir, "postrm", &recipe.post_rm, true)?;
        Ok(())
    }

    fn build_package(&self, recipe: &Recipe, artifacts_path: &Path) -> Result<PathBuf> {
        let control = build_tar(&recipe.package_dir.join("DEBIAN"), Compression::Zstd)?;
        let data = build_tar_excluding(&recipe.package_dir, "DEBIAN", Compression::Zstd)?;
        let mtime = build_date_now().max(0) as u64;
        let members: Vec<(&str, Vec<u8>)> = vec![
            ("debian-binary", b"2.0\n".to_vec()),
            ("control.tar.zst", control),
            ("data.tar.zst", data),
        ];
        let bytes = build_ar(&members, mtime)?;
        let dest = artifacts_path.join(Self::filename(recipe));
        crate::archive::write_file(&dest, &bytes)?;
        Ok(dest)
    }

    fn install(&self, artifact: &Path) -> Result<()> {
        run_host_command("dpkg", &["-i", &artifact.to_string_lossy()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> Recipe {
        Recipe {
            pkg_name: "foo".into(),
            pkg_ver: "1.0".into(),
            pkg_rel: "1".into(),
            arch_computed: "amd64".into(),
            depends: vec!["glibc>=2.38".into()],
            ..Default::default()
        }
    }

    #[test]
    fn builds_expected_filename() {
        assert_eq!(DebEmitter::filename(&recipe()), "foo_1.0-1_amd64.deb");
    }

    #[test]
    fn control_rewrites_dependency_operators() {
        let text = control_text(&recipe()).unwrap();
        assert!(text.contains("Depends: glibc (>= 2.38)"));
    }
}

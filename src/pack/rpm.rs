//! RPM emitter: delegates serialization to the external `rpm` crate,
//! feeding it the resolved Recipe's metadata and PackageDir's walked
//! file tree.

use std::path::{Path, PathBuf};

use rpm::{Dependency, FileOptions, PackageBuilder};

use crate::constants::{implicit_build_dependencies, rpm_architecture, rpm_group_for_section, PackageManager, RpmDistroFamily};
use crate::fswalk::{walk, ContentKind};
use crate::recipe::dependency::DependencyOrder;
use crate::recipe::Recipe;

use super::error::{Error, Result};
use super::{build_date_now, installed_size, run_host_command, Emitter};

pub struct RpmEmitter;

fn as_rpm_dependency(raw: &str) -> Result<Dependency> {
    let dep = crate::recipe::Dependency::try_from(raw).map_err(|_| Error::BadDependency(raw.to_string()))?;
    Ok(match dep.version {
        None => Dependency::any(dep.name),
        Some(version) => {
            let v = version.unordered.to_string();
            match version.order {
                DependencyOrder::Greater => Dependency::greater(dep.name, v),
                DependencyOrder::GreaterOrEqual => Dependency::greater_eq(dep.name, v),
                DependencyOrder::Equal => Dependency::eq(dep.name, v),
                DependencyOrder::LessOrEqual => Dependency::less_eq(dep.name, v),
                DependencyOrder::Less => Dependency::less(dep.name, v),
            }
        }
    })
}

impl RpmEmitter {
    pub fn filename(recipe: &Recipe) -> String {
        format!("{}-{}-{}.{}.rpm", recipe.pkg_name, recipe.pkg_ver, recipe.pkg_rel, recipe.arch_computed)
    }
}

impl Emitter for RpmEmitter {
    fn update(&self) -> Result<()> {
        run_host_command("dnf", &["check-update"]).or_else(|_| Ok(()))
    }

    fn prepare_environment(&self) -> Result<()> {
        let mut args = vec!["install", "-y"];
        args.extend(implicit_build_dependencies(PackageManager::Rpm));
        run_host_command("dnf", &args)
    }

    fn prepare(&self, make_depends: &[String]) -> Result<()> {
        if make_depends.is_empty() {
            return Ok(());
        }
        let mut args = vec!["install", "-y"];
        args.extend(make_depends.iter().map(String::as_str));
        run_host_command("dnf", &args)
    }

    fn prepare_fakeroot(&self, recipe: &mut Recipe, _artifacts_path: &Path) -> Result<()> {
        let entries = walk(&recipe.package_dir, &recipe.backup).map_err(|e| Error::Message(e.to_string()))?;
        recipe.installed_size = installed_size(&entries);
        recipe.build_date = build_date_now();
        recipe.arch_computed = rpm_architecture(&recipe.arch_computed).to_string();
        if let Some(family) = RpmDistroFamily::from_distro_name(&recipe.distro) {
            let suffix = family.pkgrel_suffix();
            recipe.pkg_rel = if recipe.codename.is_empty() {
                format!("{}{}", recipe.pkg_rel, suffix)
            } else {
                format!("{}{}{}", recipe.pkg_rel, suffix, recipe.codename)
            };
        }
        Ok(())
    }

    fn build_package(&self, recipe: &Recipe, artifacts_path: &Path) -> Result<PathBuf> {
        let entries = walk(&recipe.package_dir, &recipe.backup).map_err(|e| Error::Message(e.to_string()))?;
        let group = rpm_group_for_section(&recipe.section);

        let mut builder = PackageBuilder::new(
            &recipe.pkg_name,
            &recipe.pkg_ver,
            recipe.license.join(" and "),
            &recipe.arch_computed,
            &recipe.pkg_desc,
        )
        .release(recipe.pkg_rel.as_str())
        .url(recipe.url.as_str())
        .group(group)
        .vendor(recipe.copyright.join(", ").as_str())
        .build_host("yap")
        .epoch(recipe.epoch.parse::<u32>().unwrap_or(0));

        for dep in &recipe.depends {
            builder = builder.requires(as_rpm_dependency(dep)?);
        }
        for dep in &recipe.provides {
            builder = builder.provides(as_rpm_dependency(dep)?);
        }
        for dep in &recipe.conflicts {
            builder = builder.conflicts(as_rpm_dependency(dep)?);
        }
        for dep in &recipe.replaces {
            builder = builder.obsoletes(as_rpm_dependency(dep)?);
        }

        if let Some(script) = &recipe.pre_inst {
            builder = builder.pre_install_script(script.as_str());
        }
        if let Some(script) = &recipe.post_inst {
            builder = builder.post_install_script(script.as_str());
        }
        if let Some(script) = &recipe.pre_rm {
            builder = builder.pre_uninstall_script(format!("if [ $1 -ne 0 ]; then exit 0; fi\n{script}"));
        }
        if let Some(script) = &recipe.post_rm {
            builder = builder.post_uninstall_script(format!("if [ $1 -ne 0 ]; then exit 0; fi\n{script}"));
        }
        if let Some(script) = &recipe.pre_trans {
            builder = builder.pretrans_script(script.as_str());
        }
        if let Some(script) = &recipe.post_trans {
            builder = builder.posttrans_script(script.as_str());
        }

        for entry in &entries {
            if entry.kind == ContentKind::Directory {
                continue;
            }
            let source = recipe.package_dir.join(entry.path.trim_start_matches('/'));
            let mut options = FileOptions::new(entry.path.as_str()).mode(entry.mode as i32);
            if entry.kind == ContentKind::ConfigNoReplace {
                options = options.is_config();
            }
            builder = builder.with_file(&source, options)?;
        }

        let package = builder.build()?;
        let dest = artifacts_path.join(Self::filename(recipe));
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(&dest)?;
        package.write(&mut file)?;
        Ok(dest)
    }

    fn install(&self, artifact: &Path) -> Result<()> {
        run_host_command("rpm", &["-U", &artifact.to_string_lossy()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_expected_filename() {
        let recipe = Recipe {
            pkg_name: "foo".into(),
            pkg_ver: "1.0".into(),
            pkg_rel: "1".into(),
            arch_computed: "x86_64".into(),
            ..Default::default()
        };
        assert_eq!(RpmEmitter::filename(&recipe), "foo-1.0-1.x86_64.rpm");
    }
}

//! Packer dispatch and the four format emitters. Each emitter turns a
//! staged PackageDir into a bit-exact distributable archive following
//! its own six-operation lifecycle.

pub mod apk;
pub mod deb;
pub mod error;
pub mod pacman;
pub mod rpm;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

use crate::constants::PackageManager;
use crate::fswalk::FileContent;
use crate::recipe::Recipe;

/// The six-operation emitter lifecycle every format implements. `Update`
/// and `Install` shell out to the host package manager and are therefore
/// thin; `PrepareFakeroot`/`BuildPackage` hold each format's real
/// byte-exact construction logic.
pub trait Emitter {
    /// Refreshes the host package manager's index. Skippable via
    /// `--skip-sync` at the CLI layer, which simply omits the call.
    fn update(&self) -> Result<()>;

    /// Installs the format's implicit build-environment dependencies
    /// (see `constants::implicit_build_dependencies`).
    fn prepare_environment(&self) -> Result<()>;

    /// Installs recipe-declared make dependencies.
    fn prepare(&self, make_depends: &[String]) -> Result<()>;

    /// Synthesizes format-specific metadata inside `recipe.package_dir`
    /// and mutates `recipe`'s computed fields (InstalledSize, BuildDate,
    /// ArchComputed, Checksum, PkgRel suffix).
    fn prepare_fakeroot(&self, recipe: &mut Recipe, artifacts_path: &Path) -> Result<()>;

    /// Walks PackageDir, builds the final archive, and writes it under
    /// `artifacts_path` using the format's canonical filename.
    fn build_package(&self, recipe: &Recipe, artifacts_path: &Path) -> Result<PathBuf>;

    /// Asks the host package manager to install a freshly built artifact.
    fn install(&self, artifact: &Path) -> Result<()>;
}

/// Looks up the emitter for a distribution's package-manager family.
pub fn dispatch(manager: PackageManager) -> Box<dyn Emitter> {
    match manager {
        PackageManager::Apk => Box::new(apk::ApkEmitter),
        PackageManager::Deb => Box::new(deb::DebEmitter),
        PackageManager::Rpm => Box::new(rpm::RpmEmitter),
        PackageManager::Pacman => Box::new(pacman::PacmanEmitter),
    }
}

/// Rewrites one PKGBUILD-style dependency string (`pkg>=1.0`) into the
/// form the DEB control file expects (`pkg (>= 1.0)`). A bare name
/// (no operator) passes through unchanged.
pub fn rewrite_deb_dependency(raw: &str) -> Result<String> {
    let dep = crate::recipe::Dependency::try_from(raw).map_err(|_| Error::BadDependency(raw.to_string()))?;
    match dep.version {
        Some(version) => Ok(format!("{} ({} {})", dep.name, version.order, version.unordered)),
        None => Ok(dep.name),
    }
}

/// Computes InstalledSize (sum of regular-file sizes) from a walked
/// PackageDir -- shared across all four emitters' PrepareFakeroot stage.
pub fn installed_size(entries: &[FileContent]) -> u64 {
    entries.iter().map(|e| e.size).sum()
}

/// Spawns a host package-manager binary with inherited stdio, mapping a
/// nonzero exit to a fatal error the way every external-process call in
/// the lifecycle does.
pub fn run_host_command(program: &str, args: &[&str]) -> Result<()> {
    log::info!("running {program} {}", args.join(" "));
    let status = std::process::Command::new(program)
        .args(args)
        .status()
        .map_err(Error::Io)?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::Message(format!("{program} exited with status {status}")))
    }
}

/// Wall-clock BuildDate. Emitters call this once in PrepareFakeroot;
/// taking it as a parameter (rather than reading the clock inline) keeps
/// the format modules free of direct `SystemTime` calls and easy to test
/// deterministically.
pub fn build_date_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_deb_dependency_with_operator() {
        assert_eq!(rewrite_deb_dependency("glibc>=2.38").unwrap(), "glibc (>= 2.38)");
    }

    #[test]
    fn rewrites_deb_dependency_without_operator() {
        assert_eq!(rewrite_deb_dependency("zlib").unwrap(), "zlib");
    }
}

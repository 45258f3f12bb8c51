//! Source acquisition: resolves each recipe `source=` entry to bytes on
//! disk inside SourceDir, verifying integrity and auto-extracting archives.

pub mod error;
#[cfg(feature = "git-sources")]
mod git;
mod http;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

use crate::archive::{extract_archive, looks_like_archive};
use crate::digest::verify as verify_digest;

/// One `source=` entry, split into its scheme-qualified form and the
/// destination file name the build will see under SourceDir.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    pub reference: String,
    pub file_name: String,
}

impl SourceEntry {
    pub fn parse(raw: &str) -> Self {
        let (reference, file_name) = match raw.split_once("::") {
            Some((name, rest)) => (rest.to_string(), name.to_string()),
            None => {
                let name = raw.rsplit('/').next().unwrap_or(raw).to_string();
                (raw.to_string(), name)
            }
        };
        SourceEntry { reference, file_name }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheme {
    Http,
    GitHttps,
    GitSsh,
    Local,
}

fn classify(reference: &str) -> Scheme {
    if reference.starts_with("git+https://") {
        Scheme::GitHttps
    } else if reference.starts_with("git+ssh://") {
        Scheme::GitSsh
    } else if reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("ftp://")
    {
        Scheme::Http
    } else {
        Scheme::Local
    }
}

/// Fetches every source entry for a recipe, verifying against
/// `hash_sums` (positionally matched, `SKIP` tolerated) and populating
/// `source_dir` for the build to consume. `home` is the directory
/// unqualified/relative references are hard-linked from.
///
/// Downloaded and cloned sources land in `start_dir` first (a persistent
/// cache that survives a `--cleanbuild` of `source_dir`): archives are
/// extracted straight from there into `source_dir`, and anything else is
/// symlinked in rather than copied. Local/relative references skip the
/// cache and are hard-linked directly into `source_dir`.
pub fn fetch_all(
    sources: &[String],
    hash_sums: &[String],
    start_dir: &Path,
    source_dir: &Path,
    home: &Path,
    ssh_passphrase: Option<&str>,
) -> Result<()> {
    std::fs::create_dir_all(source_dir)?;
    std::fs::create_dir_all(start_dir)?;

    for (index, raw) in sources.iter().enumerate() {
        let entry = SourceEntry::parse(raw);
        let scheme = classify(&entry.reference);

        let cached = match scheme {
            Scheme::Local => source_dir.join(&entry.file_name),
            _ => start_dir.join(&entry.file_name),
        };
        fetch_one(&entry, scheme, &cached, home, ssh_passphrase)?;

        if let Some(recorded) = hash_sums.get(index) {
            if cached.is_file() {
                verify_digest(&cached, recorded).map_err(|e| Error::Integrity(e.to_string()))?;
            }
        }

        if !matches!(scheme, Scheme::Local) {
            if cached.is_file() && looks_like_archive(&cached).map_err(Error::Archive)? {
                extract_archive(&cached, source_dir).map_err(Error::Archive)?;
            } else if cached.exists() {
                symlink_into(&cached, &source_dir.join(&entry.file_name))?;
            }
        }
    }
    Ok(())
}

fn fetch_one(entry: &SourceEntry, scheme: Scheme, dest: &Path, home: &Path, ssh_passphrase: Option<&str>) -> Result<()> {
    match scheme {
        Scheme::Http => http::download(&entry.reference, dest),
        Scheme::GitHttps | Scheme::GitSsh => fetch_git(&entry.reference, dest, ssh_passphrase),
        Scheme::Local => link_local(&entry.reference, dest, home),
    }
}

fn symlink_into(cached: &Path, dest: &Path) -> Result<()> {
    if dest.exists() || dest.is_symlink() {
        std::fs::remove_file(dest).ok();
    }
    std::os::unix::fs::symlink(cached, dest)?;
    Ok(())
}

#[cfg(feature = "git-sources")]
fn fetch_git(reference: &str, dest: &Path, ssh_passphrase: Option<&str>) -> Result<()> {
    let (url, checkout) = split_git_reference(reference);
    git::clone_and_checkout(&url, &checkout, dest, ssh_passphrase)
}

#[cfg(not(feature = "git-sources"))]
fn fetch_git(reference: &str, _dest: &Path, _ssh_passphrase: Option<&str>) -> Result<()> {
    Err(Error::UnsupportedScheme(reference.to_string()))
}

/// Splits `git+https://host/path.git#branch=name` (or `#tag=`/`#commit=`,
/// or a bare `#ref`) into the plain clone URL and the reference to check
/// out, defaulting to `HEAD`.
fn split_git_reference(reference: &str) -> (String, String) {
    let without_prefix = reference
        .strip_prefix("git+https://")
        .map(|rest| format!("https://{rest}"))
        .or_else(|| reference.strip_prefix("git+ssh://").map(|rest| format!("ssh://{rest}")))
        .unwrap_or_else(|| reference.to_string());

    match without_prefix.split_once('#') {
        Some((url, fragment)) => {
            let checkout = fragment
                .split_once('=')
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| fragment.to_string());
            (url.to_string(), checkout)
        }
        None => (without_prefix, "HEAD".to_string()),
    }
}

fn link_local(reference: &str, dest: &Path, home: &Path) -> Result<()> {
    let source_path: PathBuf = if Path::new(reference).is_absolute() {
        PathBuf::from(reference)
    } else {
        home.join(reference)
    };
    if dest.exists() {
        std::fs::remove_file(dest).ok();
    }
    std::fs::hard_link(&source_path, dest).or_else(|_| std::fs::copy(&source_path, dest).map(|_| ()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_renamed_source_entry() {
        let entry = SourceEntry::parse("foo.tar.gz::https://example.com/bar.tar.gz");
        assert_eq!(entry.file_name, "foo.tar.gz");
        assert_eq!(entry.reference, "https://example.com/bar.tar.gz");
    }

    #[test]
    fn derives_file_name_from_url() {
        let entry = SourceEntry::parse("https://example.com/archive.tar.gz");
        assert_eq!(entry.file_name, "archive.tar.gz");
    }

    #[test]
    fn splits_git_reference_with_fragment() {
        let (url, checkout) = split_git_reference("git+https://example.com/repo.git#tag=v1.2.3");
        assert_eq!(url, "https://example.com/repo.git");
        assert_eq!(checkout, "v1.2.3");
    }

    #[test]
    fn splits_git_reference_without_fragment() {
        let (url, checkout) = split_git_reference("git+https://example.com/repo.git");
        assert_eq!(url, "https://example.com/repo.git");
        assert_eq!(checkout, "HEAD");
    }

    #[test]
    fn classifies_schemes() {
        assert_eq!(classify("https://example.com/a"), Scheme::Http);
        assert_eq!(classify("git+https://example.com/a"), Scheme::GitHttps);
        assert_eq!(classify("git+ssh://example.com/a"), Scheme::GitSsh);
        assert_eq!(classify("local-patch.diff"), Scheme::Local);
    }
}

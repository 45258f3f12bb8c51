//! Recursive enumeration of PackageDir into [`FileContent`] records, with
//! backup-path and empty-directory handling shared by every packer.

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use walkdir::WalkDir;

use crate::digest::{digest_file, DigestAlgorithm};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    File,
    ConfigNoReplace,
    Directory,
    Symlink,
}

#[derive(Debug, Clone)]
pub struct FileContent {
    /// Destination path relative to PackageDir, always leading with `/`.
    pub path: String,
    pub mode: u32,
    pub mtime: u32,
    pub size: u64,
    pub sha256: Option<String>,
    pub symlink_target: Option<String>,
    pub kind: ContentKind,
}

/// Walks `package_dir`, classifying every entry and tagging backup paths
/// (declared relative to PackageDir, without a leading slash) as
/// config-no-replace.
pub fn walk(package_dir: &Path, backup_paths: &[String]) -> Result<Vec<FileContent>> {
    let backups: std::collections::HashSet<&str> =
        backup_paths.iter().map(String::as_str).collect();
    let mut entries = Vec::new();

    for entry in WalkDir::new(package_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| crate::error::Error::Message(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(package_dir)
            .unwrap_or(entry.path());
        let dest_path = format!("/{}", relative.to_string_lossy());
        let metadata = entry.metadata().map_err(|e| crate::error::Error::Message(e.to_string()))?;
        let mode = metadata.mode();
        let mtime = clamp_mtime(metadata.mtime())?;

        if entry.file_type().is_symlink() {
            let target = fs::read_link(entry.path())?;
            entries.push(FileContent {
                path: dest_path,
                mode,
                mtime,
                size: target.to_string_lossy().len() as u64,
                sha256: None,
                symlink_target: Some(target.to_string_lossy().into_owned()),
                kind: ContentKind::Symlink,
            });
        } else if entry.file_type().is_dir() {
            entries.push(FileContent {
                path: dest_path,
                mode,
                mtime,
                size: 0,
                sha256: None,
                symlink_target: None,
                kind: ContentKind::Directory,
            });
        } else {
            let relative_str = relative.to_string_lossy().into_owned();
            let kind = if backups.contains(relative_str.as_str()) {
                ContentKind::ConfigNoReplace
            } else {
                ContentKind::File
            };
            let sha256 = digest_file(entry.path(), DigestAlgorithm::Sha256)?;
            entries.push(FileContent {
                path: dest_path,
                mode,
                mtime,
                size: metadata.size(),
                sha256: Some(sha256),
                symlink_target: None,
                kind,
            });
        }
    }
    Ok(entries)
}

fn clamp_mtime(mtime: i64) -> Result<u32> {
    u32::try_from(mtime)
        .map_err(|_| crate::error::Error::Message(format!("mtime {mtime} out of uint32 range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;

    #[test]
    fn classifies_file_dir_and_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("etc")).unwrap();
        fs::write(root.join("etc/conf"), b"hi").unwrap();
        symlink("conf", root.join("etc/conf.link")).unwrap();

        let entries = walk(root, &["etc/conf".to_string()]).unwrap();
        let kinds: Vec<_> = entries.iter().map(|e| (e.path.clone(), e.kind)).collect();
        assert!(kinds.contains(&("/etc".to_string(), ContentKind::Directory)));
        assert!(kinds.contains(&("/etc/conf".to_string(), ContentKind::ConfigNoReplace)));
        assert!(kinds.contains(&("/etc/conf.link".to_string(), ContentKind::Symlink)));
    }
}

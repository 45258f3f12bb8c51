use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression as GzLevel;

use super::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Zstd,
}

/// Tars the contents of `source_dir` (its entries, not the directory
/// itself) and compresses the result with `compression`.
pub fn build_tar(source_dir: &Path, compression: Compression) -> Result<Vec<u8>> {
    match compression {
        Compression::Gzip => {
            let encoder = GzEncoder::new(Vec::new(), GzLevel::default());
            let mut builder = tar::Builder::new(encoder);
            builder.follow_symlinks(false);
            builder.append_dir_all(".", source_dir)?;
            let encoder = builder.into_inner()?;
            Ok(encoder.finish()?)
        }
        Compression::Zstd => {
            let encoder = zstd::stream::write::Encoder::new(Vec::new(), 0)?;
            let mut builder = tar::Builder::new(encoder);
            builder.follow_symlinks(false);
            builder.append_dir_all(".", source_dir)?;
            let encoder = builder.into_inner()?;
            Ok(encoder.finish()?)
        }
    }
}

/// Same as [`build_tar`], but skips one top-level entry by name (used by
/// the DEB emitter to tar PackageDir's payload without its `DEBIAN/`
/// control subtree).
pub fn build_tar_excluding(source_dir: &Path, exclude_name: &str, compression: Compression) -> Result<Vec<u8>> {
    fn append_all<W: std::io::Write>(builder: &mut tar::Builder<W>, source_dir: &Path, exclude_name: &str) -> Result<()> {
        for entry in std::fs::read_dir(source_dir)? {
            let entry = entry?;
            if entry.file_name() == exclude_name {
                continue;
            }
            let path = entry.path();
            let name = entry.file_name();
            if path.is_dir() {
                builder.append_dir_all(&name, &path)?;
            } else {
                builder.append_path_with_name(&path, &name)?;
            }
        }
        Ok(())
    }

    match compression {
        Compression::Gzip => {
            let encoder = GzEncoder::new(Vec::new(), GzLevel::default());
            let mut builder = tar::Builder::new(encoder);
            builder.follow_symlinks(false);
            append_all(&mut builder, source_dir, exclude_name)?;
            let encoder = builder.into_inner()?;
            Ok(encoder.finish()?)
        }
        Compression::Zstd => {
            let encoder = zstd::stream::write::Encoder::new(Vec::new(), 0)?;
            let mut builder = tar::Builder::new(encoder);
            builder.follow_symlinks(false);
            append_all(&mut builder, source_dir, exclude_name)?;
            let encoder = builder.into_inner()?;
            Ok(encoder.finish()?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_nonempty_gzip_tar() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("file.txt"), b"hello").unwrap();
        let archive = build_tar(dir.path(), Compression::Gzip).unwrap();
        assert!(!archive.is_empty());
        assert_eq!(&archive[0..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn builds_a_nonempty_zstd_tar() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("file.txt"), b"hello").unwrap();
        let archive = build_tar(dir.path(), Compression::Zstd).unwrap();
        assert!(!archive.is_empty());
        assert_eq!(&archive[0..4], &[0x28, 0xb5, 0x2f, 0xfd]);
    }
}

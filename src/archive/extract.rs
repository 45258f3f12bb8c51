use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::error::{Error, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Reads the first bytes of `path` and reports whether they match a
/// magic number this crate knows how to extract.
pub fn looks_like_archive(path: &Path) -> Result<bool> {
    let mut header = [0u8; 4];
    let mut file = File::open(path)?;
    let read = file.read(&mut header)?;
    if read >= 2 && header[..2] == GZIP_MAGIC {
        return Ok(true);
    }
    if read >= 4 && header == ZSTD_MAGIC {
        return Ok(true);
    }
    Ok(false)
}

/// Extracts an auto-identified archive at `path` into `dest`, preserving
/// mode bits (tar's default unpack behavior).
pub fn extract_archive(path: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)?;
    let mut header = [0u8; 4];
    {
        let mut file = File::open(path)?;
        let read = file.read(&mut header)?;
        header[read.min(4)..].fill(0);
    }
    let file = File::open(path)?;
    if header[..2] == GZIP_MAGIC {
        let decoder = flate2::read::GzDecoder::new(file);
        let mut archive = tar::Archive::new(decoder);
        archive.unpack(dest)?;
        Ok(())
    } else if header == ZSTD_MAGIC {
        let decoder = zstd::stream::read::Decoder::new(file)?;
        let mut archive = tar::Archive::new(decoder);
        archive.unpack(dest)?;
        Ok(())
    } else {
        let mut archive = tar::Archive::new(file);
        archive.unpack(dest).map_err(|_| Error::UnknownFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tar_codec::{build_tar, Compression};

    #[test]
    fn round_trips_a_gzip_tar() {
        let src = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("file.txt"), b"payload").unwrap();
        let bytes = build_tar(src.path(), Compression::Gzip).unwrap();

        let archive_dir = tempfile::tempdir().unwrap();
        let archive_path = archive_dir.path().join("out.tar.gz");
        std::fs::write(&archive_path, &bytes).unwrap();

        assert!(looks_like_archive(&archive_path).unwrap());

        let dest = tempfile::tempdir().unwrap();
        extract_archive(&archive_path, dest.path()).unwrap();
        let extracted = std::fs::read(dest.path().join("file.txt")).unwrap();
        assert_eq!(extracted, b"payload");
    }
}

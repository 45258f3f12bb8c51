//! Tar-based inner archives (gzip or zstd compressed), the `ar` outer
//! container `.deb` wraps them in, and source-tarball extraction.

mod error;
mod extract;
mod tar_codec;

pub use error::{Error, Result};
pub use extract::{extract_archive, looks_like_archive};
pub use tar_codec::{build_tar, build_tar_excluding, Compression};

use std::io::Write;

/// Builds a `.deb`-style `ar` archive from an ordered list of
/// `(member_name, contents)` pairs. All member timestamps are set to a
/// single `mtime`, matching the "ar member timestamps set to now,
/// uniformly" rule.
pub fn build_ar(members: &[(&str, Vec<u8>)], mtime: u64) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut builder = ar::Builder::new(&mut out);
    for (name, contents) in members {
        let mut header = ar::Header::new(name.as_bytes().to_vec(), contents.len() as u64);
        header.set_mtime(mtime);
        header.set_uid(0);
        header.set_gid(0);
        header.set_mode(0o100644);
        builder.append(&header, contents.as_slice())?;
    }
    drop(builder);
    Ok(out)
}

/// Writes `bytes` into `path`, creating parent directories as needed.
pub fn write_file(path: &std::path::Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    file.write_all(bytes)?;
    Ok(())
}

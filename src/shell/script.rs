use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::error::Result;

/// A handle to the on-disk (or temporary) dumper script that [`super::Dumper`]
/// spawns to turn a PKGBUILD into a stream of `key:value` records.
pub enum DumperScript {
    Temporary(NamedTempFile),
    Persistent(PathBuf),
}

impl AsRef<OsStr> for DumperScript {
    fn as_ref(&self) -> &OsStr {
        match self {
            DumperScript::Temporary(temp_file) => temp_file.path().as_os_str(),
            DumperScript::Persistent(path) => path.as_os_str(),
        }
    }
}

impl DumperScript {
    /// Write the embedded dumper script to `path`, or to a fresh named
    /// tempfile if `path` is `None`.
    pub fn new<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        const SCRIPT: &[u8] = include_bytes!("script/dump.bash");
        if let Some(path) = path {
            std::fs::write(&path, SCRIPT)?;
            Ok(DumperScript::Persistent(path.as_ref().into()))
        } else {
            let mut temp_file = tempfile::Builder::new().prefix(".yap-dump").tempfile()?;
            use std::io::Write;
            temp_file.write_all(SCRIPT)?;
            Ok(DumperScript::Temporary(temp_file))
        }
    }
}

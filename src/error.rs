use std::path::PathBuf;

use crate::shell;

/// The crate-wide error type. Each subsystem that needs its own richer
/// enum (the shell dumper, eventually the workspace graph) defines one and
/// is folded in here via `#[from]`; everything else gets a variant
/// directly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Shell(#[from] shell::Error),

    #[error(transparent)]
    Recipe(#[from] crate::recipe::Error),

    #[error(transparent)]
    Source(#[from] crate::source::Error),

    #[error(transparent)]
    Workspace(#[from] crate::workspace::Error),

    #[error(transparent)]
    Pack(#[from] crate::pack::Error),

    #[error("{0}")]
    Message(String),

    #[error("digest string '{0}' is not a recognized length or form")]
    UnrecognizedDigest(String),

    #[error("digest mismatch for {path}: expected {expected}, got {actual}")]
    DigestMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "git-sources")]
    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("url '{0}' could not be parsed")]
    Url(#[from] url::ParseError),

    #[error("unsupported source scheme in url '{0}'")]
    UnsupportedSourceScheme(String),

    #[error("workspace dependency cycle: {0}")]
    DependencyCycle(String),

    #[error("project '{0}' is not declared in the workspace manifest")]
    UnknownProject(String),

    #[error("workspace manifest at '{0}' could not be parsed: {1}")]
    ManifestParse(PathBuf, serde_json::Error),

    #[error("architecture '{0}' is not a recognized canonical architecture or alias")]
    UnknownArchitecture(String),

    #[error("rpm builder error: {0}")]
    Rpm(#[from] rpm::Error),

    #[error(transparent)]
    Archive(#[from] crate::archive::Error),

    #[error("child process '{0}' exited with status {1}")]
    ChildExit(String, std::process::ExitStatus),
}

pub type Result<T> = std::result::Result<T, Error>;

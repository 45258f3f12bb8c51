#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("workspace manifest at '{0}' could not be parsed: {1}")]
    ManifestParse(std::path::PathBuf, serde_json::Error),

    #[error("project '{0}' is not declared in the workspace manifest")]
    UnknownProject(String),

    #[error("'{0}' is not a recognized distribution or package manager name")]
    UnknownDistro(String),

    #[error("dependency cycle detected: {0}")]
    Cycle(String),

    #[error(transparent)]
    Recipe(#[from] crate::recipe::Error),

    #[error(transparent)]
    Source(#[from] crate::source::Error),

    #[error(transparent)]
    Pack(#[from] crate::pack::Error),

    #[error(transparent)]
    Shell(#[from] crate::shell::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

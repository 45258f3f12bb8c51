#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Archive(#[from] crate::archive::Error),

    #[error("rpm builder error: {0}")]
    Rpm(#[from] rpm::Error),

    #[error("{0}")]
    Message(String),

    #[error("recipe field '{0}' could not be rewritten as a dependency string")]
    BadDependency(String),
}

pub type Result<T> = std::result::Result<T, Error>;

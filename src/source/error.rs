#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http request for '{0}' failed: {1}")]
    Http(String, #[source] reqwest::Error),

    #[error("http request for '{0}' failed after {1} attempts")]
    HttpRetriesExhausted(String, u32),

    #[cfg(feature = "git-sources")]
    #[error("git operation on '{0}' failed: {1}")]
    Git(String, #[source] git2::Error),

    #[error("url '{0}' could not be parsed")]
    Url(#[from] url::ParseError),

    #[error("unsupported source scheme in '{0}'")]
    UnsupportedScheme(String),

    #[error("{0}")]
    Integrity(String),

    #[error(transparent)]
    Archive(#[from] crate::archive::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

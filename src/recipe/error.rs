#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("dumping '{0}' failed: {1}")]
    Dump(std::path::PathBuf, crate::shell::Error),

    #[error("mandatory field '{0}' is missing or empty")]
    MissingField(&'static str),

    #[error("pkgrel '{0}' is not a decimal string")]
    NonDecimalPkgRel(String),

    #[error("source list has {sources} entries but HashSums has {hashes}")]
    SourceHashCountMismatch { sources: usize, hashes: usize },

    #[error("provide string '{0}' contains illegal > or <")]
    InvalidProvide(String),
}

pub type Result<T> = std::result::Result<T, Error>;

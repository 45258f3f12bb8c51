#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive member '{0}' exceeds representable size")]
    MemberTooLarge(String),

    #[error("could not identify archive format from magic bytes")]
    UnknownFormat,
}

pub type Result<T> = std::result::Result<T, Error>;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dumper child process exited unsuccessfully")]
    ChildFailed,

    #[error("dumper child's stdin/stdout/stderr handle was not available")]
    ChildStdioIncomplete,

    #[error("a worker thread feeding or draining the dumper child panicked")]
    ThreadUnjoinable,

    #[error("dumper produced output that did not parse as a PKGBUILD record: {0}")]
    MalformedDump(String),

    #[error("dumper returned {actual} record(s) for {expected} input path(s)")]
    MismatchedResultCount { expected: usize, actual: usize },

    #[error("base64 payload for function '{0}' could not be decoded")]
    BadFunctionEncoding(String),

    #[error("PKGBUILD at '{0}' could not be found")]
    NotFound(PathBuf),

    #[error("running '{function}' from '{path}' exited with status {status}")]
    FunctionFailed {
        path: PathBuf,
        function: String,
        status: std::process::ExitStatus,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

use std::path::PathBuf;

/// Options controlling how the dumper child process is spawned.
pub struct DumperOptions {
    /// The interpreter used to run the dumper script.
    ///
    /// Default: `/bin/bash`
    pub interpreter: PathBuf,

    /// Working directory to `cd` into before spawning the interpreter.
    ///
    /// Default: `None` (inherit the caller's working directory)
    pub work_dir: Option<PathBuf>,
}

impl Default for DumperOptions {
    fn default() -> Self {
        Self {
            interpreter: "/bin/bash".into(),
            work_dir: None,
        }
    }
}

impl DumperOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_interpreter<P: Into<PathBuf>>(&mut self, interpreter: P) -> &mut Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn set_work_dir<P: Into<PathBuf>>(&mut self, work_dir: Option<P>) -> &mut Self {
        self.work_dir = work_dir.map(Into::into);
        self
    }
}

//! Turns a recipe file into a structured dump of its assignments and
//! function bodies by sourcing it in a real `bash` and snapshotting what
//! changed, rather than attempting to parse shell grammar directly.

mod ast;
mod child_ios;
pub mod error;
pub mod expand;
mod options;
mod runner;
mod script;

use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use child_ios::ChildIOs;
pub use ast::{parse_dump, PkgbuildDump, Value};
pub use error::{Error, Result};
pub use expand::Scope;
pub use options::DumperOptions;
pub use runner::Runner;
pub use script::DumperScript;

/// Drives the embedded dumper script against one or more recipe files.
pub struct Dumper {
    pub script: DumperScript,
    pub options: DumperOptions,
}

impl Dumper {
    /// Create a dumper with a freshly written temporary script and default
    /// options.
    pub fn new() -> Result<Self> {
        Ok(Self {
            script: DumperScript::new(None::<&str>)?,
            options: DumperOptions::default(),
        })
    }

    pub fn set_script(&mut self, script: DumperScript) -> &mut Self {
        self.script = script;
        self
    }

    pub fn set_options(&mut self, options: DumperOptions) -> &mut Self {
        self.options = options;
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.options.interpreter);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .arg(self.script.as_ref());
        if let Some(work_dir) = &self.options.work_dir {
            command.current_dir(work_dir);
        }
        command
    }

    fn spawn_with_ios(&self) -> Result<(Child, ChildIOs)> {
        let mut child = self.command().spawn()?;
        let ios = ChildIOs::try_from(&mut child)?;
        Ok((child, ios))
    }

    /// Dump every recipe file in `paths`, in order.
    pub fn dump_multi<I, P>(&self, paths: I) -> Result<Vec<PkgbuildDump>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut input = Vec::new();
        let mut count = 0usize;
        for path in paths {
            count += 1;
            input.extend_from_slice(path.as_ref().as_os_str().as_bytes());
            input.push(b'\n');
        }
        let (mut child, ios) = self.spawn_with_ios()?;
        #[cfg(not(feature = "nothread"))]
        let out_and_err = ios.work(input);
        #[cfg(feature = "nothread")]
        let out_and_err = ios.work(&input);
        let (out, err) = match out_and_err {
            Ok(out_err) => {
                let status = child.wait()?;
                if !status.success() {
                    log::error!("Dumper child did not execute successfully");
                    return Err(Error::ChildFailed);
                }
                out_err
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };
        if !err.is_empty() {
            log::warn!("Dumper wrote to stderr:\n{}", String::from_utf8_lossy(&err));
        }
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("Raw dumper output:\n{}", String::from_utf8_lossy(&out));
        }
        let dumps = parse_dump(&out)?;
        if dumps.len() != count {
            return Err(Error::MismatchedResultCount {
                expected: count,
                actual: dumps.len(),
            });
        }
        Ok(dumps)
    }

    /// Dump a single recipe file. Defaults to `PKGBUILD` in the dumper's
    /// working directory when `path` is `None`.
    pub fn dump_one<P: AsRef<Path>>(&self, path: Option<P>) -> Result<PkgbuildDump> {
        let mut dumps = match path {
            Some(path) => self.dump_multi(std::iter::once(path.as_ref().to_path_buf())),
            None => self.dump_multi(std::iter::once(Path::new("PKGBUILD").to_path_buf())),
        }?;
        match dumps.len() {
            1 => Ok(dumps.pop().unwrap()),
            actual => Err(Error::MismatchedResultCount { expected: 1, actual }),
        }
    }
}

//! Executes a directive-resolved `build()`/`package()` body in a real
//! `bash`, inheriting stdio so the build log streams live the way a user
//! invoking `makepkg` would see it.
//!
//! The body handed in is whichever directive-suffixed variant won
//! resolution (e.g. `build_aarch64`), not necessarily the one literally
//! named `build`. The recipe file is sourced first so any helper
//! functions and plain variables it declares outside the lifecycle hooks
//! are still available, then the winning body -- after its `${...}`
//! references are substituted against the resolved [`Scope`] -- is
//! (re)defined and invoked under its own name.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;

use super::error::{Error, Result};
use super::expand::{self, Scope};
use super::options::DumperOptions;

struct RunnerScript(NamedTempFile);

impl AsRef<OsStr> for RunnerScript {
    fn as_ref(&self) -> &OsStr {
        self.0.path().as_os_str()
    }
}

impl RunnerScript {
    fn write(contents: &str) -> Result<Self> {
        use std::io::Write;
        let mut temp_file = tempfile::Builder::new().prefix(".yap-run").tempfile()?;
        temp_file.write_all(contents.as_bytes())?;
        Ok(RunnerScript(temp_file))
    }
}

pub struct Runner {
    options: DumperOptions,
}

impl Runner {
    pub fn new() -> Result<Self> {
        Ok(Self { options: DumperOptions::default() })
    }

    pub fn set_options(&mut self, options: DumperOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Runs the resolved function `body` (full `declare -f`-style text,
    /// including its own `name () { ... }` header) from the recipe at
    /// `path`, with `env` set in the child's environment. The function's
    /// own stdout/stderr are inherited, not captured -- the caller sees
    /// build output live.
    pub fn run_function<P, I, K, V>(&self, path: P, body: &str, scope: &Scope, env: I) -> Result<()>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        let path = path.as_ref();
        let expanded = expand::expand(body, scope);
        let fn_name = expanded
            .split_once('(')
            .map(|(name, _)| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "__yap_target".to_string());

        let script_text = format!(
            "set -u\nshopt -s extglob nullglob\n__yap_path=\"$1\"\ncd \"$(dirname -- \"$__yap_path\")\" || exit 97\n\
             source \"$(basename -- \"$__yap_path\")\" || exit 98\n{expanded}\nset -e\n{fn_name}\n"
        );
        let script = RunnerScript::write(&script_text)?;

        let mut command = Command::new(&self.options.interpreter);
        command
            .arg(script.as_ref())
            .arg(path)
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(work_dir) = &self.options.work_dir {
            command.current_dir(work_dir);
        }
        let status = command.spawn()?.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::FunctionFailed {
                path: PathBuf::from(path),
                function: fn_name,
                status,
            })
        }
    }
}

// SPDX-License-Identifier: MPL-2.0
//! External process invocation.
//!
//! Every tool-backed codec goes through [`run_recorded`]: it spawns the
//! command, feeds stdin from a scoped thread while stdout and stderr are
//! drained, waits for completion and appends the command line and stderr
//! text to the codec's call history.
//!
//! Exit codes are logged and recorded but never turned into errors; the
//! callers decide success from the produced output alone.

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use crate::diagnostics::{CallHistory, CallRecord};
use crate::error::{Error, Result};

/// Argument that makes tools read stdin or write stdout.
pub const STANDARD_STREAM: &str = "-";

/// A command line under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    /// Starts a command for `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    /// Program path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments, in order.
    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Everything a finished process produced.
#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// Stderr decoded lossily, where tools write their diagnostics.
    #[must_use]
    pub fn diagnostics(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Runs `command` to completion.
///
/// `stdin` bytes, when given, are written from a separate thread so a tool
/// that starts writing output before consuming all input cannot deadlock.
///
/// # Errors
///
/// Returns [`Error::Io`] if the process cannot be spawned or waited on.
pub fn run(command: &ToolCommand, stdin: Option<&[u8]>) -> Result<ToolOutput> {
    log::debug!("running: {command}");

    let mut child = command
        .to_command()
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            Error::Io(io::Error::new(
                e.kind(),
                format!("failed to run {}: {e}", command.program().display()),
            ))
        })?;

    let writer_input = child.stdin.take();
    let output = thread::scope(|scope| {
        let writer = match (writer_input, stdin) {
            (Some(mut pipe), Some(bytes)) => Some(scope.spawn(move || pipe.write_all(bytes))),
            _ => None,
        };
        let output = child.wait_with_output();
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Err(e)) if e.kind() != io::ErrorKind::BrokenPipe => {
                    log::warn!("writing stdin of {} failed: {e}", command.program().display());
                }
                Err(_) => log::warn!("stdin writer for {} panicked", command.program().display()),
                _ => {}
            }
        }
        output
    })?;

    if !output.status.success() {
        log::warn!("{command} exited with {}", output.status);
    }

    Ok(ToolOutput {
        status: output.status,
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

/// Runs `command` and appends it with its diagnostics to `history`.
///
/// # Errors
///
/// Same as [`run`]. A spawn failure is recorded before it is returned.
pub fn run_recorded(
    history: &mut CallHistory,
    command: &ToolCommand,
    stdin: Option<&[u8]>,
) -> Result<ToolOutput> {
    match run(command, stdin) {
        Ok(output) => {
            let mut response = output.diagnostics();
            if !output.status.success() {
                response.push_str(&format!("\n[{}]", output.status));
            }
            history.push(CallRecord::new(command.to_string(), response));
            Ok(output)
        }
        Err(err) => {
            history.push(CallRecord::new(command.to_string(), err.to_string()));
            Err(err)
        }
    }
}

/// Locates an executable.
///
/// A `name` containing a path separator is checked as given. Otherwise
/// `search_dir` is tried first, then every directory on `PATH`.
#[must_use]
pub fn find_executable(name: &Path, search_dir: Option<&Path>) -> Option<PathBuf> {
    if name.components().count() > 1 {
        return is_executable(name).then(|| name.to_path_buf());
    }

    let path_dirs = env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).collect::<Vec<_>>())
        .unwrap_or_default();

    search_dir
        .map(Path::to_path_buf)
        .into_iter()
        .chain(path_dirs)
        .flat_map(|dir| candidates(&dir, name))
        .find(|candidate| is_executable(candidate))
}

fn candidates(dir: &Path, name: &Path) -> Vec<PathBuf> {
    let plain = dir.join(name);
    if cfg!(windows) && name.extension().is_none() {
        vec![plain.with_extension("exe"), plain]
    } else {
        vec![plain]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

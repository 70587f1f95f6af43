//! # Shim Process Caller
//!
//! Spawns a pipe-mode shim and exchanges frames with it over the child's
//! stdin/stdout. The child is killed when the caller is dropped.

use std::ffi::OsStr;
use std::fmt;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};

use shim_core::adapters::stdio::{read_response, write_request};
use tracing::debug;

use crate::errors::{CommunicationError, CommunicationResult};

/// A running shim process.
pub struct Caller {
    command: PathBuf,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl fmt::Debug for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caller")
            .field("command", &self.command)
            .field("pid", &self.child.id())
            .finish()
    }
}

impl Caller {
    /// Spawn `command` with no arguments.
    pub fn spawn(command: impl AsRef<Path>) -> CommunicationResult<Self> {
        Self::spawn_with_args(command, std::iter::empty::<&OsStr>())
    }

    /// Spawn `command` with `args`. The child's stderr is inherited.
    pub fn spawn_with_args<I, S>(command: impl AsRef<Path>, args: I) -> CommunicationResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let command = command.as_ref().to_path_buf();
        let mut child = Command::new(&command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| CommunicationError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(CommunicationError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(CommunicationError::MissingPipe("stdout"))?;
        debug!("Spawned {} (pid {})", command.display(), child.id());

        Ok(Self {
            command,
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
        })
    }

    /// Path of the shim executable.
    #[must_use]
    pub fn command(&self) -> &Path {
        &self.command
    }

    /// Send one request and wait for its response.
    ///
    /// An error frame comes back as `CommunicationError::Remote`.
    pub fn run_precompile(&mut self, address: u8, input: &[u8]) -> CommunicationResult<Vec<u8>> {
        let stdin = self.stdin.as_mut().ok_or(CommunicationError::MissingPipe("stdin"))?;
        write_request(stdin, address, input)?;

        read_response(&mut self.stdout)?
            .into_result()
            .map_err(CommunicationError::Remote)
    }

    /// Close the child's stdin and wait for it to exit.
    pub fn shutdown(mut self) -> CommunicationResult<ExitStatus> {
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| CommunicationError::Wire(e.into()))?;
        debug!("{} exited with {}", self.command.display(), status);
        Ok(status)
    }
}

impl Drop for Caller {
    fn drop(&mut self) {
        if self.child.kill().is_ok() {
            let _ = self.child.wait();
        }
    }
}

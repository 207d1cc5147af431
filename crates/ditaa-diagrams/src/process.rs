//! Subprocess execution with piped input.
//!
//! [`run_with_input`] spawns a command, feeds it input on stdin, and captures
//! both output streams.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Failure to run a subprocess.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("cannot run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("communicating with {command} failed: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
}

impl ProcessError {
    /// Whether the executable could not be found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Exit status and captured output of a finished subprocess.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    /// Standard output, decoded lossily as UTF-8.
    pub stdout: String,
    /// Standard error, decoded lossily as UTF-8.
    pub stderr: String,
}

impl CapturedOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Run `command` with `args` in `cwd`, writing `input` to its stdin.
///
/// Stdin is written from a helper thread while the output streams are
/// drained, so a process that produces output before consuming its input
/// cannot deadlock. A process that exits without reading all of its input
/// closes the pipe early; the resulting broken pipe is ignored and the
/// process is still waited for, with everything it wrote captured.
///
/// # Errors
///
/// Returns [`ProcessError::Spawn`] if the process cannot be started
/// (see [`ProcessError::is_not_found`]) and [`ProcessError::Io`] if
/// communicating with it fails.
pub fn run_with_input(
    command: &str,
    args: &[String],
    cwd: &Path,
    input: &[u8],
) -> Result<CapturedOutput, ProcessError> {
    let mut child = Command::new(command)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            command: command.to_owned(),
            source,
        })?;

    let stdin = child.stdin.take();
    let (output, fed) = std::thread::scope(|scope| {
        let feeder = stdin.map(|mut pipe| scope.spawn(move || feed(&mut pipe, input)));
        let output = child.wait_with_output();
        let fed = feeder.map_or(Ok(()), |handle| {
            handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")))
        });
        (output, fed)
    });

    let io_error = |source| ProcessError::Io {
        command: command.to_owned(),
        source,
    };
    let output = output.map_err(io_error)?;
    fed.map_err(io_error)?;

    Ok(CapturedOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Write `input` and close the pipe, tolerating early exit of the reader.
fn feed(pipe: &mut impl Write, input: &[u8]) -> io::Result<()> {
    match pipe.write_all(input).and_then(|()| pipe.flush()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("subprocess closed stdin before reading all input");
            Ok(())
        }
        result => result,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_owned(), script.to_owned()]
    }

    #[test]
    fn test_captures_stdout_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_with_input("sh", &sh("cat; echo oops >&2"), dir.path(), b"hello").unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "hello");
        assert_eq!(out.stderr, "oops\n");
    }

    #[test]
    fn test_runs_in_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_with_input("sh", &sh("touch marker"), dir.path(), b"").unwrap();
        assert!(out.success());
        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn test_nonzero_exit_is_captured() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_with_input("sh", &sh("echo bad >&2; exit 3"), dir.path(), b"").unwrap();
        assert!(!out.success());
        assert_eq!(out.status.code(), Some(3));
        assert_eq!(out.stderr, "bad\n");
    }

    #[test]
    fn test_early_exit_without_reading_stdin() {
        let dir = tempfile::tempdir().unwrap();
        // Larger than a pipe buffer, so the writer hits a closed pipe
        let input = vec![b'x'; 1 << 20];
        let out = run_with_input("sh", &sh("echo early; exit 0"), dir.path(), &input).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "early\n");
    }

    #[test]
    fn test_missing_executable() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_with_input("ditaa-docs-no-such-binary", &[], dir.path(), b"").unwrap_err();
        assert!(err.is_not_found());
    }
}

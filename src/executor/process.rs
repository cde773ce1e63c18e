//! Process execution for `run` commands
//!
//! Commands are started directly, without a shell, with the program and
//! arguments obtained by splitting the script on whitespace. Quotes and
//! escapes are not interpreted: `echo "a b"` runs `echo` with the two
//! arguments `"a` and `b"`.
//!
//! Standard streams are inherited from the calling process, so nothing is
//! captured and output appears as the child writes it.

use crate::pipeline::CommandError;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Splits a script into a program name and its arguments
#[must_use]
pub fn split_script(script: &str) -> (String, Vec<String>) {
    let mut parts = script.split_whitespace().map(str::to_string);
    let program = parts.next().unwrap_or_default();
    (program, parts.collect())
}

/// Result of a finished process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,

    /// Wall clock time between spawn and exit
    pub duration: Duration,
}

impl ProcessExit {
    /// Returns true if the process exited with code 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Spawns `program` in `cwd` with inherited standard streams and waits for
/// it to exit.
///
/// There is no timeout: a child that never exits blocks the caller.
///
/// # Errors
///
/// Returns [`CommandError::Spawn`] if the process cannot be started.
pub async fn spawn_inherited(
    program: &str,
    args: &[String],
    cwd: &Path,
) -> Result<ProcessExit, CommandError> {
    tracing::debug!(program = %program, args = ?args, cwd = %cwd.display(), "Spawning process");

    let start = Instant::now();
    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .status()
        .await
        .map_err(|e| CommandError::Spawn {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

    Ok(ProcessExit {
        code: status.code(),
        duration: start.elapsed(),
    })
}

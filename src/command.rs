//! Process execution for the `az` CLI, behind a runner trait so tests can
//! substitute scripted output.

use std::ffi::OsString;
use std::process::{Command, Output, Stdio};

use thiserror::Error;

/// Environment applied to every spawned process: no colour codes in
/// captured stderr, and no interactive survey prompts.
const NON_INTERACTIVE_ENV: [(&str, &str); 2] = [
    ("AZURE_CORE_NO_COLOR", "true"),
    ("AZURE_CORE_SURVEY_MESSAGE", "false"),
];

/// Captured exit code and text streams of a finished process.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Standard output, lossily decoded as UTF-8.
    pub stdout: String,
    /// Standard error, lossily decoded as UTF-8.
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the process exited with code zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.code, Some(0))
    }

    /// Exit code as text, or `unknown` for signal termination.
    #[must_use]
    pub fn status_text(&self) -> String {
        self.code
            .map_or_else(|| String::from("unknown"), |code| code.to_string())
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Failure to start a process at all.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CommandError {
    /// The executable could not be spawned, usually because it is missing.
    #[error("failed to spawn {program}: {message}")]
    Spawn {
        /// Executable that was requested.
        program: String,
        /// OS error text.
        message: String,
    },
}

/// Runs an external program to completion and captures its output.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args`.
    ///
    /// A non-zero exit is not an error at this level; callers inspect
    /// [`CommandOutput::code`].
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Spawn`] when the process cannot be started.
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, CommandError>;
}

/// Runner backed by [`std::process::Command`].
///
/// Stdin is closed so an `az` login prompt fails fast instead of hanging.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, CommandError> {
        Command::new(program)
            .args(args)
            .envs(NON_INTERACTIVE_ENV)
            .stdin(Stdio::null())
            .output()
            .map(CommandOutput::from)
            .map_err(|err| CommandError::Spawn {
                program: program.to_owned(),
                message: err.to_string(),
            })
    }
}

//! Error types for the Azure CLI gateway.

use thiserror::Error;

use crate::command::CommandError;
use crate::config::ConfigError;

/// Errors raised by [`super::AzCliGateway`].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum AzCliError {
    /// Raised when the gateway configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Raised when `az` returns a non-zero exit status.
    #[error("{program} exited with status {status_text}: {stderr}")]
    CommandFailure {
        /// Program that failed (typically `az`).
        program: String,
        /// Exit status reported by the OS.
        status: Option<i32>,
        /// Human readable representation of the exit status.
        status_text: String,
        /// Stderr captured from the command, prefixed with the operation.
        stderr: String,
    },
    /// Raised when JSON output from the CLI cannot be parsed.
    #[error("failed to parse {resource} output: {message}")]
    Parse {
        /// Resource type being parsed (for example `disk`).
        resource: String,
        /// Parser error message.
        message: String,
    },
    /// Raised when the CLI output parses but lacks a required value.
    #[error("{resource} output is missing {field}")]
    MissingValue {
        /// Resource type being read.
        resource: String,
        /// Field that was absent.
        field: String,
    },
    /// Raised when command execution fails.
    #[error(transparent)]
    Runner(#[from] CommandError),
}

//! Error types for the smoke suite
//!
//! The taxonomy distinguishes "the bosh CLI could not be launched" from
//! "the CLI ran and signalled failure", because checks that expect a
//! failing deploy need to tell the two apart.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the smoke suite
#[derive(Error, Debug)]
pub enum Error {
    // === CLI invocation errors ===
    #[error("Failed to launch '{binary} {subcommand}': {source}")]
    Exec {
        binary: String,
        subcommand: String,
        #[source]
        source: io::Error,
    },

    #[error("'{subcommand}' exited with status {exit_status}\nstdout: {stdout}\nstderr: {stderr}")]
    CommandFailed {
        subcommand: String,
        exit_status: i32,
        stdout: String,
        stderr: String,
    },

    // === Assertion errors ===
    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Timed out after {elapsed:?} waiting for {what}. Last observed: {last_observed}")]
    PollTimeout {
        what: String,
        elapsed: Duration,
        last_observed: String,
    },

    // === Configuration errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("bosh CLI '{name}' not found in PATH")]
    BoshNotFound { name: String },

    #[error("Unknown check '{0}'. Use 'stemcell-smoke list' to see available checks")]
    UnknownCheck(String),

    // === IO errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create an assertion error from expected/actual values
    pub fn assertion(description: &str, expected: &str, actual: &str) -> Self {
        Self::Assertion(format!(
            "{description}\n  expected: {expected}\n  actual:   {actual}"
        ))
    }

    /// True when the error is a command that ran but exited non-zero,
    /// as opposed to a launch failure
    pub fn is_command_failure(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }
}

//! Error types for service-manager invocations.

use std::io;

use thiserror::Error;

/// Errors raised while running `systemctl` or `launchctl`.
#[derive(Debug, Error)]
pub enum ServiceCommandError {
    /// The service manager could not be spawned.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        /// Program that was attempted.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },
    /// The service manager exited unsuccessfully.
    #[error("'{command}' failed ({status}): {stderr}")]
    Status {
        /// Full command line that ran.
        command: String,
        /// Exit status as reported by the process.
        status: String,
        /// Trimmed standard error captured from the command.
        stderr: String,
    },
}

impl ServiceCommandError {
    /// Returns true when the service manager itself is not installed.
    pub(crate) fn is_missing_program(&self) -> bool {
        matches!(self, Self::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

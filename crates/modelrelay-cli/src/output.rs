//! Line-oriented writers for user-facing output.

use std::fmt;
use std::io::Write;

use crate::AppError;

/// Borrowed stdout and stderr handles used by the dispatcher.
pub struct OutputSink<W: Write, E: Write> {
    stdout: W,
    stderr: E,
}

impl<W: Write, E: Write> OutputSink<W, E> {
    /// Wraps the two streams.
    pub const fn new(stdout: W, stderr: E) -> Self {
        Self { stdout, stderr }
    }

    /// Writes one line to stdout and flushes it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Output`] when the stream rejects the write.
    pub fn stdout_line(&mut self, args: fmt::Arguments<'_>) -> Result<(), AppError> {
        write_line(&mut self.stdout, args)
    }

    /// Writes one line to stderr and flushes it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Output`] when the stream rejects the write.
    pub fn stderr_line(&mut self, args: fmt::Arguments<'_>) -> Result<(), AppError> {
        write_line(&mut self.stderr, args)
    }

    /// Stdout handle for block writers such as the help text.
    pub fn stdout(&mut self) -> &mut W {
        &mut self.stdout
    }
}

fn write_line<T: Write>(stream: &mut T, args: fmt::Arguments<'_>) -> Result<(), AppError> {
    stream.write_fmt(args).map_err(AppError::Output)?;
    stream.write_all(b"\n").map_err(AppError::Output)?;
    stream.flush().map_err(AppError::Output)
}

//! First-run onboarding shown by `modelrelay onboard`.
//!
//! The dispatcher only needs a yes/no answer: should the router start now?
//! The terminal implementation asks that question on the given streams.

use std::cell::RefCell;
use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};

use thiserror::Error;
use tracing::debug;

/// Errors raised while talking to the user.
#[derive(Debug, Error)]
pub enum OnboardingError {
    /// Writing the prompt failed.
    #[error("failed to write onboarding prompt: {0}")]
    Prompt(#[source] io::Error),
    /// Reading the answer failed.
    #[error("failed to read onboarding answer: {0}")]
    Read(#[source] io::Error),
}

/// Onboarding collaborator consulted before launching the router.
#[cfg_attr(test, mockall::automock)]
pub trait Onboarding {
    /// Runs onboarding for a router that would listen on `port`.
    ///
    /// Returns `true` when the router should start afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardingError`] when the conversation cannot be held.
    fn run(&self, port: u16) -> Result<bool, OnboardingError>;
}

/// Interactive onboarding over a reader and writer.
pub struct TerminalOnboarding<R: BufRead, W: Write> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl TerminalOnboarding<StdinLock<'static>, Stdout> {
    /// Onboarding bound to the process terminal.
    #[must_use]
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalOnboarding<R, W> {
    /// Wraps explicit streams.
    pub const fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    /// Returns the output stream, consuming the onboarding.
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    fn write(&self, args: std::fmt::Arguments<'_>) -> Result<(), OnboardingError> {
        let mut output = self.output.borrow_mut();
        output.write_fmt(args).map_err(OnboardingError::Prompt)?;
        output.flush().map_err(OnboardingError::Prompt)
    }

    fn read_answer(&self) -> Result<Option<String>, OnboardingError> {
        let mut line = String::new();
        let read = self
            .input
            .borrow_mut()
            .read_line(&mut line)
            .map_err(OnboardingError::Read)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_ascii_lowercase()))
    }
}

impl<R: BufRead, W: Write> Onboarding for TerminalOnboarding<R, W> {
    fn run(&self, port: u16) -> Result<bool, OnboardingError> {
        self.write(format_args!(
            "Welcome to modelrelay.\n\
             The router serves an OpenAI-compatible API and dashboard on http://127.0.0.1:{port}/\n\
             Run `modelrelay install --autostart` to start it at login.\n\n"
        ))?;

        loop {
            self.write(format_args!("Start the router now? [Y/n] "))?;
            let Some(answer) = self.read_answer()? else {
                self.write(format_args!("\n"))?;
                debug!("onboarding input closed; not starting the router");
                return Ok(false);
            };
            match answer.as_str() {
                "" | "y" | "yes" => return Ok(true),
                "n" | "no" => {
                    self.write(format_args!(
                        "Run `modelrelay --port {port}` whenever you are ready.\n"
                    ))?;
                    return Ok(false);
                }
                _ => self.write(format_args!("Please answer y or n.\n"))?,
            }
        }
    }
}

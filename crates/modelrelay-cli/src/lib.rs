//! Command-line runtime for the modelrelay router.
//!
//! The runtime splits leading configuration flags off the arguments, resolves
//! the rest into a single [`Intent`], and hands it to the [`Dispatcher`],
//! which talks to the autostart, onboarding, and router collaborators. Every
//! collaborator sits behind a trait so tests can drive the whole flow without
//! touching the host.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use tracing::error;

mod autostart;
mod cli;
mod config;
mod dispatch;
mod errors;
mod help;
mod intent;
mod onboarding;
mod output;
mod router;
mod telemetry;

pub use autostart::{
    AutostartAction, AutostartManager, AutostartOutcome, AutostartPrimitives,
    ProcessServiceCommand, ServiceCommand, ServiceCommandError, SystemAutostart,
};
use config::split_config_arguments;
pub use config::{ConfigLoader, OrthoConfigLoader};
pub use dispatch::Dispatcher;
pub use errors::AppError;
pub use intent::{BannedModels, Intent, ResolveError, RouterOptions, resolve};
pub use onboarding::{Onboarding, OnboardingError, TerminalOnboarding};
pub use output::OutputSink;
pub use router::{LaunchOptions, ProcessRouterLauncher, RouterError, RouterLauncher};
pub use telemetry::TelemetryError;

/// Runs the CLI against the host collaborators.
///
/// `args` includes the program name. Failures are written to `stderr` and
/// reported through the returned exit code.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let autostart = AutostartManager::new(SystemAutostart::detect());
    let onboarding = TerminalOnboarding::stdio();
    let router = ProcessRouterLauncher::new();
    let dispatcher = Dispatcher::new(&autostart, &onboarding, &router, &OrthoConfigLoader);
    run_with_dispatcher(args, &dispatcher, stdout, stderr)
}

/// Runs the CLI with explicit collaborators.
#[must_use]
pub fn run_with_dispatcher<I, W, E, P, O, R, L>(
    args: I,
    dispatcher: &Dispatcher<'_, P, O, R, L>,
    stdout: &mut W,
    stderr: &mut E,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    P: AutostartPrimitives,
    O: Onboarding,
    R: RouterLauncher,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let mut output = OutputSink::new(stdout, stderr);

    let result = resolve(&split.command_arguments)
        .map_err(AppError::from)
        .and_then(|intent| dispatcher.dispatch(intent, &split.config_arguments, &mut output));

    match result {
        Ok(exit_code) => exit_code,
        Err(failure) => {
            if let Err(write_error) = output.stderr_line(format_args!("{failure}")) {
                error!(%failure, %write_error, "could not report failure");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests;

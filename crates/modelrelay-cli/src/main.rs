//! CLI entrypoint for modelrelay.
//!
//! The binary delegates to [`modelrelay_cli::run`], which resolves the
//! arguments and either prints help, manages start-on-login, runs
//! onboarding, or launches the router.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    modelrelay_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}

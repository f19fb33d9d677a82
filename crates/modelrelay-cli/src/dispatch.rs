//! Turns a resolved [`Intent`] into side effects and an exit code.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use modelrelay_config::{Config, DEFAULT_ROUTER_PORT};
use tracing::{debug, warn};

use crate::autostart::{AutostartAction, AutostartManager, AutostartPrimitives};
use crate::config::ConfigLoader;
use crate::help::{build_localizer, write_help};
use crate::intent::{Intent, RouterOptions};
use crate::onboarding::Onboarding;
use crate::output::OutputSink;
use crate::router::{LaunchOptions, RouterLauncher};
use crate::{AppError, telemetry};

/// Collaborators needed to carry out any intent.
pub struct Dispatcher<'a, P, O, R, L> {
    autostart: &'a AutostartManager<P>,
    onboarding: &'a O,
    router: &'a R,
    loader: &'a L,
}

impl<'a, P, O, R, L> Dispatcher<'a, P, O, R, L>
where
    P: AutostartPrimitives,
    O: Onboarding,
    R: RouterLauncher,
    L: ConfigLoader,
{
    /// Bundles the collaborators.
    pub const fn new(
        autostart: &'a AutostartManager<P>,
        onboarding: &'a O,
        router: &'a R,
        loader: &'a L,
    ) -> Self {
        Self {
            autostart,
            onboarding,
            router,
            loader,
        }
    }

    /// Carries out `intent`.
    ///
    /// `config_arguments` holds the program name and leading configuration
    /// flags. Help never reads them; autostart actions use them for logging
    /// only and fall back to defaults when they do not load.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] for startup failures; failed autostart outcomes
    /// are reported on stderr and surface as a failing exit code instead.
    pub fn dispatch<W: Write, E: Write>(
        &self,
        intent: Intent,
        config_arguments: &[OsString],
        output: &mut OutputSink<W, E>,
    ) -> Result<ExitCode, AppError> {
        debug!(?intent, "dispatching");
        match intent {
            Intent::ShowHelp => {
                let localizer = build_localizer();
                write_help(output.stdout(), localizer.as_ref()).map_err(AppError::Output)?;
                Ok(ExitCode::SUCCESS)
            }
            Intent::Autostart(action) => {
                self.initialise_logging(config_arguments)?;
                self.run_autostart(action, output)
            }
            Intent::Onboard(options) => {
                let port = options.port_or(DEFAULT_ROUTER_PORT);
                if !self.onboarding.run(port)? {
                    debug!("onboarding finished without starting the router");
                    return Ok(ExitCode::SUCCESS);
                }
                self.run_router(&options, config_arguments)
            }
            Intent::RunRouter(options) => self.run_router(&options, config_arguments),
        }
    }

    fn initialise_logging(&self, config_arguments: &[OsString]) -> Result<(), AppError> {
        match self.loader.load(config_arguments) {
            Ok(config) => telemetry::initialise(&config)?,
            Err(error) => {
                telemetry::initialise(&Config::default())?;
                warn!(%error, "configuration did not load; logging with defaults");
            }
        }
        Ok(())
    }

    fn run_autostart<W: Write, E: Write>(
        &self,
        action: AutostartAction,
        output: &mut OutputSink<W, E>,
    ) -> Result<ExitCode, AppError> {
        let outcome = self.autostart.run(action);
        if !outcome.ok() {
            output.stderr_line(format_args!("{}", outcome.message()))?;
            return Ok(ExitCode::FAILURE);
        }

        output.stdout_line(format_args!("{}", outcome.message()))?;
        if let Some(path) = outcome.path() {
            output.stdout_line(format_args!("Path: {}", path.display()))?;
        }
        Ok(ExitCode::SUCCESS)
    }

    fn run_router(
        &self,
        options: &RouterOptions,
        config_arguments: &[OsString],
    ) -> Result<ExitCode, AppError> {
        let config = self.loader.load(config_arguments)?;
        telemetry::initialise(&config)?;
        let launch = LaunchOptions {
            port: options.port_or(DEFAULT_ROUTER_PORT),
            log_enabled: options.log_enabled.unwrap_or(false),
            banned_model_ids: options.banned_model_ids.clone(),
        };
        self.router.launch(&config, &launch)?;
        Ok(ExitCode::SUCCESS)
    }
}

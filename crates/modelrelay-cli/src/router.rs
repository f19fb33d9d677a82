//! Launches the long-running router process.
//!
//! The router binary is resolved from an explicit override, then the
//! configured `router_binary`, then `MODELRELAY_ROUTER_BIN`, and finally the
//! default `modelrelay-router` on `PATH`. The child inherits the terminal and
//! the CLI waits for it to exit.

use std::env;
use std::ffi::{OsStr, OsString};
use std::io;
use std::process::{Command, ExitStatus, Stdio};

use modelrelay_config::{Config, DEFAULT_ROUTER_BINARY, ROUTER_BINARY_ENV};
use thiserror::Error;
use tracing::{debug, info};

use crate::intent::BannedModels;

/// Fully resolved router settings passed to the launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Port the router binds.
    pub port: u16,
    /// Whether request payloads are logged to the terminal.
    pub log_enabled: bool,
    /// Models kept banned for this run.
    pub banned_model_ids: BannedModels,
}

impl LaunchOptions {
    /// Arguments forwarded to the router executable.
    #[must_use]
    pub fn to_arguments(&self) -> Vec<OsString> {
        let mut arguments = vec![
            OsString::from("--port"),
            OsString::from(self.port.to_string()),
            OsString::from(if self.log_enabled { "--log" } else { "--no-log" }),
        ];
        if !self.banned_model_ids.is_empty() {
            arguments.push(OsString::from("--ban"));
            arguments.push(OsString::from(self.banned_model_ids.joined()));
        }
        arguments
    }
}

/// Errors raised while running the router.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The router executable could not be spawned.
    #[error("failed to launch router binary '{}': {source}", .binary.to_string_lossy())]
    Launch {
        /// Executable that was attempted.
        binary: OsString,
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },
    /// Waiting on the router process failed.
    #[error("failed to wait for the router: {0}")]
    Wait(#[source] io::Error),
    /// The router exited unsuccessfully.
    #[error("router exited with {status}")]
    Exited {
        /// Exit status reported by the child.
        status: ExitStatus,
    },
}

/// Router-launch collaborator.
#[cfg_attr(test, mockall::automock)]
pub trait RouterLauncher {
    /// Runs the router until it exits.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError`] when the router cannot be started or exits
    /// unsuccessfully.
    fn launch(&self, config: &Config, options: &LaunchOptions) -> Result<(), RouterError>;
}

/// Spawns the router as a child process and waits for it.
#[derive(Debug, Default, Clone)]
pub struct ProcessRouterLauncher {
    binary_override: Option<OsString>,
}

impl ProcessRouterLauncher {
    /// Launcher that resolves the router binary from configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            binary_override: None,
        }
    }

    /// Launcher that always runs `binary`.
    #[must_use]
    pub fn with_binary(binary: impl Into<OsString>) -> Self {
        Self {
            binary_override: Some(binary.into()),
        }
    }

    fn resolve_binary(&self, config: &Config) -> OsString {
        resolve_router_binary(
            self.binary_override.as_deref(),
            config,
            env::var_os(ROUTER_BINARY_ENV),
        )
    }
}

impl RouterLauncher for ProcessRouterLauncher {
    fn launch(&self, config: &Config, options: &LaunchOptions) -> Result<(), RouterError> {
        let binary = self.resolve_binary(config);
        let arguments = options.to_arguments();
        info!(
            binary = %binary.to_string_lossy(),
            port = options.port,
            "launching router"
        );
        debug!(?arguments, "router arguments");

        let mut child = Command::new(&binary)
            .args(&arguments)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| RouterError::Launch {
                binary: binary.clone(),
                source,
            })?;
        let status = child.wait().map_err(RouterError::Wait)?;
        if status.success() {
            Ok(())
        } else {
            Err(RouterError::Exited { status })
        }
    }
}

fn resolve_router_binary(
    binary_override: Option<&OsStr>,
    config: &Config,
    from_env: Option<OsString>,
) -> OsString {
    binary_override
        .map(OsString::from)
        .or_else(|| {
            config
                .router_binary()
                .map(|path| OsString::from(path.as_str()))
        })
        .or(from_env)
        .unwrap_or_else(|| OsString::from(DEFAULT_ROUTER_BINARY))
}

//! Default autostart primitives backed by the host service manager.
//!
//! Linux registers a systemd user unit and macOS a launchd agent; the paths
//! come from [`AutostartPaths`]. Service-manager calls go through
//! [`ServiceCommand`] so the primitives can be exercised without touching the
//! host.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use modelrelay_config::{
    AutostartKind, AutostartPaths, AutostartPathsError, LAUNCHD_LABEL, SYSTEMD_UNIT_NAME,
};
use tracing::{debug, warn};

use super::error::ServiceCommandError;
use super::manager::AutostartPrimitives;
use super::types::AutostartOutcome;

const SYSTEMCTL: &str = "systemctl";
const LAUNCHCTL: &str = "launchctl";

/// Runs a service-manager command to completion.
pub trait ServiceCommand {
    /// Runs `program` with `args`, failing on spawn errors or a non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceCommandError`] when the program cannot be spawned or
    /// exits unsuccessfully.
    fn run(&self, program: &str, args: &[&str]) -> Result<(), ServiceCommandError>;
}

/// Spawns the service manager as a child process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessServiceCommand;

impl ServiceCommand for ProcessServiceCommand {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), ServiceCommandError> {
        debug!(program, ?args, "running service manager");
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ServiceCommandError::Spawn {
                program: program.to_owned(),
                source,
            })?;
        if output.status.success() {
            return Ok(());
        }
        Err(ServiceCommandError::Status {
            command: render_command(program, args),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }
}

pub(crate) fn render_command(program: &str, args: &[&str]) -> String {
    let mut rendered = program.to_owned();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

/// Autostart primitives for the current host.
#[derive(Debug)]
pub struct SystemAutostart<C = ProcessServiceCommand> {
    paths: Result<AutostartPaths, AutostartPathsError>,
    program: Option<PathBuf>,
    command: C,
}

impl SystemAutostart<ProcessServiceCommand> {
    /// Detects the platform backend and registers the running executable.
    #[must_use]
    pub fn detect() -> Self {
        let program = match env::current_exe() {
            Ok(path) => Some(path),
            Err(error) => {
                debug!(%error, "could not resolve the current executable");
                None
            }
        };
        Self::new(AutostartPaths::detect(), program, ProcessServiceCommand)
    }
}

impl<C: ServiceCommand> SystemAutostart<C> {
    /// Builds primitives over explicit paths, executable and command runner.
    pub const fn new(
        paths: Result<AutostartPaths, AutostartPathsError>,
        program: Option<PathBuf>,
        command: C,
    ) -> Self {
        Self {
            paths,
            program,
            command,
        }
    }

    fn register(&self, paths: &AutostartPaths) -> Result<(), ServiceCommandError> {
        match paths.kind() {
            AutostartKind::Systemd => {
                self.command.run(SYSTEMCTL, &["--user", "daemon-reload"])?;
                self.command
                    .run(SYSTEMCTL, &["--user", "enable", SYSTEMD_UNIT_NAME])
            }
            // `RunAtLoad` in the agent covers login; nothing to register.
            AutostartKind::Launchd => Ok(()),
        }
    }

    fn launch(&self, paths: &AutostartPaths) -> Result<(), ServiceCommandError> {
        match paths.kind() {
            AutostartKind::Systemd => self
                .command
                .run(SYSTEMCTL, &["--user", "start", SYSTEMD_UNIT_NAME]),
            AutostartKind::Launchd => {
                let plist = paths.service_file().to_string_lossy();
                self.command.run(LAUNCHCTL, &["load", "-w", &*plist])
            }
        }
    }

    fn deregister(&self, paths: &AutostartPaths) -> Result<(), ServiceCommandError> {
        match paths.kind() {
            AutostartKind::Systemd => {
                self.command
                    .run(SYSTEMCTL, &["--user", "disable", "--now", SYSTEMD_UNIT_NAME])
            }
            AutostartKind::Launchd => {
                let plist = paths.service_file().to_string_lossy();
                self.command.run(LAUNCHCTL, &["unload", "-w", &*plist])
            }
        }
    }

    fn reload(&self, paths: &AutostartPaths) -> Result<(), ServiceCommandError> {
        match paths.kind() {
            AutostartKind::Systemd => self.command.run(SYSTEMCTL, &["--user", "daemon-reload"]),
            AutostartKind::Launchd => Ok(()),
        }
    }
}

impl<C: ServiceCommand> AutostartPrimitives for SystemAutostart<C> {
    fn status(&self) -> AutostartOutcome {
        let paths = match &self.paths {
            Ok(paths) => paths,
            Err(error) => return AutostartOutcome::unavailable(unavailable_message(error)),
        };
        if paths.service_file().is_file() {
            AutostartOutcome::succeeded_at(
                paths.service_file(),
                format!("Autostart is installed ({}).", paths.kind()),
            )
        } else {
            AutostartOutcome::succeeded(
                "Autostart is not installed. Run 'modelrelay install --autostart' to enable it.",
            )
        }
    }

    fn install(&self) -> AutostartOutcome {
        let paths = match &self.paths {
            Ok(paths) => paths,
            Err(error) => return AutostartOutcome::unsupported(unavailable_message(error)),
        };
        let Some(program) = self.program.as_deref() else {
            return AutostartOutcome::failed(
                "Could not determine the modelrelay executable to register at login.",
            );
        };

        let contents = render_service_file(paths.kind(), program);
        let changed = match write_if_changed(paths, &contents) {
            Ok(changed) => changed,
            Err(error) => {
                return AutostartOutcome::failed(format!(
                    "Failed to write {}: {error}",
                    paths.service_file().display()
                ));
            }
        };
        if let Err(error) = self.register(paths) {
            if changed {
                discard_service_file(paths);
            }
            return command_failure("Could not enable autostart", &error);
        }

        let message = if changed {
            format!(
                "Autostart installed ({}): modelrelay will start at login.",
                paths.kind()
            )
        } else {
            format!("Autostart is already installed ({}).", paths.kind())
        };
        AutostartOutcome::succeeded_at(paths.service_file(), message)
    }

    fn start(&self) -> AutostartOutcome {
        let paths = match &self.paths {
            Ok(paths) => paths,
            Err(error) => return AutostartOutcome::unsupported(unavailable_message(error)),
        };
        if !paths.service_file().is_file() {
            return AutostartOutcome::failed(
                "Autostart is not installed; run 'modelrelay install --autostart' first.",
            );
        }
        match self.launch(paths) {
            Ok(()) => AutostartOutcome::succeeded(format!(
                "Started the modelrelay {} now.",
                paths.kind()
            )),
            Err(error) => command_failure("Could not start the router", &error),
        }
    }

    fn uninstall(&self) -> AutostartOutcome {
        let paths = match &self.paths {
            Ok(paths) => paths,
            Err(error) => {
                return AutostartOutcome::unavailable(format!(
                    "{} Nothing to remove.",
                    unavailable_message(error)
                ));
            }
        };
        if !paths.service_file().is_file() {
            return AutostartOutcome::succeeded("Autostart is not installed; nothing to remove.");
        }

        let mut message = format!("Autostart removed ({}).", paths.kind());
        if let Err(error) = self.deregister(paths) {
            warn!(%error, "service manager did not release the login item");
            message.push_str(&format!(
                "\nWarning: the service manager did not release the login item: {error}"
            ));
        }
        if let Err(error) = fs::remove_file(paths.service_file()) {
            return AutostartOutcome::failed(format!(
                "Failed to remove {}: {error}",
                paths.service_file().display()
            ));
        }
        if let Err(error) = self.reload(paths) {
            warn!(%error, "systemd did not reload after removing the unit");
            message.push_str(&format!(
                "\nWarning: systemd did not reload after removing the unit: {error}"
            ));
        }
        AutostartOutcome::succeeded(message)
    }
}

fn unavailable_message(error: &AutostartPathsError) -> String {
    format!("Autostart is unavailable: {error}.")
}

fn command_failure(context: &str, error: &ServiceCommandError) -> AutostartOutcome {
    let message = format!("{context}: {error}");
    if error.is_missing_program() {
        AutostartOutcome::unsupported(message)
    } else {
        AutostartOutcome::failed(message)
    }
}

/// Removes a registration file written by an install that could not enable it.
fn discard_service_file(paths: &AutostartPaths) {
    if let Err(error) = fs::remove_file(paths.service_file()) {
        warn!(
            %error,
            path = %paths.service_file().display(),
            "could not remove the unregistered autostart file"
        );
    }
}

/// Writes the registration file unless it already holds `contents`.
///
/// Returns whether the file changed.
fn write_if_changed(paths: &AutostartPaths, contents: &str) -> io::Result<bool> {
    if fs::read_to_string(paths.service_file()).is_ok_and(|existing| existing == contents) {
        return Ok(false);
    }
    fs::create_dir_all(paths.service_dir())?;
    fs::write(paths.service_file(), contents)?;
    Ok(true)
}

fn render_service_file(kind: AutostartKind, program: &Path) -> String {
    match kind {
        AutostartKind::Systemd => render_systemd_unit(program),
        AutostartKind::Launchd => render_launchd_plist(program),
    }
}

fn render_systemd_unit(program: &Path) -> String {
    format!(
        "[Unit]\n\
         Description=modelrelay router\n\
         After=network-online.target\n\
         \n\
         [Service]\n\
         Type=simple\n\
         ExecStart=\"{}\"\n\
         Restart=on-failure\n\
         RestartSec=5\n\
         \n\
         [Install]\n\
         WantedBy=default.target\n",
        systemd_escape(&program.to_string_lossy())
    )
}

fn render_launchd_plist(program: &Path) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
  <dict>
    <key>Label</key>
    <string>{LAUNCHD_LABEL}</string>
    <key>ProgramArguments</key>
    <array>
      <string>{}</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
    <key>KeepAlive</key>
    <dict>
      <key>SuccessfulExit</key>
      <false/>
    </dict>
  </dict>
</plist>
"#,
        xml_escape(&program.to_string_lossy())
    )
}

fn systemd_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '%' => escaped.push_str("%%"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

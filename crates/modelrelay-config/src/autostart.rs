//! Derives where the start-on-login registration lives on each platform.
//!
//! Linux hosts register a systemd user unit, macOS hosts a launchd agent.
//! Other platforms have no supported login mechanism and surface
//! [`AutostartPathsError::UnsupportedPlatform`] so callers can report it.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// File name of the systemd user unit.
pub const SYSTEMD_UNIT_NAME: &str = "modelrelay.service";

/// Label of the launchd agent; also the stem of its property list.
pub const LAUNCHD_LABEL: &str = "io.modelrelay.router";

/// Service manager responsible for the login registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutostartKind {
    /// systemd user instance (`systemctl --user`).
    Systemd,
    /// launchd per-user agent.
    Launchd,
}

impl fmt::Display for AutostartKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Systemd => formatter.write_str("systemd user service"),
            Self::Launchd => formatter.write_str("launchd agent"),
        }
    }
}

/// Canonical location of the login registration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutostartPaths {
    kind: AutostartKind,
    service_dir: PathBuf,
    service_file: PathBuf,
}

impl AutostartPaths {
    /// Derives the registration paths for the current platform.
    ///
    /// # Errors
    ///
    /// Returns [`AutostartPathsError::UnsupportedPlatform`] on platforms with no
    /// supported login mechanism, and
    /// [`AutostartPathsError::MissingDirectory`] when the user's base
    /// directory cannot be determined.
    pub fn detect() -> Result<Self, AutostartPathsError> {
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir()
                .map(|dir| Self::systemd(&dir))
                .ok_or(AutostartPathsError::MissingDirectory {
                    kind: "configuration",
                })
        }

        #[cfg(target_os = "macos")]
        {
            dirs::home_dir()
                .map(|dir| Self::launchd(&dir))
                .ok_or(AutostartPathsError::MissingDirectory { kind: "home" })
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            Err(AutostartPathsError::UnsupportedPlatform {
                os: std::env::consts::OS,
            })
        }
    }

    /// Paths for a systemd user unit below `config_dir` (usually
    /// `$XDG_CONFIG_HOME`).
    #[must_use]
    pub fn systemd(config_dir: &Path) -> Self {
        let service_dir = config_dir.join("systemd").join("user");
        Self {
            kind: AutostartKind::Systemd,
            service_file: service_dir.join(SYSTEMD_UNIT_NAME),
            service_dir,
        }
    }

    /// Paths for a launchd agent below the user's `home` directory.
    #[must_use]
    pub fn launchd(home: &Path) -> Self {
        let service_dir = home.join("Library").join("LaunchAgents");
        Self {
            kind: AutostartKind::Launchd,
            service_file: service_dir.join(format!("{LAUNCHD_LABEL}.plist")),
            service_dir,
        }
    }

    /// Service manager owning the registration.
    #[must_use]
    pub const fn kind(&self) -> AutostartKind {
        self.kind
    }

    /// Directory that holds the registration file.
    #[must_use]
    pub fn service_dir(&self) -> &Path {
        self.service_dir.as_path()
    }

    /// Path to the unit or property list.
    #[must_use]
    pub fn service_file(&self) -> &Path {
        self.service_file.as_path()
    }
}

/// Errors raised while deriving autostart paths.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutostartPathsError {
    /// The platform has no supported start-on-login mechanism.
    #[error("start on login is not supported on {os}")]
    UnsupportedPlatform {
        /// Operating system identifier reported by the standard library.
        os: &'static str,
    },
    /// A base directory needed for the registration could not be found.
    #[error("could not determine the user's {kind} directory")]
    MissingDirectory {
        /// Which base directory was missing.
        kind: &'static str,
    },
}

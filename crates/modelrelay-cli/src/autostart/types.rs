//! Autostart action and outcome models.
//!
//! Outcomes are plain values: each lifecycle operation builds a fresh one and
//! composition derives a new outcome from its parts instead of editing them.

use std::fmt;
use std::path::{Path, PathBuf};

/// Lifecycle operation requested against the login registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutostartAction {
    /// Register at login and start immediately.
    Install,
    /// Start the registered service now.
    Start,
    /// Remove the login registration.
    Uninstall,
    /// Report the current registration.
    Status,
}

impl AutostartAction {
    /// Every action, in help-text order.
    pub const ALL: [Self; 4] = [Self::Install, Self::Start, Self::Uninstall, Self::Status];
}

impl fmt::Display for AutostartAction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Install => formatter.write_str("install"),
            Self::Start => formatter.write_str("start"),
            Self::Uninstall => formatter.write_str("uninstall"),
            Self::Status => formatter.write_str("status"),
        }
    }
}

/// Result of a lifecycle operation.
///
/// A failed outcome never carries a path; the constructors are the only way
/// to build one so the rule holds everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutostartOutcome {
    ok: bool,
    supported: bool,
    path: Option<PathBuf>,
    message: String,
}

impl AutostartOutcome {
    /// Successful operation with nothing on disk to point at.
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            supported: true,
            path: None,
            message: message.into(),
        }
    }

    /// Successful operation whose registration lives at `path`.
    pub fn succeeded_at(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            supported: true,
            path: Some(path.into()),
            message: message.into(),
        }
    }

    /// Operation failed on a host that supports autostart.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            supported: true,
            path: None,
            message: message.into(),
        }
    }

    /// Operation could not run because the host lacks the capability.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            supported: false,
            path: None,
            message: message.into(),
        }
    }

    /// Read-only or no-op operation that succeeded on a host without autostart.
    ///
    /// `status` uses this to report that it determined autostart is
    /// unavailable; `uninstall` uses it because there is nothing to remove.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            supported: false,
            path: None,
            message: message.into(),
        }
    }

    /// Whether the operation achieved its goal.
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.ok
    }

    /// Whether the host supports autostart at all.
    #[must_use]
    pub const fn supported(&self) -> bool {
        self.supported
    }

    /// Registration file the operation touched, when it succeeded.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Human-readable description of what happened.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Joins a successful install with the immediate start that followed it.
    ///
    /// The result is always successful and keeps the install's `supported`
    /// flag and path; a failed start only adds a warning to the message.
    pub(super) fn install_then_start(install: &Self, start: &Self) -> Self {
        let message = if start.ok {
            format!("{}\n{}", install.message, start.message)
        } else {
            format!(
                "{}\nAutostart install succeeded, but start-now failed: {}",
                install.message, start.message
            )
        };
        Self {
            ok: true,
            supported: install.supported,
            path: install.path.clone(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_never_carry_a_path() {
        for outcome in [
            AutostartOutcome::failed("boom"),
            AutostartOutcome::unsupported("nope"),
        ] {
            assert!(!outcome.ok());
            assert!(outcome.path().is_none());
        }
    }

    #[test]
    fn unavailable_is_still_ok() {
        let outcome = AutostartOutcome::unavailable("not available here");
        assert!(outcome.ok());
        assert!(!outcome.supported());
    }

    #[test]
    fn actions_display_lowercase_names() {
        let names: Vec<String> = AutostartAction::ALL
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, ["install", "start", "uninstall", "status"]);
    }
}

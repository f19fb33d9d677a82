//! High-level orchestration for autostart lifecycle actions.
//!
//! The manager exposes the four primitives unchanged and adds the composed
//! install-and-start flow used by `modelrelay install --autostart`.

use tracing::{debug, info, warn};

use super::types::{AutostartAction, AutostartOutcome};

/// OS-level capability that owns the login registration.
///
/// Implementations never panic or return errors: every condition, including
/// an unsupported host, is expressed as an [`AutostartOutcome`].
#[cfg_attr(test, mockall::automock)]
pub trait AutostartPrimitives {
    /// Reports the current registration without changing it.
    fn status(&self) -> AutostartOutcome;
    /// Registers the router to start at login; repeat calls succeed.
    fn install(&self) -> AutostartOutcome;
    /// Starts the registered service immediately.
    fn start(&self) -> AutostartOutcome;
    /// Removes the login registration; succeeds when nothing is installed.
    fn uninstall(&self) -> AutostartOutcome;
}

impl<T: AutostartPrimitives + ?Sized> AutostartPrimitives for &T {
    fn status(&self) -> AutostartOutcome {
        (**self).status()
    }

    fn install(&self) -> AutostartOutcome {
        (**self).install()
    }

    fn start(&self) -> AutostartOutcome {
        (**self).start()
    }

    fn uninstall(&self) -> AutostartOutcome {
        (**self).uninstall()
    }
}

/// Production lifecycle manager over a set of primitives.
#[derive(Debug, Default)]
pub struct AutostartManager<P> {
    primitives: P,
}

impl<P: AutostartPrimitives> AutostartManager<P> {
    /// Wraps the primitives used for every action.
    pub const fn new(primitives: P) -> Self {
        Self { primitives }
    }

    /// Runs the operation selected on the command line.
    ///
    /// `install` always attempts an immediate start as well; the remaining
    /// actions map directly onto their primitive.
    pub fn run(&self, action: AutostartAction) -> AutostartOutcome {
        debug!(%action, "running autostart action");
        let outcome = match action {
            AutostartAction::Install => self.install_and_start(),
            AutostartAction::Start => self.start(),
            AutostartAction::Uninstall => self.uninstall(),
            AutostartAction::Status => self.status(),
        };
        if !outcome.ok() {
            info!(
                %action,
                supported = outcome.supported(),
                message = outcome.message(),
                "autostart action failed"
            );
        }
        outcome
    }

    /// Reports the current registration.
    pub fn status(&self) -> AutostartOutcome {
        self.primitives.status()
    }

    /// Registers the router at login without starting it.
    pub fn install(&self) -> AutostartOutcome {
        self.primitives.install()
    }

    /// Starts the registered service.
    pub fn start(&self) -> AutostartOutcome {
        self.primitives.start()
    }

    /// Removes the login registration.
    pub fn uninstall(&self) -> AutostartOutcome {
        self.primitives.uninstall()
    }

    /// Installs the login registration and then starts it right away.
    ///
    /// A failed install is returned unchanged and start is not attempted.
    /// Once install succeeds the result stays successful even if the
    /// immediate start fails; the start failure is appended to the message.
    pub fn install_and_start(&self) -> AutostartOutcome {
        let install = self.install();
        if !install.ok() {
            return install;
        }

        let start = self.start();
        if !start.ok() {
            warn!(
                message = start.message(),
                "autostart installed but immediate start failed"
            );
        }
        AutostartOutcome::install_then_start(&install, &start)
    }
}

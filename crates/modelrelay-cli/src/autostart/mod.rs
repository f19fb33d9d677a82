//! Start-on-login lifecycle management.
//!
//! [`AutostartManager`] composes the four [`AutostartPrimitives`] into the
//! operations the CLI exposes. [`SystemAutostart`] is the default primitive
//! set for the current host.

mod error;
mod manager;
mod system;
mod types;

pub use error::ServiceCommandError;
#[cfg(test)]
pub(crate) use manager::MockAutostartPrimitives;
pub use manager::{AutostartManager, AutostartPrimitives};
pub use system::{ProcessServiceCommand, ServiceCommand, SystemAutostart};
pub use types::{AutostartAction, AutostartOutcome};

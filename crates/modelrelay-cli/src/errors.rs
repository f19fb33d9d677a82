//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::intent::ResolveError;
use crate::onboarding::OnboardingError;
use crate::router::RouterError;
use crate::telemetry::TelemetryError;

/// Failures that end a `modelrelay` invocation with a non-zero exit code.
#[derive(Debug, Error)]
pub enum AppError {
    /// The command-line tokens could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Layered configuration could not be loaded.
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    /// Structured logging could not be installed.
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    /// The onboarding flow failed before it could answer.
    #[error("onboarding failed: {0}")]
    Onboarding(#[from] OnboardingError),
    /// The router could not be launched or exited unsuccessfully.
    #[error("router failed: {0}")]
    Router(#[from] RouterError),
    /// Writing to stdout or stderr failed.
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

//! Shared configuration for the modelrelay command-line tools.
//!
//! [`Config`] is loaded through `ortho_config`, which layers built-in
//! defaults, an optional configuration file, `MODELRELAY_*` environment
//! variables, and command-line flags (in increasing precedence). The crate also
//! owns the default router port and the per-platform location of the
//! start-on-login registration so the CLI and tests agree on both.

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod autostart;
mod defaults;
mod logging;

pub use autostart::{
    AutostartKind, AutostartPaths, AutostartPathsError, LAUNCHD_LABEL, SYSTEMD_UNIT_NAME,
};
pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_ROUTER_BINARY, DEFAULT_ROUTER_PORT, ROUTER_BINARY_ENV,
    default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration consumed by the `modelrelay` binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "MODELRELAY")]
pub struct Config {
    /// Filter expression applied to structured logs (for example `debug`).
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format used for structured logs.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Explicit path to the router executable launched by `modelrelay`.
    pub router_binary: Option<Utf8PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            router_binary: None,
        }
    }
}

impl Config {
    /// Log filter expression applied when telemetry is initialised.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Structured log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Router executable configured by the operator, if any.
    #[must_use]
    pub fn router_binary(&self) -> Option<&Utf8PathBuf> {
        self.router_binary.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_quiet_compact_logging() {
        let config = Config::default();
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert!(config.router_binary().is_none());
    }
}

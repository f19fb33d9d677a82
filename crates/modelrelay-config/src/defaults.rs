/// Port the router listens on when `--port` is not supplied.
pub const DEFAULT_ROUTER_PORT: u16 = 7352;

/// Default log filter expression used by the binaries.
///
/// The CLI shares the terminal with the router, so only warnings are shown
/// unless the operator asks for more.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Executable launched for the router when nothing else is configured.
pub const DEFAULT_ROUTER_BINARY: &str = "modelrelay-router";

/// Environment variable consulted for the router executable.
pub const ROUTER_BINARY_ENV: &str = "MODELRELAY_ROUTER_BIN";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}

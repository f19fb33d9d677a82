//! Help text for `modelrelay --help`.
//!
//! Every line is looked up in the embedded Fluent catalogue with a hardcoded
//! English fallback, so the text stays correct when the catalogue cannot be
//! loaded.

use std::io::{self, Write};

use ortho_config::{FluentLocalizer, Localizer, NoOpLocalizer};

/// Embedded en-US Fluent catalogue.
pub(crate) static MODELRELAY_EN_US: &str = include_str!("../locales/en-US/messages.ftl");

/// A message definition: `(fluent_id, english_fallback)`.
///
/// The fallbacks must match `locales/en-US/messages.ftl`; the
/// `fluent_and_fallback_outputs_are_identical` test guards against drift.
type Entry = (&'static str, &'static str);

const TITLE: Entry = ("modelrelay-help-title", "modelrelay");

const USAGE_HEADER: Entry = ("modelrelay-help-usage-header", "Usage:");
const USAGE: [Entry; 7] = [
    (
        "modelrelay-help-usage-router",
        "modelrelay [--port <port>] [--log] [--ban <model1,model2>]",
    ),
    (
        "modelrelay-help-usage-onboard",
        "modelrelay onboard [--port <port>]",
    ),
    (
        "modelrelay-help-usage-install",
        "modelrelay install --autostart",
    ),
    ("modelrelay-help-usage-start", "modelrelay start --autostart"),
    (
        "modelrelay-help-usage-uninstall",
        "modelrelay uninstall --autostart",
    ),
    ("modelrelay-help-usage-status", "modelrelay status --autostart"),
    (
        "modelrelay-help-usage-autostart",
        "modelrelay autostart [--install|--start|--uninstall|--status]",
    ),
];

const FLAGS_HEADER: Entry = ("modelrelay-help-flags-header", "Flags:");
const FLAGS: [Entry; 11] = [
    (
        "modelrelay-help-flag-port",
        "--port <number>    Router HTTP port (default: 7352)",
    ),
    (
        "modelrelay-help-flag-log",
        "--log              Enable request payload logging in terminal (off by default)",
    ),
    (
        "modelrelay-help-flag-no-log",
        "--no-log           Disable request payload logging in terminal (legacy/override)",
    ),
    (
        "modelrelay-help-flag-ban",
        "--ban <ids>        Comma-separated model IDs to keep banned",
    ),
    (
        "modelrelay-help-flag-onboard",
        "--onboard          Same as the onboard subcommand",
    ),
    (
        "modelrelay-help-flag-autostart",
        "--autostart        Manage start-on-login behavior for the router",
    ),
    (
        "modelrelay-help-flag-install",
        "--install          For autostart subcommand: enable at login",
    ),
    (
        "modelrelay-help-flag-start",
        "--start            For autostart subcommand: trigger service start now",
    ),
    (
        "modelrelay-help-flag-uninstall",
        "--uninstall        For autostart subcommand: disable at login",
    ),
    (
        "modelrelay-help-flag-status",
        "--status           For autostart subcommand: show status",
    ),
    (
        "modelrelay-help-flag-help",
        "--help, -h         Show help",
    ),
];

const CONFIG_HEADER: Entry = (
    "modelrelay-help-config-header",
    "Configuration (before any command):",
);
const CONFIG: [Entry; 3] = [
    (
        "modelrelay-help-config-path",
        "--config-path <file>  Read settings from a TOML file",
    ),
    (
        "modelrelay-help-config-log-filter",
        "--log-filter <expr>   Diagnostic log filter (default: warn)",
    ),
    (
        "modelrelay-help-config-log-format",
        "--log-format <fmt>   Diagnostic log format: compact or json",
    ),
];

fn msg(localizer: &dyn Localizer, entry: Entry) -> String {
    localizer.message(entry.0, None, entry.1)
}

/// Builds the application localizer, falling back to plain English when the
/// embedded catalogue fails to load.
pub(crate) fn build_localizer() -> Box<dyn Localizer> {
    match FluentLocalizer::with_en_us_defaults([MODELRELAY_EN_US]) {
        Ok(localizer) => Box::new(localizer),
        Err(_) => Box::new(NoOpLocalizer),
    }
}

/// Writes the full help block to `writer`.
///
/// # Errors
///
/// Returns [`io::Error`] if writing to the underlying stream fails.
pub(crate) fn write_help<W: Write>(writer: &mut W, localizer: &dyn Localizer) -> io::Result<()> {
    writeln!(writer, "{}", msg(localizer, TITLE))?;
    write_section(writer, localizer, USAGE_HEADER, &USAGE)?;
    write_section(writer, localizer, FLAGS_HEADER, &FLAGS)?;
    write_section(writer, localizer, CONFIG_HEADER, &CONFIG)?;
    writer.flush()
}

fn write_section<W: Write>(
    writer: &mut W,
    localizer: &dyn Localizer,
    header: Entry,
    lines: &[Entry],
) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", msg(localizer, header))?;
    for line in lines {
        writeln!(writer, "  {}", msg(localizer, *line))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(localizer: &dyn Localizer) -> String {
        let mut buffer = Vec::new();
        write_help(&mut buffer, localizer).expect("write help");
        String::from_utf8(buffer).expect("help is UTF-8")
    }

    #[test]
    fn fluent_and_fallback_outputs_are_identical() {
        let fluent = FluentLocalizer::with_en_us_defaults([MODELRELAY_EN_US])
            .expect("embedded catalogue loads");
        assert_eq!(render(&fluent), render(&NoOpLocalizer));
    }

    #[test]
    fn help_lists_every_autostart_form() {
        let text = render(&NoOpLocalizer);
        assert!(text.starts_with("modelrelay\n\nUsage:\n"));
        for verb in ["install", "start", "uninstall", "status"] {
            assert!(
                text.contains(&format!("  modelrelay {verb} --autostart\n")),
                "missing {verb} usage"
            );
        }
        assert!(text.contains("  --port <number>    Router HTTP port (default: 7352)\n"));
    }
}

//! CLI argument definitions for modelrelay.
//!
//! This module defines the raw command-line surface used by both the runtime
//! resolver and the build script for manpage generation. The struct captures
//! tokens only; turning them into a single intent happens in `intent`.

use clap::{ArgAction, Parser, ValueEnum};

/// Leading positional word selecting a subcommand.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum CommandWord {
    /// Runs first-time setup, then optionally launches the router.
    Onboard,
    /// Enables start on login (with `--autostart`).
    Install,
    /// Starts the login service now (with `--autostart`).
    Start,
    /// Disables start on login (with `--autostart`).
    Uninstall,
    /// Shows the start-on-login status (with `--autostart`).
    Status,
    /// Manages start-on-login behaviour; defaults to `--status`.
    Autostart,
}

/// Command-line interface for the modelrelay router.
#[derive(Parser, Debug, Default)]
#[command(
    name = "modelrelay",
    about = "Web dashboard and OpenAI-compatible router for coding LLM models",
    disable_help_flag = true,
    args_override_self = true
)]
pub(crate) struct Cli {
    /// Optional subcommand (for example `onboard` or `autostart`).
    #[arg(value_enum, value_name = "COMMAND")]
    pub(crate) command: Option<CommandWord>,
    /// Router HTTP port (default: 7352).
    #[arg(long, value_name = "PORT", allow_hyphen_values = true)]
    pub(crate) port: Option<String>,
    /// Enable request payload logging in the terminal.
    #[arg(long, overrides_with = "no_log")]
    pub(crate) log: bool,
    /// Disable request payload logging in the terminal.
    #[arg(long = "no-log", overrides_with = "log")]
    pub(crate) no_log: bool,
    /// Comma-separated model IDs to keep banned.
    #[arg(long, value_name = "IDS", action = ArgAction::Append)]
    pub(crate) ban: Vec<String>,
    /// Same as the `onboard` subcommand.
    #[arg(long)]
    pub(crate) onboard: bool,
    /// Manage start-on-login behaviour for the router.
    #[arg(long)]
    pub(crate) autostart: bool,
    /// For the autostart subcommand: enable at login.
    #[arg(long)]
    pub(crate) install: bool,
    /// For the autostart subcommand: trigger a service start now.
    #[arg(long)]
    pub(crate) start: bool,
    /// For the autostart subcommand: disable at login.
    #[arg(long)]
    pub(crate) uninstall: bool,
    /// For the autostart subcommand: show status.
    #[arg(long)]
    pub(crate) status: bool,
}

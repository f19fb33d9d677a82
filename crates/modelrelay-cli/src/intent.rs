//! Resolves raw command-line tokens into a single [`Intent`].
//!
//! Clap only captures the tokens; the normalisation step below decides which
//! of the equivalent spellings (`install --autostart`, `autostart --install`)
//! was meant and rejects combinations that name more than one action.

use std::ffi::OsString;
use std::iter;

use clap::Parser;
use thiserror::Error;

use crate::autostart::AutostartAction;
use crate::cli::{Cli, CommandWord};

const HELP_FLAGS: [&str; 2] = ["--help", "-h"];

/// What the user asked the CLI to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Print usage and exit.
    ShowHelp,
    /// Run a start-on-login lifecycle operation.
    Autostart(AutostartAction),
    /// Run first-time setup, then possibly launch the router.
    Onboard(RouterOptions),
    /// Launch the router in the foreground.
    RunRouter(RouterOptions),
}

/// Router flags shared by onboarding and direct launches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterOptions {
    /// Port requested with `--port`.
    pub port: Option<u16>,
    /// `Some(true)` for `--log`, `Some(false)` for `--no-log`.
    pub log_enabled: Option<bool>,
    /// Model identifiers collected from every `--ban` flag.
    pub banned_model_ids: BannedModels,
}

impl RouterOptions {
    /// Port to bind, falling back to `default` when none was given.
    #[must_use]
    pub fn port_or(&self, default: u16) -> u16 {
        self.port.unwrap_or(default)
    }

    fn router_flag(cli: &Cli) -> Option<&'static str> {
        if cli.port.is_some() {
            Some("--port")
        } else if cli.log {
            Some("--log")
        } else if cli.no_log {
            Some("--no-log")
        } else if !cli.ban.is_empty() {
            Some("--ban")
        } else {
            None
        }
    }

    fn from_cli(cli: &Cli) -> Result<Self, ResolveError> {
        let port = cli.port.as_deref().map(parse_port).transpose()?;
        let log_enabled = if cli.log {
            Some(true)
        } else if cli.no_log {
            Some(false)
        } else {
            None
        };
        Ok(Self {
            port,
            log_enabled,
            banned_model_ids: BannedModels::from_lists(&cli.ban),
        })
    }
}

/// Ordered, duplicate-free list of banned model identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannedModels(Vec<String>);

impl BannedModels {
    /// Splits comma-separated lists, trimming tokens and dropping blanks and
    /// repeats while keeping first-seen order.
    pub fn from_lists<I, S>(lists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ids: Vec<String> = Vec::new();
        for list in lists {
            for token in list.as_ref().split(',').map(str::trim) {
                if !token.is_empty() && !ids.iter().any(|id| id == token) {
                    ids.push(token.to_owned());
                }
            }
        }
        Self(ids)
    }

    /// Identifiers in first-seen order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        self.0.as_slice()
    }

    /// Returns true when nothing is banned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the identifiers as a single comma-separated list.
    #[must_use]
    pub fn joined(&self) -> String {
        self.0.join(",")
    }
}

/// Errors raised while resolving command-line tokens.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Clap rejected the tokens (unknown flag, missing value, stray word).
    #[error("{0}")]
    Usage(#[from] clap::Error),
    /// `--port` was not an integer between 1 and 65535.
    #[error("invalid port '{value}': expected an integer between 1 and 65535")]
    InvalidPort {
        /// Raw value supplied after `--port`.
        value: String,
    },
    /// More than one lifecycle action was named.
    #[error("conflicting autostart actions: {first} and {second}; choose one")]
    ConflictingActions {
        /// Action named first.
        first: AutostartAction,
        /// Conflicting action named later.
        second: AutostartAction,
    },
    /// Onboarding was combined with an autostart action.
    #[error("onboard cannot be combined with autostart actions")]
    ConflictingCommands,
    /// A lifecycle verb was given as a subcommand without `--autostart`.
    #[error("'{action}' requires --autostart (try 'modelrelay {action} --autostart')")]
    MissingAutostartFlag {
        /// Verb given on its own.
        action: AutostartAction,
    },
    /// A lifecycle flag was given outside the autostart command.
    #[error("--{action} is only valid with autostart (try 'modelrelay autostart --{action}')")]
    MissingAutostartContext {
        /// Action flag given without context.
        action: AutostartAction,
    },
    /// A router flag was combined with an autostart action.
    #[error("{flag} cannot be combined with autostart actions")]
    RouterFlagWithAutostart {
        /// First router flag found.
        flag: &'static str,
    },
}

/// Turns the arguments that follow the program name into an [`Intent`].
///
/// `--help` or `-h` anywhere wins over every other token, including ones
/// that would otherwise fail to parse.
///
/// # Errors
///
/// Returns [`ResolveError`] when the tokens are malformed or name
/// conflicting actions.
pub fn resolve(args: &[OsString]) -> Result<Intent, ResolveError> {
    if args
        .iter()
        .any(|arg| arg.to_str().is_some_and(|text| HELP_FLAGS.contains(&text)))
    {
        return Ok(Intent::ShowHelp);
    }

    let tokens = iter::once(OsString::from("modelrelay")).chain(args.iter().cloned());
    let cli = Cli::try_parse_from(tokens)?;
    normalise(&cli)
}

/// Where a lifecycle action was named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionSource {
    Word,
    Flag,
}

fn normalise(cli: &Cli) -> Result<Intent, ResolveError> {
    let onboard = cli.onboard || cli.command == Some(CommandWord::Onboard);
    let autostart_context = cli.autostart || cli.command == Some(CommandWord::Autostart);
    let requested = requested_action(cli)?;

    if onboard && (autostart_context || requested.is_some()) {
        return Err(ResolveError::ConflictingCommands);
    }

    let action = match (requested, autostart_context) {
        (Some((action, _)), true) => Some(action),
        (Some((action, ActionSource::Word)), false) => {
            return Err(ResolveError::MissingAutostartFlag { action });
        }
        (Some((action, ActionSource::Flag)), false) => {
            return Err(ResolveError::MissingAutostartContext { action });
        }
        (None, true) => Some(AutostartAction::Status),
        (None, false) => None,
    };

    if let Some(action) = action {
        if let Some(flag) = RouterOptions::router_flag(cli) {
            return Err(ResolveError::RouterFlagWithAutostart { flag });
        }
        return Ok(Intent::Autostart(action));
    }

    let options = RouterOptions::from_cli(cli)?;
    if onboard {
        Ok(Intent::Onboard(options))
    } else {
        Ok(Intent::RunRouter(options))
    }
}

/// Collects the lifecycle verb from the subcommand word and the verb flags.
fn requested_action(
    cli: &Cli,
) -> Result<Option<(AutostartAction, ActionSource)>, ResolveError> {
    let from_word = cli
        .command
        .and_then(word_action)
        .map(|action| (action, ActionSource::Word));
    let from_flags = [
        (cli.install, AutostartAction::Install),
        (cli.start, AutostartAction::Start),
        (cli.uninstall, AutostartAction::Uninstall),
        (cli.status, AutostartAction::Status),
    ]
    .into_iter()
    .filter_map(|(set, action)| set.then_some((action, ActionSource::Flag)));

    let mut selected: Option<(AutostartAction, ActionSource)> = None;
    for (action, source) in from_word.into_iter().chain(from_flags) {
        match selected {
            None => selected = Some((action, source)),
            Some((first, _)) if first != action => {
                return Err(ResolveError::ConflictingActions {
                    first,
                    second: action,
                });
            }
            Some(_) => {}
        }
    }
    Ok(selected)
}

const fn word_action(word: CommandWord) -> Option<AutostartAction> {
    match word {
        CommandWord::Install => Some(AutostartAction::Install),
        CommandWord::Start => Some(AutostartAction::Start),
        CommandWord::Uninstall => Some(AutostartAction::Uninstall),
        CommandWord::Status => Some(AutostartAction::Status),
        CommandWord::Onboard | CommandWord::Autostart => None,
    }
}

fn parse_port(value: &str) -> Result<u16, ResolveError> {
    match value.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ResolveError::InvalidPort {
            value: value.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn args(tokens: &[&str]) -> Vec<OsString> {
        tokens.iter().map(OsString::from).collect()
    }

    fn resolved(tokens: &[&str]) -> Intent {
        resolve(&args(tokens)).expect("tokens should resolve")
    }

    fn rejected(tokens: &[&str]) -> ResolveError {
        match resolve(&args(tokens)) {
            Ok(intent) => panic!("expected {tokens:?} to fail, resolved {intent:?}"),
            Err(error) => error,
        }
    }

    #[rstest]
    #[case(&["--help"])]
    #[case(&["-h"])]
    #[case(&["autostart", "--install", "--help"])]
    #[case(&["--port", "abc", "-h"])]
    #[case(&["--definitely-unknown", "--help"])]
    #[case(&["install", "--start", "-h"])]
    fn help_wins_over_everything(#[case] tokens: &[&str]) {
        assert_eq!(resolved(tokens), Intent::ShowHelp);
    }

    #[rstest]
    #[case("install", AutostartAction::Install)]
    #[case("start", AutostartAction::Start)]
    #[case("uninstall", AutostartAction::Uninstall)]
    #[case("status", AutostartAction::Status)]
    fn verb_spellings_are_equivalent(#[case] verb: &str, #[case] action: AutostartAction) {
        let flag = format!("--{verb}");
        let word_first = resolved(&[verb, "--autostart"]);
        let autostart_first = resolved(&["autostart", flag.as_str()]);
        let flags_only = resolved(&["--autostart", flag.as_str()]);

        assert_eq!(word_first, Intent::Autostart(action));
        assert_eq!(autostart_first, word_first);
        assert_eq!(flags_only, word_first);
    }

    #[rstest]
    #[case(&["autostart"])]
    #[case(&["--autostart"])]
    #[case(&["autostart", "--autostart"])]
    fn autostart_alone_reports_status(#[case] tokens: &[&str]) {
        assert_eq!(resolved(tokens), Intent::Autostart(AutostartAction::Status));
    }

    #[test]
    fn no_arguments_run_the_router_with_defaults() {
        let Intent::RunRouter(options) = resolved(&[]) else {
            panic!("expected router launch");
        };
        assert_eq!(options, RouterOptions::default());
        assert_eq!(options.port_or(7352), 7352);
    }

    #[test]
    fn ban_lists_are_trimmed_and_deduplicated() {
        let intent = resolved(&["--ban", "gpt-x, gpt-y,,gpt-x"]);
        let Intent::RunRouter(options) = intent else {
            panic!("expected router launch");
        };
        assert_eq!(options.banned_model_ids.as_slice(), ["gpt-x", "gpt-y"]);
        assert_eq!(options.port, None);
        assert_eq!(options.log_enabled, None);
    }

    #[test]
    fn repeated_ban_flags_accumulate() {
        let Intent::RunRouter(options) = resolved(&["--ban", "a,b", "--ban=b, c"]) else {
            panic!("expected router launch");
        };
        assert_eq!(options.banned_model_ids.joined(), "a,b,c");
    }

    #[rstest]
    #[case(&["--log"], Some(true))]
    #[case(&["--no-log"], Some(false))]
    #[case(&["--log", "--no-log"], Some(false))]
    #[case(&["--no-log", "--log"], Some(true))]
    #[case(&["--port", "9000"], None)]
    fn last_log_flag_wins(#[case] tokens: &[&str], #[case] expected: Option<bool>) {
        let Intent::RunRouter(options) = resolved(tokens) else {
            panic!("expected router launch");
        };
        assert_eq!(options.log_enabled, expected);
    }

    #[test]
    fn repeated_port_keeps_the_last_value() {
        let Intent::RunRouter(options) = resolved(&["--port", "1", "--port", "2"]) else {
            panic!("expected router launch");
        };
        assert_eq!(options.port, Some(2));
    }

    #[rstest]
    #[case("abc")]
    #[case("0")]
    #[case("-1")]
    #[case("65536")]
    #[case("80.5")]
    fn invalid_ports_are_rejected(#[case] value: &str) {
        let error = rejected(&["--port", value]);
        assert!(
            matches!(&error, ResolveError::InvalidPort { value: raw } if raw == value),
            "unexpected error: {error:?}"
        );
    }

    #[test]
    fn missing_port_value_is_a_usage_error() {
        assert!(matches!(rejected(&["--port"]), ResolveError::Usage(_)));
    }

    #[rstest]
    #[case(&["onboard"])]
    #[case(&["--onboard"])]
    #[case(&["onboard", "--onboard"])]
    fn onboard_spellings(#[case] tokens: &[&str]) {
        assert_eq!(resolved(tokens), Intent::Onboard(RouterOptions::default()));
    }

    #[test]
    fn onboarding_keeps_router_flags() {
        let intent = resolved(&["onboard", "--port", "8080", "--log", "--ban", "m"]);
        let Intent::Onboard(options) = intent else {
            panic!("expected onboarding");
        };
        assert_eq!(options.port, Some(8080));
        assert_eq!(options.log_enabled, Some(true));
        assert_eq!(options.banned_model_ids.as_slice(), ["m"]);
    }

    #[test]
    fn conflicting_actions_are_rejected() {
        let error = rejected(&["autostart", "--install", "--uninstall"]);
        assert!(matches!(
            error,
            ResolveError::ConflictingActions {
                first: AutostartAction::Install,
                second: AutostartAction::Uninstall,
            }
        ));
    }

    #[test]
    fn repeating_the_same_action_is_not_a_conflict() {
        assert_eq!(
            resolved(&["install", "--autostart", "--install"]),
            Intent::Autostart(AutostartAction::Install)
        );
    }

    #[test]
    fn verb_word_and_different_flag_conflict() {
        assert!(matches!(
            rejected(&["start", "--autostart", "--status"]),
            ResolveError::ConflictingActions { .. }
        ));
    }

    #[rstest]
    #[case(&["onboard", "--autostart"])]
    #[case(&["autostart", "--onboard"])]
    #[case(&["--onboard", "--install", "--autostart"])]
    fn onboarding_and_autostart_conflict(#[case] tokens: &[&str]) {
        assert!(matches!(rejected(tokens), ResolveError::ConflictingCommands));
    }

    #[test]
    fn bare_verb_names_the_autostart_form() {
        let error = rejected(&["install"]);
        assert!(matches!(
            error,
            ResolveError::MissingAutostartFlag {
                action: AutostartAction::Install
            }
        ));
        assert!(error.to_string().contains("modelrelay install --autostart"));
    }

    #[test]
    fn verb_flag_needs_autostart_context() {
        let error = rejected(&["--uninstall"]);
        assert!(matches!(
            error,
            ResolveError::MissingAutostartContext {
                action: AutostartAction::Uninstall
            }
        ));
        assert!(error.to_string().contains("modelrelay autostart --uninstall"));
    }

    #[rstest]
    #[case(&["autostart", "--port", "9000"], "--port")]
    #[case(&["install", "--autostart", "--log"], "--log")]
    #[case(&["autostart", "--status", "--no-log"], "--no-log")]
    #[case(&["--autostart", "--ban", "m"], "--ban")]
    fn router_flags_conflict_with_autostart(#[case] tokens: &[&str], #[case] expected: &str) {
        let error = rejected(tokens);
        assert!(
            matches!(&error, ResolveError::RouterFlagWithAutostart { flag } if *flag == expected),
            "unexpected error: {error:?}"
        );
    }

    #[rstest]
    #[case(&["--definitely-unknown"])]
    #[case(&["router"])]
    #[case(&["onboard", "extra"])]
    fn malformed_tokens_are_usage_errors(#[case] tokens: &[&str]) {
        assert!(matches!(rejected(tokens), ResolveError::Usage(_)));
    }
}

//! Test support utilities for modelrelay CLI behavioural coverage.
//!
//! Supplies recording collaborators and a world type so step definitions and
//! runner tests can drive the whole CLI without touching the host.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result, ensure};
use modelrelay_config::Config;
use rstest::fixture;

use crate::{
    AppError, AutostartAction, AutostartManager, AutostartOutcome, AutostartPrimitives,
    ConfigLoader, Dispatcher, LaunchOptions, Onboarding, OnboardingError, RouterError,
    RouterLauncher, run_with_dispatcher,
};

pub(crate) const UNIT_PATH: &str = "/home/ada/.config/systemd/user/modelrelay.service";

/// A config loader that returns a fixed configuration and records the
/// arguments it was given.
#[derive(Default)]
pub(crate) struct StaticConfigLoader {
    config: Config,
    calls: RefCell<Vec<Vec<OsString>>>,
}

impl StaticConfigLoader {
    pub(crate) fn calls(&self) -> Vec<Vec<OsString>> {
        self.calls.borrow().clone()
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        self.calls.borrow_mut().push(args.to_vec());
        Ok(self.config.clone())
    }
}

/// Autostart primitives that return scripted outcomes and record calls.
pub(crate) struct RecordingPrimitives {
    outcomes: RefCell<HashMap<AutostartAction, AutostartOutcome>>,
    calls: RefCell<Vec<AutostartAction>>,
}

impl Default for RecordingPrimitives {
    fn default() -> Self {
        let outcomes = HashMap::from([
            (
                AutostartAction::Status,
                AutostartOutcome::succeeded("Autostart is not installed."),
            ),
            (
                AutostartAction::Install,
                AutostartOutcome::succeeded_at(UNIT_PATH, "Autostart installed."),
            ),
            (
                AutostartAction::Start,
                AutostartOutcome::succeeded("Router started."),
            ),
            (
                AutostartAction::Uninstall,
                AutostartOutcome::succeeded("Autostart removed."),
            ),
        ]);
        Self {
            outcomes: RefCell::new(outcomes),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl RecordingPrimitives {
    pub(crate) fn script(&self, action: AutostartAction, outcome: AutostartOutcome) {
        self.outcomes.borrow_mut().insert(action, outcome);
    }

    pub(crate) fn calls(&self) -> Vec<AutostartAction> {
        self.calls.borrow().clone()
    }

    fn answer(&self, action: AutostartAction) -> AutostartOutcome {
        self.calls.borrow_mut().push(action);
        self.outcomes
            .borrow()
            .get(&action)
            .cloned()
            .unwrap_or_else(|| AutostartOutcome::failed(format!("{action} not scripted")))
    }
}

impl AutostartPrimitives for RecordingPrimitives {
    fn status(&self) -> AutostartOutcome {
        self.answer(AutostartAction::Status)
    }

    fn install(&self) -> AutostartOutcome {
        self.answer(AutostartAction::Install)
    }

    fn start(&self) -> AutostartOutcome {
        self.answer(AutostartAction::Start)
    }

    fn uninstall(&self) -> AutostartOutcome {
        self.answer(AutostartAction::Uninstall)
    }
}

/// Onboarding that answers with a fixed decision.
#[derive(Default)]
pub(crate) struct ScriptedOnboarding {
    start_router: Cell<bool>,
    ports: RefCell<Vec<u16>>,
}

impl ScriptedOnboarding {
    pub(crate) fn answer(&self, start_router: bool) {
        self.start_router.set(start_router);
    }

    pub(crate) fn ports(&self) -> Vec<u16> {
        self.ports.borrow().clone()
    }
}

impl Onboarding for ScriptedOnboarding {
    fn run(&self, port: u16) -> Result<bool, OnboardingError> {
        self.ports.borrow_mut().push(port);
        Ok(self.start_router.get())
    }
}

/// Router launcher that records launches instead of spawning processes.
#[derive(Default)]
pub(crate) struct RecordingRouter {
    launches: RefCell<Vec<LaunchOptions>>,
    fail: Cell<bool>,
}

impl RecordingRouter {
    pub(crate) fn fail_next_launch(&self) {
        self.fail.set(true);
    }

    pub(crate) fn launches(&self) -> Vec<LaunchOptions> {
        self.launches.borrow().clone()
    }
}

impl RouterLauncher for RecordingRouter {
    fn launch(&self, _config: &Config, options: &LaunchOptions) -> Result<(), RouterError> {
        self.launches.borrow_mut().push(options.clone());
        if self.fail.replace(false) {
            return Err(RouterError::Launch {
                binary: OsString::from("modelrelay-router"),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }
        Ok(())
    }
}

/// Test world holding collaborators and captured output.
#[derive(Default)]
pub(crate) struct TestWorld {
    pub(crate) primitives: RecordingPrimitives,
    pub(crate) onboarding: ScriptedOnboarding,
    pub(crate) router: RecordingRouter,
    pub(crate) loader: StaticConfigLoader,
    pub(crate) stdout: Vec<u8>,
    pub(crate) stderr: Vec<u8>,
    pub(crate) exit_code: Option<ExitCode>,
}

impl TestWorld {
    pub(crate) fn run(&mut self, command: &str) {
        self.stdout.clear();
        self.stderr.clear();
        let args = Self::build_args(command);
        let autostart = AutostartManager::new(&self.primitives);
        let dispatcher = Dispatcher::new(&autostart, &self.onboarding, &self.router, &self.loader);
        let exit = run_with_dispatcher(args, &dispatcher, &mut self.stdout, &mut self.stderr);
        self.exit_code = Some(exit);
    }

    fn build_args(command: &str) -> Vec<OsString> {
        let mut args = vec![OsString::from("modelrelay")];
        let trimmed = command.trim().trim_matches('"');
        if !trimmed.is_empty() {
            args.extend(
                trimmed
                    .split_whitespace()
                    .map(|token| OsString::from(token.trim_matches('"'))),
            );
        }
        args
    }

    pub(crate) fn stdout_text(&self) -> Result<String> {
        decode_utf8(self.stdout.clone(), "stdout")
    }

    pub(crate) fn stderr_text(&self) -> Result<String> {
        decode_utf8(self.stderr.clone(), "stderr")
    }

    pub(crate) fn assert_exit_code(&self, expected: ExitCode) -> Result<()> {
        let exit = self.exit_code.context("exit code recorded")?;
        ensure!(
            exit == expected,
            "expected exit code {expected:?}, got {exit:?}"
        );
        Ok(())
    }

    pub(crate) fn single_launch(&self) -> Result<LaunchOptions> {
        let launches = self.router.launches();
        ensure!(
            launches.len() == 1,
            "expected one router launch, found {launches:?}"
        );
        launches.into_iter().next().context("router launch missing")
    }
}

pub(crate) fn decode_utf8(buffer: Vec<u8>, label: &str) -> Result<String> {
    String::from_utf8(buffer).with_context(|| format!("{label} utf8"))
}

pub(crate) fn parse_action(label: &str) -> AutostartAction {
    match label.trim().trim_matches('"') {
        "install" => AutostartAction::Install,
        "start" => AutostartAction::Start,
        "uninstall" => AutostartAction::Uninstall,
        "status" => AutostartAction::Status,
        other => panic!("unsupported autostart action label {other}"),
    }
}

#[fixture]
pub(crate) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

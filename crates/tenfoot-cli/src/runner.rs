//! Scenario runner: settings assembly, driver choice, sequential execution

use crate::commands::RunArgs;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tenfoot::{run_scenario, Driver, ScenarioKind, ScenarioReport, Session, Settings, SimulatedTv};

/// Settings for a run: simulator settings with `--simulate`, otherwise
/// defaults, file, environment, then flags. Validated.
pub fn build_settings(args: &RunArgs) -> CliResult<Settings> {
    let mut settings = if args.simulate {
        Settings::for_simulation()
    } else {
        let mut settings = load_file(args.config.as_deref())?;
        if let Some(url) = &args.base_url {
            settings.base_url.clone_from(url);
        }
        if args.headed {
            settings.browser.headless = false;
        }
        settings
    };
    if let Some(dir) = &args.artifacts {
        settings.artifacts_dir.clone_from(dir);
    }
    settings.validate()?;
    Ok(settings)
}

/// Defaults or file, then environment
pub fn load_file(path: Option<&Path>) -> CliResult<Settings> {
    let mut settings = match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    settings.apply_env();
    Ok(settings)
}

/// Scenario names to kinds; empty means all, in their usual order
pub fn select_scenarios(names: &[String]) -> CliResult<Vec<ScenarioKind>> {
    if names.is_empty() {
        return Ok(ScenarioKind::all().to_vec());
    }
    names
        .iter()
        .map(|name| {
            name.parse::<ScenarioKind>().map_err(|_| {
                CliError::invalid_argument(format!("unknown scenario {name:?} (see `tenfoot list`)"))
            })
        })
        .collect()
}

/// Runs scenarios one after another on one session
#[derive(Debug)]
pub struct ScenarioRunner {
    kinds: Vec<ScenarioKind>,
    seed: u64,
    fail_fast: bool,
}

impl ScenarioRunner {
    /// Runner for `args`; a missing seed is drawn at random
    pub fn from_args(args: &RunArgs) -> CliResult<Self> {
        Ok(Self {
            kinds: select_scenarios(&args.scenarios)?,
            seed: args.seed.unwrap_or_else(rand::random),
            fail_fast: args.fail_fast,
        })
    }

    /// Seed used for random choices
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Selected scenarios
    #[must_use]
    pub fn kinds(&self) -> &[ScenarioKind] {
        &self.kinds
    }

    /// Run on an existing session
    pub async fn run_on<D: Driver>(
        &self,
        session: &Session<D>,
        reporter: &mut ProgressReporter,
    ) -> Vec<ScenarioReport> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut reports = Vec::with_capacity(self.kinds.len());
        for &kind in &self.kinds {
            reporter.start_scenario(kind);
            let report = run_scenario(session, kind, &mut rng).await;
            reporter.finish_scenario(&report);
            let failed = !report.passed;
            reports.push(report);
            if failed && self.fail_fast {
                tracing::info!(scenario = %kind, "stopping after first failure");
                break;
            }
        }
        reports
    }

    /// Run against the simulated TV
    pub async fn run_simulated(
        &self,
        settings: Settings,
        reporter: &mut ProgressReporter,
    ) -> Vec<ScenarioReport> {
        let session = Session::new(SimulatedTv::new(), settings);
        self.run_on(&session, reporter).await
    }

    /// Launch Chromium, run, close it
    #[cfg(feature = "browser")]
    pub async fn run_browser(
        &self,
        settings: Settings,
        reporter: &mut ProgressReporter,
    ) -> CliResult<Vec<ScenarioReport>> {
        let driver = tenfoot::ChromiumDriver::launch(&settings.browser).await?;
        let session = Session::new(driver, settings);
        let reports = self.run_on(&session, reporter).await;
        if let Err(err) = session.close().await {
            tracing::warn!(error = %err, "browser did not close cleanly");
        }
        Ok(reports)
    }

    /// Without the `browser` feature only `--simulate` can run
    #[cfg(not(feature = "browser"))]
    pub async fn run_browser(
        &self,
        _settings: Settings,
        _reporter: &mut ProgressReporter,
    ) -> CliResult<Vec<ScenarioReport>> {
        Err(CliError::config(
            "built without browser support; pass --simulate or rebuild with --features browser",
        ))
    }
}

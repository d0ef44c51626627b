//! Tenfoot CLI: run remote-control scenarios against a TV web application
//!
//! ## Usage
//!
//! ```bash
//! tenfoot list                          # Scenario names
//! tenfoot config --config tv.yaml       # Effective settings
//! tenfoot run --simulate                # All scenarios on the simulated TV
//! tenfoot run apps-page-available -v    # One scenario in Chromium
//! ```

use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;
use tenfoot::ScenarioKind;
use tenfoot_cli::{
    build_settings, init_logging, load_file, render_reports_json, Cli, CliError, CliResult,
    Commands, ConfigArgs, ConsoleOptions, LogFormat, ReportFormat, RunArgs, ScenarioRunner,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let console = ConsoleOptions::from_cli(&cli);
    init_logging(console.verbosity.log_filter(), LogFormat::from(cli.log_format))?;

    match cli.command {
        Commands::List => {
            run_list();
            Ok(())
        }
        Commands::Config(args) => run_config(&args),
        Commands::Run(args) => run_scenarios(console, &args),
    }
}

fn run_list() {
    let width = ScenarioKind::all()
        .iter()
        .map(|k| k.name().len())
        .max()
        .unwrap_or(0);
    for kind in ScenarioKind::all() {
        println!("{:<width$}  {}", kind.name(), kind.description());
    }
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let settings = load_file(args.config.as_deref())?;
    settings.validate()?;
    print!("{}", settings.to_yaml()?);
    Ok(())
}

fn run_scenarios(console: ConsoleOptions, args: &RunArgs) -> CliResult<()> {
    let settings = build_settings(args)?;
    let runner = ScenarioRunner::from_args(args)?;
    let mut reporter = console.reporter();

    let target = if args.simulate {
        "simulated TV".to_string()
    } else {
        settings.base_url.clone()
    };
    reporter.run_banner(runner.kinds().len(), &target, runner.seed());
    tracing::info!(seed = runner.seed(), %target, "run start");

    let runtime = tokio::runtime::Runtime::new()?;
    let start = Instant::now();
    let reports = runtime.block_on(async {
        if args.simulate {
            Ok(runner.run_simulated(settings, &mut reporter).await)
        } else {
            runner.run_browser(settings, &mut reporter).await
        }
    })?;

    let failed = reports.iter().filter(|r| !r.passed).count();
    match args.format {
        ReportFormat::Text => reporter.summary(&reports, start.elapsed()),
        ReportFormat::Json => println!("{}", render_reports_json(&reports)?),
    }

    if failed > 0 {
        return Err(CliError::ScenariosFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

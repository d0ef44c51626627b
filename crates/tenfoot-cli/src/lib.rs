//! Tenfoot CLI Library
//!
//! Command-line front end for the tenfoot scenarios.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, LogFormatArg, ReportFormat, RunArgs};
pub use config::{ColorChoice, ConsoleOptions, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::{init_logging, LogFormat};
pub use output::{render_reports_json, ProgressReporter};
pub use runner::{build_settings, load_file, select_scenarios, ScenarioRunner};

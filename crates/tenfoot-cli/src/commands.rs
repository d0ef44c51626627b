//! CLI command definitions using clap

use crate::config::ColorChoice;
use crate::logging::LogFormat;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tenfoot: remote-control end-to-end scenarios for TV web applications
#[derive(Parser, Debug)]
#[command(name = "tenfoot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List scenarios
    List,

    /// Show effective settings as YAML
    Config(ConfigArgs),

    /// Run scenarios against the application
    Run(RunArgs),
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Settings file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Scenarios to run (default: all)
    pub scenarios: Vec<String>,

    /// Settings file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Application URL, overriding settings and environment
    #[arg(long)]
    pub base_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Run against the built-in simulated TV instead of a browser
    #[arg(long)]
    pub simulate: bool,

    /// Seed for random choices (genre selection)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop at the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Report format
    #[arg(short, long, default_value = "text")]
    pub format: ReportFormat,

    /// Directory for debug screenshots
    #[arg(long)]
    pub artifacts: Option<PathBuf>,
}

/// Report output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON array of scenario reports
    Json,
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-friendly lines
    #[default]
    Pretty,
    /// JSON lines
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Color choice argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_list() {
            let cli = Cli::parse_from(["tenfoot", "list"]);
            assert!(matches!(cli.command, Commands::List));
            assert_eq!(cli.verbose, 0);
        }

        #[test]
        fn test_parse_config_file() {
            let cli = Cli::parse_from(["tenfoot", "config", "--config", "tv.yaml"]);
            if let Commands::Config(args) = cli.command {
                assert_eq!(args.config, Some(PathBuf::from("tv.yaml")));
            } else {
                panic!("expected Config command");
            }
        }

        #[test]
        fn test_parse_run_defaults() {
            let cli = Cli::parse_from(["tenfoot", "run"]);
            if let Commands::Run(args) = cli.command {
                assert!(args.scenarios.is_empty());
                assert!(!args.simulate);
                assert!(!args.headed);
                assert!(!args.fail_fast);
                assert_eq!(args.seed, None);
                assert_eq!(args.format, ReportFormat::Text);
            } else {
                panic!("expected Run command");
            }
        }

        #[test]
        fn test_parse_run_full() {
            let cli = Cli::parse_from([
                "tenfoot",
                "-vv",
                "--log-format",
                "json",
                "run",
                "apps-page-available",
                "search-page-available",
                "--simulate",
                "--seed",
                "7",
                "--fail-fast",
                "--format",
                "json",
                "--base-url",
                "http://tv.local/",
            ]);
            assert_eq!(cli.verbose, 2);
            assert_eq!(cli.log_format, LogFormatArg::Json);
            if let Commands::Run(args) = cli.command {
                assert_eq!(
                    args.scenarios,
                    vec!["apps-page-available", "search-page-available"]
                );
                assert!(args.simulate);
                assert!(args.fail_fast);
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.format, ReportFormat::Json);
                assert_eq!(args.base_url.as_deref(), Some("http://tv.local/"));
            } else {
                panic!("expected Run command");
            }
        }

        #[test]
        fn test_missing_subcommand_is_error() {
            assert!(Cli::try_parse_from(["tenfoot"]).is_err());
        }
    }

    mod arg_conversion_tests {
        use super::*;

        #[test]
        fn test_color_arg() {
            assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
            assert_eq!(ColorChoice::from(ColorArg::Auto), ColorChoice::Auto);
        }

        #[test]
        fn test_log_format_arg() {
            assert_eq!(LogFormat::from(LogFormatArg::Json), LogFormat::Json);
        }
    }
}

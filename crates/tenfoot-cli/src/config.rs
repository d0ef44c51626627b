//! Console settings: how much the CLI prints and logs, and whether it colors
//! its output. Separate from [`tenfoot::Settings`], which describes the TV
//! application under test.

use crate::commands::Cli;
use crate::output::ProgressReporter;

/// How much a run prints to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Failed scenarios and a failing summary only
    Quiet,
    /// One line per scenario
    #[default]
    Normal,
    /// Screen transitions and scans logged (`-v`)
    Verbose,
    /// Every key press and focus read logged (`-vv`)
    Debug,
}

impl Verbosity {
    /// From the `-q` flag and the `-v` count; `-q` wins
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Whether per-scenario output is suppressed
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Fallback `tracing` filter when `RUST_LOG` is unset. Only tenfoot's
    /// own targets get louder with `-v`.
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "warn,tenfoot=info,tenfoot_cli=info",
            Self::Debug => "info,tenfoot=debug,tenfoot_cli=debug",
        }
    }
}

/// Whether to color console output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Always
    Always,
    /// When stderr supports it
    #[default]
    Auto,
    /// Never
    Never,
}

impl ColorChoice {
    /// Resolve against stderr, where all progress output goes
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stderr().features().colors_supported(),
        }
    }
}

/// Console settings taken from the global flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleOptions {
    /// Output level
    pub verbosity: Verbosity,
    /// Color choice
    pub color: ColorChoice,
}

impl ConsoleOptions {
    /// From `-q`, `-v` and `--color`
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            verbosity: Verbosity::from_flags(cli.quiet, cli.verbose),
            color: cli.color.into(),
        }
    }

    /// A reporter honoring these options
    #[must_use]
    pub fn reporter(self) -> ProgressReporter {
        ProgressReporter::new(self.color.should_color(), self.verbosity.is_quiet())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    mod verbosity_tests {
        use super::*;

        #[test]
        fn test_from_flags() {
            assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
            assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
            assert_eq!(Verbosity::from_flags(false, 3), Verbosity::Debug);
            assert_eq!(Verbosity::from_flags(true, 2), Verbosity::Quiet);
        }

        #[test]
        fn test_log_filter_scopes_tenfoot() {
            assert_eq!(Verbosity::Normal.log_filter(), "warn");
            assert!(Verbosity::Verbose.log_filter().contains("tenfoot=info"));
            assert!(Verbosity::Debug.log_filter().contains("tenfoot=debug"));
        }
    }

    mod console_options_tests {
        use super::*;

        #[test]
        fn test_from_global_flags() {
            let cli = Cli::parse_from(["tenfoot", "-q", "--color", "never", "list"]);
            let options = ConsoleOptions::from_cli(&cli);
            assert_eq!(options.verbosity, Verbosity::Quiet);
            assert_eq!(options.color, ColorChoice::Never);
            assert!(!options.color.should_color());
        }

        #[test]
        fn test_defaults() {
            let cli = Cli::parse_from(["tenfoot", "list"]);
            let options = ConsoleOptions::from_cli(&cli);
            assert_eq!(options.verbosity, Verbosity::Normal);
            assert_eq!(options.color, ColorChoice::Auto);
        }
    }
}

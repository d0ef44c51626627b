//! Console output for scenario runs.
//!
//! Progress goes to stderr so that `--format json` keeps stdout parseable.
//! Failures are printed even in quiet mode.

use crate::error::CliResult;
use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tenfoot::{ScenarioKind, ScenarioReport};

/// Spinner while a scenario runs, one result line when it ends
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    use_color: bool,
    quiet: bool,
}

impl ProgressReporter {
    /// Reporter on stderr
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn mark(&self, passed: bool) -> String {
        match (passed, self.use_color) {
            (true, true) => style("✓").green().bold().to_string(),
            (false, true) => style("✗").red().bold().to_string(),
            (true, false) => "PASS".to_string(),
            (false, false) => "FAIL".to_string(),
        }
    }

    /// What is about to run and against what
    pub fn run_banner(&self, scenarios: usize, target: &str, seed: u64) {
        if self.quiet {
            return;
        }
        let title = format!("tenfoot: {scenarios} scenarios against {target}");
        if self.use_color {
            self.line(&style(title).bold().to_string());
        } else {
            self.line(&title);
        }
        self.line(&format!("seed {seed} (pass --seed {seed} to replay)"));
    }

    /// Spin while `kind` runs
    pub fn start_scenario(&mut self, kind: ScenarioKind) {
        if self.quiet {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("{kind}: {}", kind.description()));
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    /// Clear the spinner, print the outcome and, unless quiet, the notes
    pub fn finish_scenario(&mut self, report: &ScenarioReport) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        let head = format!(
            "{} {} ({}ms)",
            self.mark(report.passed),
            report.scenario,
            report.duration_ms
        );
        if report.passed {
            if self.quiet {
                return;
            }
            self.line(&head);
        } else {
            let kind = report
                .failure_kind
                .map_or_else(String::new, |k| format!("[{k}] "));
            let error = report.error.as_deref().unwrap_or("no error recorded");
            self.line(&format!("{head}: {kind}{error}"));
        }
        if !self.quiet {
            for note in &report.notes {
                self.line(&format!("    {note}"));
            }
        }
    }

    /// Totals, and the names of failed scenarios
    pub fn summary(&self, reports: &[ScenarioReport], duration: Duration) {
        let failed: Vec<&ScenarioReport> = reports.iter().filter(|r| !r.passed).collect();
        if self.quiet && failed.is_empty() {
            return;
        }
        let total = reports.len();
        let passed = total - failed.len();
        let status = if failed.is_empty() { "PASSED" } else { "FAILED" };
        let status = if !self.use_color {
            status.to_string()
        } else if failed.is_empty() {
            Style::new().green().bold().apply_to(status).to_string()
        } else {
            Style::new().red().bold().apply_to(status).to_string()
        };

        self.line("");
        self.line(&format!(
            "{status} {total} scenarios in {:.2}s ({passed} passed, {} failed)",
            duration.as_secs_f64(),
            failed.len()
        ));
        for report in failed {
            self.line(&format!("  {}", report.scenario));
        }
    }
}

/// Reports as a pretty JSON array
pub fn render_reports_json(reports: &[ScenarioReport]) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tenfoot::FailureKind;

    fn report(passed: bool) -> ScenarioReport {
        ScenarioReport {
            scenario: ScenarioKind::AppsPageAvailable,
            passed,
            duration_ms: 12,
            failure_kind: (!passed).then_some(FailureKind::Precondition),
            error: (!passed).then(|| "apps grid never appeared".to_string()),
            notes: vec!["url: http://tenfoot.sim/page/499".to_string()],
        }
    }

    mod reporter_tests {
        use super::*;

        #[test]
        fn test_marks() {
            let plain = ProgressReporter::new(false, false);
            assert_eq!(plain.mark(true), "PASS");
            assert_eq!(plain.mark(false), "FAIL");
        }

        #[test]
        fn test_scenario_lifecycle() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_scenario(ScenarioKind::AppsPageAvailable);
            assert!(reporter.spinner.is_some());
            reporter.finish_scenario(&report(true));
            assert!(reporter.spinner.is_none());
        }

        #[test]
        fn test_quiet_mode_has_no_spinner() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_scenario(ScenarioKind::AppsPageAvailable);
            assert!(reporter.spinner.is_none());
            reporter.finish_scenario(&report(false));
        }

        #[test]
        fn test_banner_and_summary() {
            let reporter = ProgressReporter::new(false, false);
            reporter.run_banner(2, "simulated TV", 7);
            reporter.summary(&[report(true), report(false)], Duration::from_secs(3));
        }
    }

    mod json_tests {
        use super::*;

        #[test]
        fn test_render_reports_json() {
            let json = render_reports_json(&[report(true), report(false)]).unwrap();
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value[0]["passed"], true);
            assert!(value[0].get("error").is_none());
            assert_eq!(value[1]["failure_kind"], "precondition");
        }
    }
}

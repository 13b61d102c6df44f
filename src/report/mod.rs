//! Report generation for batch results
//!
//! CDD Principle: Anti-Corruption Layer - Formatters translate domain objects to external formats
//! - BatchReport (domain) is rendered as a terminal summary or as JSON
//! - Paths are shown relative to the project root when possible
//! - Failure lines carry the path and the underlying message

use crate::domain::violations::{BatchReport, FileOutcome, MuterError, MuterResult};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Supported output formats for the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One-line human summary, failures on stderr
    #[default]
    Human,
    /// JSON document for programmatic consumption
    Json,
}

/// Options for customizing report output
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// The batch ran without writing files
    pub dry_run: bool,
    /// Paths are displayed relative to this directory
    pub project_root: Option<PathBuf>,
}

/// Renders batch reports
#[derive(Debug, Clone, Default)]
pub struct SummaryFormatter {
    options: ReportOptions,
}

impl SummaryFormatter {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format the whole report for stdout
    pub fn format_report(&self, report: &BatchReport, format: OutputFormat) -> MuterResult<String> {
        match format {
            OutputFormat::Human => Ok(self.format_summary(report)),
            OutputFormat::Json => self.format_json(report),
        }
    }

    /// Final summary line
    pub fn format_summary(&self, report: &BatchReport) -> String {
        let total = report.total_files();
        let annotated = report.annotated_count();

        if report.has_failures() {
            let line = format!(
                "Failed to process {} of {} files; ESLint errors disabled for {}.",
                report.failures.len(),
                total,
                annotated
            );
            return self.paint_error(&line);
        }

        let line = if self.options.dry_run {
            format!(
                "Dry run: ESLint errors would be disabled for {annotated} of {total} files ({} rules).",
                report.rules_disabled()
            )
        } else {
            format!("ESLint errors disabled for {annotated} of {total} files.")
        };
        self.paint_success(&line)
    }

    /// One `Error: <path>: <message>` line per failed file
    pub fn format_failures(&self, report: &BatchReport) -> Vec<String> {
        report
            .failures
            .iter()
            .map(|failure| {
                let line = format!("Error: {}: {}", self.display_path(&failure.path), failure.error);
                self.paint_error(&line)
            })
            .collect()
    }

    /// Format a startup error the way per-file failures are shown
    pub fn format_error(&self, error: &MuterError) -> String {
        self.paint_error(&format!("Error: {error}"))
    }

    fn format_json(&self, report: &BatchReport) -> MuterResult<String> {
        let files: Vec<_> = report
            .outcomes
            .iter()
            .map(|(path, outcome)| {
                let (status, rules) = match outcome {
                    FileOutcome::Clean => ("clean", 0),
                    FileOutcome::Annotated { rule_count } => ("annotated", *rule_count),
                    FileOutcome::WouldAnnotate { rule_count } => ("would_annotate", *rule_count),
                };
                json!({
                    "path": self.display_path(path),
                    "status": status,
                    "rules": rules,
                })
            })
            .collect();

        let failures: Vec<_> = report
            .failures
            .iter()
            .map(|failure| {
                json!({
                    "path": self.display_path(&failure.path),
                    "error": failure.error.to_string(),
                })
            })
            .collect();

        let document = json!({
            "dry_run": self.options.dry_run,
            "files": files,
            "failures": failures,
            "summary": {
                "total_files": report.total_files(),
                "annotated": report.annotated_count(),
                "clean": report.clean_count(),
                "failed": report.failures.len(),
                "rules_disabled": report.rules_disabled(),
                "elapsed_ms": report.elapsed.as_millis() as u64,
            },
        });

        serde_json::to_string_pretty(&document)
            .map_err(|e| MuterError::config(format!("Failed to serialize report: {e}")))
    }

    fn display_path(&self, path: &Path) -> String {
        self.options
            .project_root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path)
            .display()
            .to_string()
    }

    fn paint_success(&self, text: &str) -> String {
        paint(text, self.options.use_colors, false)
    }

    fn paint_error(&self, text: &str) -> String {
        paint(text, self.options.use_colors, true)
    }
}

#[cfg(feature = "colors")]
fn paint(text: &str, use_colors: bool, is_error: bool) -> String {
    use colored::Colorize;

    if !use_colors {
        return text.to_string();
    }
    if is_error {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

#[cfg(not(feature = "colors"))]
fn paint(text: &str, _use_colors: bool, _is_error: bool) -> String {
    text.to_string()
}

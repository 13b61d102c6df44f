//! Core domain models for lint results, per-file outcomes and batch reports
//!
//! Architecture: Rich Domain Models - a RuleSet knows how to absorb ESLint's rule ids
//! - RuleSet de-duplicates rule ids while keeping the order ESLint reported them in
//! - BatchReport acts as an aggregate root over every file a run touched
//! - Per-file failures are values in the report, never panics or early returns

use indexmap::IndexSet;
use std::path::PathBuf;
use std::time::Duration;

/// The set of rule identifiers a single file violates
///
/// Rule ids are open-ended strings owned by the linting engine's catalog, so no
/// closed enumeration exists. Iteration order is first-seen order, which keeps the
/// generated header stable for a given lint output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: IndexSet<String>,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule id, returning false if it was already present
    pub fn insert(&mut self, rule_id: impl Into<String>) -> bool {
        self.rules.insert(rule_id.into())
    }

    pub fn contains(&self, rule_id: &str) -> bool {
        self.rules.contains(rule_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate rule ids in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for RuleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}

impl<S: Into<String>> Extend<S> for RuleSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for rule in iter {
            self.insert(rule);
        }
    }
}

/// What happened to one file that completed its pipeline
///
/// Only the number of disabled rules leaves the pipeline; the RuleSet itself is
/// dropped when the file's task ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file had no reportable violations and was left untouched
    Clean,
    /// A suppression header was written for this many rules
    Annotated { rule_count: usize },
    /// Dry run: this many rules would have been disabled
    WouldAnnotate { rule_count: usize },
}

impl FileOutcome {
    /// Number of rules that were (or would have been) disabled
    pub fn rule_count(&self) -> Option<usize> {
        match *self {
            Self::Clean => None,
            Self::Annotated { rule_count } | Self::WouldAnnotate { rule_count } => Some(rule_count),
        }
    }
}

/// A file whose pipeline failed; isolated from every other file in the batch
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: MuterError,
}

impl FileFailure {
    pub fn new(path: PathBuf, error: MuterError) -> Self {
        Self { path, error }
    }

    /// Format failure for display
    pub fn format_display(&self) -> String {
        format!("{}: {}", self.path.display(), self.error)
    }
}

/// Complete result of one batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files that completed, with their outcome
    pub outcomes: Vec<(PathBuf, FileOutcome)>,
    /// Files whose pipeline failed
    pub failures: Vec<FileFailure>,
    /// Wall-clock time of the batch
    pub elapsed: Duration,
}

impl BatchReport {
    /// Create a new empty batch report
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_outcome(&mut self, path: PathBuf, outcome: FileOutcome) {
        self.outcomes.push((path, outcome));
    }

    pub fn record_failure(&mut self, failure: FileFailure) {
        self.failures.push(failure);
    }

    /// Total number of files the batch was asked to process
    pub fn total_files(&self) -> usize {
        self.outcomes.len() + self.failures.len()
    }

    /// Files that received (or would receive) a header, with their rule count
    pub fn annotated(&self) -> impl Iterator<Item = (&PathBuf, usize)> {
        self.outcomes
            .iter()
            .filter_map(|(path, outcome)| outcome.rule_count().map(|count| (path, count)))
    }

    /// Total suppression lines written (or planned) across all files
    pub fn rules_disabled(&self) -> usize {
        self.annotated().map(|(_, count)| count).sum()
    }

    pub fn annotated_count(&self) -> usize {
        self.annotated().count()
    }

    pub fn clean_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, FileOutcome::Clean))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Sort by path so output does not depend on completion order
    pub fn sort(&mut self) {
        self.outcomes.sort_by(|a, b| a.0.cmp(&b.0));
        self.failures.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

/// Error types that can occur while muting a codebase
#[derive(Debug, thiserror::Error)]
pub enum MuterError {
    /// Command line input was incomplete or contradictory
    #[error("Usage error: {message}")]
    Usage { message: String },

    /// Configuration could not be loaded, parsed or validated
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The linting engine is not installed in the target project
    #[error(
        "Could not find '{dependency}' in {}: {reason}. Please ensure it is installed.",
        project_root.display()
    )]
    LintEngineUnavailable {
        dependency: String,
        project_root: PathBuf,
        reason: String,
    },

    /// The file system walk could not enumerate candidate files
    #[error("Discovery error in {}: {message}", root.display())]
    Discovery { root: PathBuf, message: String },

    /// Glob pattern compilation failed
    #[error("Pattern error: {message}")]
    Pattern { message: String },

    /// The linting engine failed on a specific file
    #[error("Lint error in {file}: {message}")]
    Lint { file: String, message: String },

    /// Reading or writing a specific file failed
    #[error("Failed to {action} {}: {source}", file.display())]
    FileIo {
        action: &'static str,
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Pipeline task ended without producing a result
    #[error("Pipeline for {file} aborted: {message}")]
    Pipeline { file: String, message: String },

    /// Any other I/O failure
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl MuterError {
    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an engine-unavailable error for the given dependency
    pub fn engine_unavailable(
        dependency: impl Into<String>,
        project_root: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::LintEngineUnavailable {
            dependency: dependency.into(),
            project_root: project_root.into(),
            reason: reason.into(),
        }
    }

    /// Create a discovery error
    pub fn discovery(root: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Discovery {
            root: root.into(),
            message: message.into(),
        }
    }

    /// Create a pattern error
    pub fn pattern(message: impl Into<String>) -> Self {
        Self::Pattern {
            message: message.into(),
        }
    }

    /// Create a lint error
    pub fn lint(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Lint {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn read(file: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo {
            action: "read",
            file: file.into(),
            source,
        }
    }

    pub fn write(file: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo {
            action: "write",
            file: file.into(),
            source,
        }
    }

    /// Create a pipeline error
    pub fn pipeline(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pipeline {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Whether this error stops the run before any file is touched
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            Self::Usage { .. }
                | Self::Configuration { .. }
                | Self::LintEngineUnavailable { .. }
                | Self::Discovery { .. }
                | Self::Pattern { .. }
        )
    }
}

/// Result type for muter operations
pub type MuterResult<T> = Result<T, MuterError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_rule_set_deduplicates_and_keeps_order() {
        let rules: RuleSet = ["no-unused-vars", "eqeqeq", "no-unused-vars", "semi"]
            .into_iter()
            .collect();

        assert_eq!(rules.len(), 3);
        assert_eq!(
            rules.iter().collect::<Vec<_>>(),
            vec!["no-unused-vars", "eqeqeq", "semi"]
        );
        assert!(rules.contains("eqeqeq"));
        assert!(!rules.contains("no-undef"));
    }

    #[test]
    fn test_rule_set_insert_reports_duplicates() {
        let mut rules = RuleSet::new();
        assert!(rules.is_empty());
        assert!(rules.insert("semi"));
        assert!(!rules.insert("semi"));
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_batch_report_counts() {
        let mut report = BatchReport::new();
        report.record_outcome(PathBuf::from("b.js"), FileOutcome::Clean);
        report.record_outcome(PathBuf::from("a.js"), FileOutcome::Annotated { rule_count: 2 });
        report.record_failure(FileFailure::new(
            PathBuf::from("c.js"),
            MuterError::lint("c.js", "boom"),
        ));

        assert_eq!(report.total_files(), 3);
        assert_eq!(report.annotated_count(), 1);
        assert_eq!(report.clean_count(), 1);
        assert_eq!(report.rules_disabled(), 2);
        assert!(report.has_failures());

        report.sort();
        assert_eq!(report.outcomes[0].0, Path::new("a.js"));
    }

    #[test]
    fn test_error_messages_carry_context() {
        let error = MuterError::engine_unavailable("eslint", "/work/app", "binary not found");
        let message = error.to_string();
        assert!(message.contains("'eslint'"));
        assert!(message.contains("/work/app"));
        assert!(error.is_startup_error());

        let failure = FileFailure::new(
            PathBuf::from("src/a.js"),
            MuterError::write(
                "src/a.js",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            ),
        );
        assert!(failure.format_display().starts_with("src/a.js: Failed to write src/a.js"));
        assert!(!failure.error.is_startup_error());
    }
}

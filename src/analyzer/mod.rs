//! Batch orchestration for ESLint Muter
//!
//! CDD Principle: Domain Services - BatchRunner drives the per-file lint-then-annotate pipeline
//! - LintEngine abstracts the external linter so it can be swapped for mocks
//! - A semaphore caps the number of in-flight pipelines at the configured concurrency
//! - Failures are isolated per file and collected after every pipeline has finished

pub mod eslint;

pub use eslint::EslintEngine;

use crate::annotator::Annotator;
use crate::domain::violations::{
    BatchReport, FileFailure, FileOutcome, MuterError, MuterResult, RuleSet,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

/// Trait for linting engines
///
/// Implementations are shared by every pipeline in a batch and must tolerate
/// concurrent calls without per-call mutation.
#[async_trait]
pub trait LintEngine: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    /// Lint one file and return the de-duplicated set of violated rule ids
    async fn lint_file(&self, path: &Path) -> MuterResult<RuleSet>;
}

/// Run the pipeline for one file: lint, then annotate
pub async fn process_file(
    engine: &dyn LintEngine,
    annotator: &Annotator,
    path: &Path,
) -> MuterResult<FileOutcome> {
    let rules = engine.lint_file(path).await?;
    annotator.annotate(path, rules).await
}

/// Applies the lint-and-annotate pipeline to a file list with bounded concurrency
pub struct BatchRunner {
    engine: Arc<dyn LintEngine>,
    annotator: Arc<Annotator>,
    concurrency: usize,
}

impl BatchRunner {
    /// Create a runner; a concurrency of 0 is treated as 1
    pub fn new(engine: Arc<dyn LintEngine>, annotator: Annotator, concurrency: usize) -> Self {
        Self {
            engine,
            annotator: Arc::new(annotator),
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Process every file and wait for all pipelines to finish
    ///
    /// A failing file never stops its siblings; every failure is collected into
    /// the returned report.
    pub async fn run(&self, files: Vec<PathBuf>) -> BatchReport {
        let start_time = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut report = BatchReport::new();
        let mut pipelines = Vec::with_capacity(files.len());

        tracing::debug!(
            "Processing {} file(s) with {} (max concurrent: {})",
            files.len(),
            self.engine.name(),
            self.concurrency
        );

        for path in files {
            // Acquire before spawning so no more than `concurrency` pipelines ever exist at once
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    report.record_failure(FileFailure::new(
                        path.clone(),
                        MuterError::pipeline(path.display().to_string(), e.to_string()),
                    ));
                    continue;
                }
            };

            let engine = Arc::clone(&self.engine);
            let annotator = Arc::clone(&self.annotator);
            let task_path = path.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                process_file(engine.as_ref(), &annotator, &task_path).await
            });
            pipelines.push((path, handle));
        }

        for (path, handle) in pipelines {
            match handle.await {
                Ok(Ok(outcome)) => report.record_outcome(path, outcome),
                Ok(Err(error)) => {
                    let failure = FileFailure::new(path, error);
                    tracing::warn!("Failed to process {}", failure.format_display());
                    report.record_failure(failure);
                }
                Err(join_error) => {
                    tracing::warn!("Pipeline for {} panicked: {}", path.display(), join_error);
                    let error =
                        MuterError::pipeline(path.display().to_string(), join_error.to_string());
                    report.record_failure(FileFailure::new(path, error));
                }
            }
        }

        report.elapsed = start_time.elapsed();
        report.sort();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotator::build_header;
    use crate::test_support::{InstrumentedEngine, TableEngine};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_files(root: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = root.join(name);
                fs::write(&path, format!("// {name}\nvar x = 1;\n")).unwrap();
                path
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_never_exceeds_limit() {
        let temp_dir = TempDir::new().unwrap();
        let names: Vec<String> = (0..25).map(|i| format!("f{i}.js")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let files = write_files(temp_dir.path(), &names);

        let engine = Arc::new(InstrumentedEngine::new(Duration::from_millis(20)));
        let runner = BatchRunner::new(engine.clone(), Annotator::new("x"), 3);

        let report = runner.run(files).await;

        assert_eq!(engine.calls(), 25);
        assert_eq!(report.total_files(), 25);
        assert!(engine.high_water_mark() <= 3);
        // With 25 slow files and 3 permits the runner should actually overlap work
        assert!(engine.high_water_mark() > 1);
    }

    #[tokio::test]
    async fn test_concurrency_of_one_is_serial() {
        let temp_dir = TempDir::new().unwrap();
        let files = write_files(temp_dir.path(), &["a.js", "b.js", "c.js", "d.js"]);

        let engine = Arc::new(InstrumentedEngine::new(Duration::from_millis(5)));
        let runner = BatchRunner::new(engine.clone(), Annotator::new("x"), 1);

        runner.run(files).await;

        assert_eq!(engine.high_water_mark(), 1);
    }

    #[tokio::test]
    async fn test_annotates_dirty_and_skips_clean_files() {
        let temp_dir = TempDir::new().unwrap();
        let files = write_files(temp_dir.path(), &["a.js", "b.js"]);
        let clean_before = fs::read(&files[1]).unwrap();

        let engine = Arc::new(TableEngine::new().with_rules("a.js", &["no-unused-vars"]));
        let runner = BatchRunner::new(engine, Annotator::new("TODO: Fix later."), 10);

        let report = runner.run(files.clone()).await;

        assert!(!report.has_failures());
        assert_eq!(report.annotated_count(), 1);
        assert_eq!(report.clean_count(), 1);
        assert_eq!(
            fs::read_to_string(&files[0]).unwrap(),
            "// TODO: Fix later.\n/* eslint-disable no-unused-vars */\n// a.js\nvar x = 1;\n"
        );
        assert_eq!(fs::read(&files[1]).unwrap(), clean_before);
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_file() {
        let temp_dir = TempDir::new().unwrap();
        let files = write_files(temp_dir.path(), &["a.js", "broken.js", "c.js"]);
        let broken_before = fs::read(&files[1]).unwrap();

        let engine = Arc::new(
            TableEngine::new()
                .with_rules("a.js", &["semi"])
                .with_rules("c.js", &["eqeqeq", "semi"])
                .failing_on("broken.js"),
        );
        let runner = BatchRunner::new(engine, Annotator::new("x"), 2);

        let report = runner.run(files.clone()).await;

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, files[1]);
        assert!(matches!(report.failures[0].error, MuterError::Lint { .. }));
        assert_eq!(report.annotated_count(), 2);
        assert_eq!(report.rules_disabled(), 3);
        assert_eq!(fs::read(&files[1]).unwrap(), broken_before);

        let rules: RuleSet = ["eqeqeq", "semi"].into_iter().collect();
        assert!(fs::read_to_string(&files[2])
            .unwrap()
            .starts_with(&build_header("x", &rules)));
    }

    #[tokio::test]
    async fn test_panicking_pipeline_is_reported_not_propagated() {
        let temp_dir = TempDir::new().unwrap();
        let files = write_files(temp_dir.path(), &["a.js", "boom.js"]);

        let engine = Arc::new(
            TableEngine::new()
                .with_rules("a.js", &["semi"])
                .panicking_on("boom.js"),
        );
        let runner = BatchRunner::new(engine, Annotator::new("x"), 4);

        let report = runner.run(files.clone()).await;

        assert_eq!(report.annotated_count(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            MuterError::Pipeline { .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_file_fails_only_that_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut files = write_files(temp_dir.path(), &["a.js"]);
        files.push(temp_dir.path().join("vanished.js"));

        let engine = Arc::new(
            TableEngine::new()
                .with_rules("a.js", &["semi"])
                .with_rules("vanished.js", &["semi"]),
        );
        let runner = BatchRunner::new(engine, Annotator::new("x"), 2);

        let report = runner.run(files).await;

        assert_eq!(report.annotated_count(), 1);
        assert!(matches!(
            report.failures[0].error,
            MuterError::FileIo { action: "read", .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_file_list() {
        let engine = Arc::new(TableEngine::new());
        let runner = BatchRunner::new(engine, Annotator::new("x"), 0);

        assert_eq!(runner.concurrency(), 1);
        let report = runner.run(Vec::new()).await;
        assert_eq!(report.total_files(), 0);
    }
}

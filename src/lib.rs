//! ESLint Muter - bulk suppression of ESLint violations
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Discovery, linting and annotation are separate services wired together here
//! - The linting engine sits behind a trait so the pipeline runs without Node.js in tests
//! - The CLI only translates flags into a MuterConfig and prints the BatchReport

pub mod analyzer;
pub mod annotator;
pub mod config;
pub mod domain;
pub mod patterns;
pub mod report;

#[cfg(test)]
mod test_support;

// Re-export main types for convenient access
pub use domain::violations::{
    BatchReport, FileFailure, FileOutcome, MuterError, MuterResult, RuleSet,
};

pub use config::{MuterConfig, MuterConfigBuilder, OptionsFile};

pub use analyzer::{BatchRunner, EslintEngine, LintEngine};

pub use annotator::Annotator;

pub use patterns::{FileDiscoverer, IgnoreList, PathFilter};

pub use report::{OutputFormat, ReportOptions, SummaryFormatter};

use std::path::PathBuf;
use std::sync::Arc;

/// Runs one muting batch: discover, lint, annotate
pub struct Muter {
    config: MuterConfig,
    engine: Arc<dyn LintEngine>,
}

impl Muter {
    /// Create a muter backed by the project's ESLint installation
    ///
    /// Fails with `LintEngineUnavailable` before any file is discovered or touched.
    pub async fn from_config(config: MuterConfig) -> MuterResult<Self> {
        let engine = EslintEngine::locate(config.project_root()).await?;
        Ok(Self::with_engine(config, Arc::new(engine)))
    }

    /// Create a muter with an explicit engine
    pub fn with_engine(config: MuterConfig, engine: Arc<dyn LintEngine>) -> Self {
        Self { config, engine }
    }

    pub fn config(&self) -> &MuterConfig {
        &self.config
    }

    /// Expand the configured directory and pattern into the files to process
    pub fn discover(&self) -> MuterResult<Vec<PathBuf>> {
        let ignore = IgnoreList::load(self.config.ignore_file());
        let discoverer = FileDiscoverer::from_config(&self.config, &ignore)?;
        discoverer.discover()
    }

    /// Discover files and run the pipeline over all of them
    ///
    /// Startup problems are returned as errors; per-file problems end up in the report.
    pub async fn run(&self) -> MuterResult<BatchReport> {
        let files = self.discover()?;
        tracing::debug!("Found {} file(s) to lint", files.len());

        let runner = BatchRunner::new(
            Arc::clone(&self.engine),
            Annotator::from_config(&self.config),
            self.config.concurrency(),
        );

        Ok(runner.run(files).await)
    }
}

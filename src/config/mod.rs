//! Configuration loading and management for ESLint Muter
//!
//! Architecture: Anti-Corruption Layer - Configuration translates CLI flags and a flat YAML file
//! - Raw option values are merged and validated into one immutable MuterConfig
//! - Defaults live here, not in the CLI layer
//! - Process-wide state (working directory) becomes an explicit project root

use crate::domain::violations::{MuterError, MuterResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Glob used when neither the CLI nor the options file names one
pub const DEFAULT_PATTERN: &str = "**/*.js";

/// Maximum in-flight file pipelines by default
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Text placed on the first header line
pub const DEFAULT_PREFIX: &str = "TODO: Fix later.";

/// Ignore file read from the project root
pub const DEFAULT_IGNORE_FILE: &str = ".eslintignore";

/// Options files looked up in the project root, in order
pub const DEFAULT_OPTIONS_FILES: [&str; 3] =
    ["eslint_muter.yaml", "eslint_muter.yml", ".eslint_muter.yaml"];

/// Immutable run configuration, constructed once and shared read-only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuterConfig {
    base_dir: PathBuf,
    project_root: PathBuf,
    ignore_file: PathBuf,
    pattern: String,
    concurrency: usize,
    comment_prefix: String,
    verbose: bool,
    dry_run: bool,
}

impl MuterConfig {
    /// Start building a configuration for the given base directory
    pub fn builder(base_dir: impl Into<PathBuf>) -> MuterConfigBuilder {
        MuterConfigBuilder::new(base_dir)
    }

    /// Directory the glob pattern is evaluated against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory ESLint runs in and ignore patterns are relative to
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn ignore_file(&self) -> &Path {
        &self.ignore_file
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn comment_prefix(&self) -> &str {
        &self.comment_prefix
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> MuterResult<()> {
        if self.base_dir.as_os_str().is_empty() {
            return Err(MuterError::usage("You must provide a directory path"));
        }

        if self.concurrency == 0 {
            return Err(MuterError::config("Concurrency must be at least 1"));
        }

        // A line break would push the rest of the prefix out of the `//` comment
        if self.comment_prefix.contains(['\n', '\r']) {
            return Err(MuterError::config(
                "Comment prefix must fit on a single line",
            ));
        }

        glob::Pattern::new(&self.pattern).map_err(|e| {
            MuterError::config(format!("Invalid file pattern '{}': {e}", self.pattern))
        })?;

        Ok(())
    }
}

/// Flat key-value options read from a YAML file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsFile {
    pub pattern: Option<String>,
    pub concurrency: Option<usize>,
    pub prefix: Option<String>,
    pub verbose: Option<bool>,
    pub ignore_file: Option<PathBuf>,
}

impl OptionsFile {
    /// Load options from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> MuterResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            MuterError::config(format!(
                "Failed to read options file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::parse(&contents).map_err(|e| {
            MuterError::config(format!(
                "Failed to parse options file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// Load options from string content
    pub fn load_from_str(content: &str) -> MuterResult<Self> {
        Self::parse(content).map_err(|e| MuterError::config(format!("Failed to parse options: {e}")))
    }

    fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to unit, not to a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Find and load the first default options file in the project root
    pub fn discover<P: AsRef<Path>>(project_root: P) -> MuterResult<Option<(PathBuf, Self)>> {
        for name in DEFAULT_OPTIONS_FILES {
            let candidate = project_root.as_ref().join(name);
            if candidate.is_file() {
                let options = Self::load_from_file(&candidate)?;
                tracing::debug!("Loaded options from {}", candidate.display());
                return Ok(Some((candidate, options)));
            }
        }
        Ok(None)
    }
}

/// Builder merging defaults, an options file and explicit overrides
#[derive(Debug, Clone, Default)]
pub struct MuterConfigBuilder {
    base_dir: PathBuf,
    project_root: Option<PathBuf>,
    ignore_file: Option<PathBuf>,
    pattern: Option<String>,
    concurrency: Option<usize>,
    comment_prefix: Option<String>,
    verbose: Option<bool>,
    dry_run: bool,
}

impl MuterConfigBuilder {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Default::default()
        }
    }

    /// Apply values from an options file; later setters override them
    pub fn options_file(mut self, options: OptionsFile) -> Self {
        if options.pattern.is_some() {
            self.pattern = options.pattern;
        }
        if options.concurrency.is_some() {
            self.concurrency = options.concurrency;
        }
        if options.prefix.is_some() {
            self.comment_prefix = options.prefix;
        }
        if options.verbose.is_some() {
            self.verbose = options.verbose;
        }
        if options.ignore_file.is_some() {
            self.ignore_file = options.ignore_file;
        }
        self
    }

    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Ignore file path; relative paths resolve against the project root
    pub fn ignore_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_file = Some(path.into());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    pub fn comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.comment_prefix = Some(prefix.into());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> MuterResult<MuterConfig> {
        let project_root = match self.project_root {
            Some(root) => root,
            None => std::env::current_dir()?,
        };

        let ignore_file = match self.ignore_file {
            Some(path) if path.is_absolute() => path,
            Some(path) => project_root.join(path),
            None => project_root.join(DEFAULT_IGNORE_FILE),
        };

        let config = MuterConfig {
            base_dir: self.base_dir,
            project_root,
            ignore_file,
            pattern: self.pattern.unwrap_or_else(|| DEFAULT_PATTERN.to_string()),
            concurrency: self.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            comment_prefix: self
                .comment_prefix
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            verbose: self.verbose.unwrap_or(false),
            dry_run: self.dry_run,
        };

        config.validate()?;
        Ok(config)
    }
}

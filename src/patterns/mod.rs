//! File discovery for ESLint Muter
//!
//! Architectural Principle: Service Layer - FileDiscoverer turns a directory and a glob into work
//! - The glob selects candidates relative to the base directory
//! - PathFilter applies default exclusions and .eslintignore patterns relative to the project root
//! - The result is a finite, sorted list produced once per run

pub mod ignore_file;
pub mod path_filter;

use crate::config::MuterConfig;
use crate::domain::violations::{MuterError, MuterResult};
use glob::MatchOptions;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

pub use ignore_file::IgnoreList;
pub use path_filter::PathFilter;

use path_filter::to_slash_path;

// Like a shell glob, `*` never crosses `/` and never matches a leading dot
const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Expands a base directory and glob pattern into the files to process
#[derive(Debug, Clone)]
pub struct FileDiscoverer {
    /// Directory walked for candidates (resolved against the project root)
    base_dir: PathBuf,
    /// Directory exclusion patterns are relative to
    project_root: PathBuf,
    /// Selection glob, relative to the base directory
    pattern: glob::Pattern,
    /// Default exclusions followed by ignore-file patterns
    filter: PathFilter,
}

impl FileDiscoverer {
    /// Create a discoverer; relative base directories resolve against the project root
    pub fn new(
        base_dir: impl AsRef<Path>,
        pattern: &str,
        project_root: impl Into<PathBuf>,
        ignore: &IgnoreList,
    ) -> MuterResult<Self> {
        let project_root = project_root.into();
        let base_dir = base_dir
            .as_ref()
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .fold(project_root.clone(), |acc, c| acc.join(c));

        let normalized = normalize_pattern(pattern);
        let pattern = glob::Pattern::new(&normalized)
            .map_err(|e| MuterError::pattern(format!("Invalid pattern '{pattern}': {e}")))?;

        let mut filter = PathFilter::with_defaults();
        filter.add_lenient(ignore.patterns());

        Ok(Self {
            base_dir,
            project_root,
            pattern,
            filter,
        })
    }

    /// Create a discoverer from the run configuration
    pub fn from_config(config: &MuterConfig, ignore: &IgnoreList) -> MuterResult<Self> {
        Self::new(
            config.base_dir(),
            config.pattern(),
            config.project_root(),
            ignore,
        )
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Walk the base directory and return every matching, non-excluded file
    pub fn discover(&self) -> MuterResult<Vec<PathBuf>> {
        tracing::debug!(
            "Searching in directory: {} with pattern: {}",
            self.base_dir.display(),
            self.pattern.as_str()
        );

        if !self.base_dir.exists() {
            return Err(MuterError::discovery(&self.base_dir, "directory does not exist"));
        }
        if !self.base_dir.is_dir() {
            return Err(MuterError::discovery(&self.base_dir, "not a directory"));
        }

        // Pruning whole directories is only sound when nothing can re-include their contents
        let prune = !self.filter.has_negations();
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.base_dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !(prune
                    && entry.depth() > 0
                    && entry.file_type().is_dir()
                    && self.is_excluded_dir(entry.path()))
            });

        for entry in walker {
            let entry = entry.map_err(|e| MuterError::discovery(&self.base_dir, e.to_string()))?;
            let path = entry.path();

            // Only process files, not directories
            if path.is_file() && self.matches(path) {
                files.push(path.to_path_buf());
            }
        }

        tracing::debug!("Discovered {} file(s)", files.len());
        Ok(files)
    }

    /// Whether a path under the base directory is selected by the glob and not excluded
    pub fn matches(&self, path: &Path) -> bool {
        let Ok(from_base) = path.strip_prefix(&self.base_dir) else {
            return false;
        };

        if !self.pattern.matches_with(&to_slash_path(from_base), GLOB_OPTIONS) {
            return false;
        }

        let relative = self.exclusion_path(path, from_base);
        if self.filter.is_excluded(relative) {
            if tracing::enabled!(tracing::Level::TRACE) {
                for line in self.filter.debug_patterns(relative) {
                    tracing::trace!("{}: {}", relative.display(), line);
                }
            }
            return false;
        }
        true
    }

    fn is_excluded_dir(&self, dir: &Path) -> bool {
        let Ok(from_base) = dir.strip_prefix(&self.base_dir) else {
            return false;
        };
        // A probe file inside the directory is excluded exactly when the directory is
        self.filter
            .is_excluded(self.exclusion_path(dir, from_base).join("__probe__"))
            && !self.filter.is_excluded("__probe__")
    }

    /// Exclusion patterns are project-relative; files outside the project fall back to base-relative
    fn exclusion_path<'a>(&self, path: &'a Path, from_base: &'a Path) -> &'a Path {
        path.strip_prefix(&self.project_root).unwrap_or(from_base)
    }
}

/// Drop `.` segments so the pattern lines up with the normalized candidate paths
fn normalize_pattern(pattern: &str) -> String {
    pattern
        .split('/')
        .enumerate()
        .filter(|(i, segment)| *segment != "." && !(*i > 0 && segment.is_empty()))
        .map(|(_, segment)| segment)
        .collect::<Vec<_>>()
        .join("/")
}

//! Path filtering using .gitignore-style patterns
//!
//! Architectural Principle: Service Layer - PathFilter owns the exclusion rules for discovery
//! - Encapsulates include/exclude evaluation in .eslintignore order (last match wins)
//! - Patterns are matched against project-relative paths with `/` separators
//! - Invalid ignore-file lines are reported and skipped rather than failing the run

use crate::domain::violations::{MuterError, MuterResult};
use glob::MatchOptions;
use std::path::{Component, Path};

/// Exclusions applied to every run, in front of the ignore file's patterns
pub const DEFAULT_EXCLUSIONS: [&str; 2] = ["**/node_modules/**", "**/.git/**"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Manages path filtering using .gitignore-style patterns
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    /// Include/exclude patterns in evaluation order
    patterns: Vec<FilterPattern>,
}

/// A single path filter pattern
#[derive(Debug, Clone)]
struct FilterPattern {
    /// The glob pattern with `!`, leading and trailing `/` removed
    pattern: glob::Pattern,
    /// Whether this is an include pattern (starts with !)
    is_include: bool,
    /// Pattern only matches directories (ends with /)
    dir_only: bool,
    /// Pattern is matched against whole paths rather than single names
    path_scoped: bool,
    /// Original pattern string for debugging
    original: String,
}

impl FilterPattern {
    fn parse(raw: &str) -> Result<Self, glob::PatternError> {
        let (is_include, body) = match raw.strip_prefix('!') {
            Some(stripped) => (true, stripped),
            None => (false, raw),
        };

        let (anchored, body) = match body.strip_prefix('/') {
            Some(stripped) => (true, stripped),
            None => (false, body),
        };

        let (dir_only, body) = match body.strip_suffix('/') {
            Some(stripped) => (true, stripped),
            None => (false, body),
        };

        Ok(Self {
            pattern: glob::Pattern::new(body)?,
            is_include,
            dir_only,
            path_scoped: anchored || body.contains('/'),
            original: raw.to_string(),
        })
    }

    /// Check the pattern against a file path and every directory above it
    fn matches(&self, relative: &str) -> bool {
        let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
        let Some((file_name, dirs)) = segments.split_last() else {
            return false;
        };

        if self.path_scoped {
            // Any ancestor directory prefix, then the file itself
            let mut prefix = String::new();
            for dir in dirs {
                if !prefix.is_empty() {
                    prefix.push('/');
                }
                prefix.push_str(dir);
                if self.pattern.matches_with(&prefix, MATCH_OPTIONS) {
                    return true;
                }
            }
            !self.dir_only && self.pattern.matches_with(&segments.join("/"), MATCH_OPTIONS)
        } else {
            dirs.iter()
                .any(|dir| self.pattern.matches_with(dir, MATCH_OPTIONS))
                || (!self.dir_only && self.pattern.matches_with(file_name, MATCH_OPTIONS))
        }
    }
}

impl PathFilter {
    /// Create a new path filter, rejecting any invalid pattern
    pub fn new<I, S>(patterns: I) -> MuterResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::default();
        for pattern in patterns {
            filter.add_pattern(pattern.as_ref())?;
        }
        Ok(filter)
    }

    /// Create a path filter with the default exclusions
    pub fn with_defaults() -> Self {
        let mut filter = Self::default();
        for pattern in DEFAULT_EXCLUSIONS {
            if let Err(e) = filter.add_pattern(pattern) {
                tracing::warn!("Skipping default exclusion '{}': {}", pattern, e);
            }
        }
        filter
    }

    /// Add a pattern to the filter
    pub fn add_pattern(&mut self, pattern: &str) -> MuterResult<()> {
        let parsed = FilterPattern::parse(pattern)
            .map_err(|e| MuterError::pattern(format!("Invalid pattern '{pattern}': {e}")))?;
        self.patterns.push(parsed);
        Ok(())
    }

    /// Add ignore-file patterns, skipping invalid ones with a warning
    pub fn add_lenient<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if let Err(e) = self.add_pattern(pattern) {
                // Log warning but don't fail - just skip invalid patterns
                tracing::warn!("Ignoring invalid exclusion pattern: {}", e);
            }
        }
    }

    /// Whether the path is excluded; `relative` is relative to the project root
    pub fn is_excluded<P: AsRef<Path>>(&self, relative: P) -> bool {
        let relative = to_slash_path(relative.as_ref());
        let mut excluded = false;

        // Apply patterns in order (like .gitignore)
        for pattern in &self.patterns {
            if pattern.matches(&relative) {
                excluded = !pattern.is_include;
            }
        }

        excluded
    }

    /// Whether any pattern can re-include a path
    pub fn has_negations(&self) -> bool {
        self.patterns.iter().any(|p| p.is_include)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Get debug information about patterns and their matches
    pub fn debug_patterns<P: AsRef<Path>>(&self, relative: P) -> Vec<String> {
        let relative = to_slash_path(relative.as_ref());

        self.patterns
            .iter()
            .enumerate()
            .map(|(i, pattern)| {
                format!(
                    "Pattern {}: {} -> {}",
                    i,
                    pattern.original,
                    if pattern.matches(&relative) { "MATCH" } else { "no match" }
                )
            })
            .collect()
    }
}

/// Render a relative path with `/` separators, dropping `.` components
pub(crate) fn to_slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

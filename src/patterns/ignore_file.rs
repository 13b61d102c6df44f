//! Loading of the optional .eslintignore exclusion list

use std::fs;
use std::path::Path;

/// Ordered exclusion patterns read once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    patterns: Vec<String>,
}

impl IgnoreList {
    /// Read the ignore file; a missing or unreadable file means "no exclusions"
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => {
                let list = Self::parse(&content);
                tracing::debug!(
                    "Loaded {} ignore pattern(s) from {}",
                    list.len(),
                    path.display()
                );
                list
            }
            Err(e) => {
                tracing::debug!("No {} file found ({})", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse ignore file content, dropping blank lines and `#` comments
    pub fn parse(content: &str) -> Self {
        let patterns = content
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
            .map(|line| line.trim_end().to_string())
            .collect();

        Self { patterns }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoreList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            patterns: iter.into_iter().map(Into::into).collect(),
        }
    }
}

//! Header insertion for files with lint violations
//!
//! Architecture: Infrastructure Layer - the Annotator is the only component that mutates files
//! - Header construction is a pure function of the prefix and the rule set
//! - A file is read and written back whole, within one pipeline
//! - Empty rule sets never touch the file

use crate::config::MuterConfig;
use crate::domain::violations::{FileOutcome, MuterError, MuterResult, RuleSet};
use std::path::Path;

/// Extensions whose syntax accepts a leading `//` line comment
pub const LINE_COMMENT_EXTENSIONS: [&str; 8] = ["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"];

/// The comment that disables one rule for the rest of the file
pub fn suppression_comment(rule_id: &str) -> String {
    format!("/* eslint-disable {rule_id} */")
}

/// Build the header: the prefix line, then one suppression line per rule
pub fn build_header(prefix: &str, rules: &RuleSet) -> String {
    let mut header = format!("// {prefix}\n");
    for rule in rules.iter() {
        header.push_str(&suppression_comment(rule));
        header.push('\n');
    }
    header
}

/// Whether the header's `//` comment is valid syntax for this file
pub fn uses_line_comments(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            LINE_COMMENT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Rewrites files by prepending a suppression header
#[derive(Debug, Clone)]
pub struct Annotator {
    prefix: String,
    dry_run: bool,
}

impl Annotator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            dry_run: false,
        }
    }

    pub fn from_config(config: &MuterConfig) -> Self {
        Self::new(config.comment_prefix()).with_dry_run(config.dry_run())
    }

    /// Report what would be written without touching any file
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Prepend the header for `rules` to the file at `path`
    pub async fn annotate(&self, path: &Path, rules: RuleSet) -> MuterResult<FileOutcome> {
        if rules.is_empty() {
            return Ok(FileOutcome::Clean);
        }

        if !uses_line_comments(path) {
            tracing::warn!(
                "{} may not support `//` comments; the header could be invalid syntax",
                path.display()
            );
        }

        if self.dry_run {
            tracing::info!(
                "Would disable in {}: {}",
                path.display(),
                rules.iter().collect::<Vec<_>>().join(", ")
            );
            return Ok(FileOutcome::WouldAnnotate {
                rule_count: rules.len(),
            });
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| MuterError::read(path, e))?;

        if content.starts_with("#!") {
            tracing::warn!("{} starts with a shebang; the header is placed above it", path.display());
        }

        let mut updated = build_header(&self.prefix, &rules);
        updated.push_str(&content);

        tokio::fs::write(path, updated)
            .await
            .map_err(|e| MuterError::write(path, e))?;

        tracing::debug!("Processing file: {}", path.display());
        Ok(FileOutcome::Annotated {
            rule_count: rules.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_header_layout() {
        let rules: RuleSet = ["no-unused-vars", "eqeqeq"].into_iter().collect();
        assert_eq!(
            build_header("TODO: Fix later.", &rules),
            "// TODO: Fix later.\n/* eslint-disable no-unused-vars */\n/* eslint-disable eqeqeq */\n"
        );
    }

    #[test]
    fn test_header_has_no_duplicate_rules() {
        let rules: RuleSet = ["semi", "semi", "quotes", "semi"].into_iter().collect();
        let header = build_header("x", &rules);
        assert_eq!(header.matches("eslint-disable semi ").count(), 1);
        assert_eq!(header.lines().count(), 3);
    }

    #[test]
    fn test_line_comment_extensions() {
        assert!(uses_line_comments(Path::new("src/app.js")));
        assert!(uses_line_comments(Path::new("src/App.TSX")));
        assert!(!uses_line_comments(Path::new("styles/app.css")));
        assert!(!uses_line_comments(Path::new("Makefile")));
    }

    #[tokio::test]
    async fn test_clean_file_left_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("b.js");
        fs::write(&file, "export const b = 1;\n").unwrap();
        let before = fs::read(&file).unwrap();

        let outcome = Annotator::new("TODO: Fix later.")
            .annotate(&file, RuleSet::new())
            .await
            .unwrap();

        assert_eq!(outcome, FileOutcome::Clean);
        assert_eq!(fs::read(&file).unwrap(), before);
    }

    #[tokio::test]
    async fn test_header_prepended_to_original_content() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.js");
        let original = "const unused = 1;\nconsole.log('hi');\n";
        fs::write(&file, original).unwrap();

        let rules: RuleSet = ["no-unused-vars"].into_iter().collect();
        let outcome = Annotator::new("TODO: Fix later.")
            .annotate(&file, rules.clone())
            .await
            .unwrap();

        assert_eq!(outcome, FileOutcome::Annotated { rule_count: 1 });
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            format!("{}{}", build_header("TODO: Fix later.", &rules), original)
        );
    }

    #[tokio::test]
    async fn test_dry_run_does_not_write() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.js");
        fs::write(&file, "var a;\n").unwrap();

        let rules: RuleSet = ["no-unused-vars", "no-var"].into_iter().collect();
        let outcome = Annotator::new("x")
            .with_dry_run(true)
            .annotate(&file, rules)
            .await
            .unwrap();

        assert_eq!(outcome, FileOutcome::WouldAnnotate { rule_count: 2 });
        assert_eq!(fs::read_to_string(&file).unwrap(), "var a;\n");
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let rules: RuleSet = ["semi"].into_iter().collect();

        let result = Annotator::new("x")
            .annotate(&temp_dir.path().join("gone.js"), rules)
            .await;

        assert!(matches!(
            result,
            Err(MuterError::FileIo { action: "read", .. })
        ));
    }
}

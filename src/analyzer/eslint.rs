//! ESLint adapter - runs the project's own ESLint binary one file at a time
//!
//! The engine is located once per run in the project's `node_modules/.bin` and
//! then invoked as an independent subprocess per file, so concurrent calls share
//! nothing but the immutable executable path.

use crate::analyzer::LintEngine;
use crate::domain::violations::{MuterError, MuterResult, RuleSet};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

/// One entry of ESLint's `--format json` output
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileReport {
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Message {
    rule_id: Option<String>,
    #[serde(default)]
    fatal: bool,
    #[serde(default)]
    message: String,
}

/// Linting engine backed by the target project's ESLint installation
#[derive(Debug, Clone)]
pub struct EslintEngine {
    executable: PathBuf,
    project_root: PathBuf,
    version: String,
}

impl EslintEngine {
    /// Name of the package that must be installed in the target project
    pub const DEPENDENCY: &'static str = "eslint";

    /// Where the project-local ESLint binary is expected
    pub fn executable_path(project_root: &Path) -> PathBuf {
        let bin = if cfg!(windows) { "eslint.cmd" } else { "eslint" };
        project_root.join("node_modules").join(".bin").join(bin)
    }

    /// Locate and probe ESLint; fails with `LintEngineUnavailable` if it cannot run
    pub async fn locate(project_root: impl Into<PathBuf>) -> MuterResult<Self> {
        let project_root = project_root.into();
        let executable = Self::executable_path(&project_root);

        if !executable.is_file() {
            return Err(MuterError::engine_unavailable(
                Self::DEPENDENCY,
                &project_root,
                format!("{} does not exist", executable.display()),
            ));
        }

        let output = Command::new(&executable)
            .arg("--version")
            .current_dir(&project_root)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                MuterError::engine_unavailable(
                    Self::DEPENDENCY,
                    &project_root,
                    format!("failed to run {}: {e}", executable.display()),
                )
            })?;

        if !output.status.success() {
            return Err(MuterError::engine_unavailable(
                Self::DEPENDENCY,
                &project_root,
                format!("version probe failed: {}", stderr_of(&output)),
            ));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::debug!("Using ESLint {} from {}", version, executable.display());

        Ok(Self {
            executable,
            project_root,
            version,
        })
    }

    /// Version string reported by `eslint --version`
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Extract the violated rule ids from ESLint's JSON report
    ///
    /// Messages without a rule id (parse errors, "file ignored" warnings) carry
    /// nothing to suppress and are dropped.
    pub fn parse_report(file: &Path, stdout: &[u8]) -> MuterResult<RuleSet> {
        let reports: Vec<FileReport> = serde_json::from_slice(stdout).map_err(|e| {
            MuterError::lint(
                file.display().to_string(),
                format!("unreadable ESLint output: {e}"),
            )
        })?;

        let mut rules = RuleSet::new();
        for message in reports.into_iter().flat_map(|report| report.messages) {
            match message.rule_id {
                Some(rule_id) => {
                    rules.insert(rule_id);
                }
                None if message.fatal => {
                    tracing::warn!(
                        "{} could not be linted ({}); leaving it unannotated",
                        file.display(),
                        message.message
                    );
                }
                None => {}
            }
        }

        Ok(rules)
    }
}

#[async_trait]
impl LintEngine for EslintEngine {
    fn name(&self) -> &str {
        Self::DEPENDENCY
    }

    async fn lint_file(&self, path: &Path) -> MuterResult<RuleSet> {
        let output = Command::new(&self.executable)
            .args(["--format", "json", "--no-error-on-unmatched-pattern"])
            .arg(path)
            .current_dir(&self.project_root)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                MuterError::lint(
                    path.display().to_string(),
                    format!("failed to run ESLint: {e}"),
                )
            })?;

        // 0: clean, 1: lint problems found, anything else: ESLint itself failed
        match output.status.code() {
            Some(0) | Some(1) => Self::parse_report(path, &output.stdout),
            Some(code) => Err(MuterError::lint(
                path.display().to_string(),
                format!("ESLint exited with status {code}: {}", stderr_of(&output)),
            )),
            None => Err(MuterError::lint(
                path.display().to_string(),
                "ESLint was terminated by a signal",
            )),
        }
    }
}

fn stderr_of(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        "no diagnostic output".to_string()
    } else {
        stderr
    }
}

//! Shared fixtures for unit tests: mock lint engines and a fake ESLint binary

use crate::analyzer::LintEngine;
use crate::domain::violations::{MuterError, MuterResult, RuleSet};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Engine answering from a fixed table keyed by file name
#[derive(Debug, Default)]
pub struct TableEngine {
    rules: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
}

impl TableEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, file_name: &str, rules: &[&str]) -> Self {
        self.rules.insert(
            file_name.to_string(),
            rules.iter().map(|r| r.to_string()).collect(),
        );
        self
    }

    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    pub fn panicking_on(mut self, file_name: &str) -> Self {
        self.panicking.insert(file_name.to_string());
        self
    }
}

#[async_trait]
impl LintEngine for TableEngine {
    fn name(&self) -> &str {
        "table"
    }

    async fn lint_file(&self, path: &Path) -> MuterResult<RuleSet> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.panicking.contains(&name) {
            panic!("engine crashed on {name}");
        }
        if self.failing.contains(&name) {
            return Err(MuterError::lint(name, "Parsing error: Unexpected token"));
        }

        Ok(self
            .rules
            .get(&name)
            .map(|rules| rules.iter().cloned().collect())
            .unwrap_or_default())
    }
}

/// Engine recording how many calls are in flight at once
#[derive(Debug)]
pub struct InstrumentedEngine {
    delay: Duration,
    in_flight: AtomicUsize,
    high_water: AtomicUsize,
    calls: AtomicUsize,
}

impl InstrumentedEngine {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn high_water_mark(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LintEngine for InstrumentedEngine {
    fn name(&self) -> &str {
        "instrumented"
    }

    async fn lint_file(&self, _path: &Path) -> MuterResult<RuleSet> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(RuleSet::new())
    }
}

/// Write a file and mark it executable
#[cfg(unix)]
pub fn write_executable(path: &Path, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, script).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Install `node_modules/.bin/eslint` as a shell script
///
/// The script answers `--version` with `v8.57.0`; otherwise `body` runs with the
/// linted path in `$last`.
#[cfg(unix)]
pub fn install_fake_eslint(project_root: &Path, body: &str) {
    let bin = project_root.join("node_modules").join(".bin");
    fs::create_dir_all(&bin).unwrap();

    let script = format!(
        "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then echo v8.57.0; exit 0; fi\nfor last; do :; done\n{body}"
    );
    write_executable(&bin.join("eslint"), &script);
}

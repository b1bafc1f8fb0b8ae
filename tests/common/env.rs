//! Test environment for running the revdeploy binary.
//!
//! Provides `TestEnv` - a temp working directory holding `revdeploy.toml`,
//! plus helpers to run CLI commands against it.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Result of running a revdeploy CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Parse every non-empty stdout line as JSON
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .unwrap_or_else(|e| panic!("not JSON: {line}: {e}\n{}", self.stdout))
            })
            .collect()
    }
}

/// Isolated working directory with a config file
pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Write `revdeploy.toml` in the working directory
    pub fn write_config(&self, content: &str) -> &Self {
        std::fs::write(self.path("revdeploy.toml"), content).unwrap();
        self
    }

    /// Config deploying `repo` to a local directory remote named `production`
    pub fn with_local_remote(&self, repo: &Path, remote_root: &Path) -> &Self {
        self.write_config(&format!(
            r#"
[[project]]
name = "site"
path = '{}'

[[project.remote]]
name = "production"
adapter = "local"
[project.remote.local]
root = '{}'
"#,
            repo.display(),
            remote_root.display()
        ))
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        let output = Command::new(env!("CARGO_BIN_EXE_revdeploy"))
            .current_dir(self.root.path())
            .env_remove("REVDEPLOY_CONFIG")
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("Failed to execute revdeploy");

        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

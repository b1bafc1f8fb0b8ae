//! Git command runner
//!
//! Invokes the `git` binary against one repository. Every failure to spawn
//! or unexpected exit status becomes `SourceError::BackendUnavailable`.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::trace;

use crate::domain::ports::{SourceError, SourceResult};

/// Runs git subcommands with the repository as working directory
#[derive(Debug, Clone)]
pub struct Git {
    repo: PathBuf,
}

impl Git {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    fn output(&self, args: &[&str]) -> SourceResult<Output> {
        trace!(repo = %self.repo.display(), ?args, "git");
        Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SourceError::BackendUnavailable(format!("failed to run git: {}", e)))
    }

    /// Run and return raw stdout; non-zero exit is an error
    pub fn run(&self, args: &[&str]) -> SourceResult<Vec<u8>> {
        let output = self.output(args)?;
        if !output.status.success() {
            return Err(failure(args, &output));
        }
        Ok(output.stdout)
    }

    /// Run and return stdout as (lossy) UTF-8 text
    pub fn run_text(&self, args: &[&str]) -> SourceResult<String> {
        let stdout = self.run(args)?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    /// Whether a revision expression names an existing commit
    ///
    /// `rev-parse --verify -q` exits 1 for an unknown name; anything else
    /// (e.g. 128 outside a repository) is a backend failure.
    pub fn verify_commit(&self, revision: &str) -> SourceResult<bool> {
        let spec = format!("{}^{{commit}}", revision);
        let args = ["rev-parse", "--verify", "-q", spec.as_str()];
        let output = self.output(&args)?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(failure(&args, &output)),
        }
    }
}

fn failure(args: &[&str], output: &Output) -> SourceError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    SourceError::BackendUnavailable(format!(
        "git {} failed ({}): {}",
        args.first().copied().unwrap_or_default(),
        output.status,
        stderr.trim()
    ))
}

//! SSH Remote Store
//!
//! Deploys to a remote host by running POSIX shell commands over `ssh`.
//! Each operation is one `ssh` invocation; file content is streamed through
//! stdin. `BatchMode` keeps ssh from prompting, and `ConnectTimeout` bounds
//! connection attempts.

use std::io::{self, Read, Write};
use std::process::{Command, Output, Stdio};

use tracing::{debug, trace};

use crate::domain::ports::{RemoteStore, StoreError, StoreOperation, StoreResult};
use crate::domain::value_objects::{RepoPath, RevisionId};

/// Exit status ssh itself uses for connection-level failures
const SSH_CONNECTION_FAILURE: i32 = 255;

/// Default connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// Why an ssh invocation failed
#[derive(Debug)]
enum SshFailure {
    /// The `ssh` binary could not be started
    Spawn(io::Error),
    /// ssh could not connect or authenticate
    Connection(String),
    /// The remote command exited non-zero
    Command(String),
    /// Local content could not be streamed to the remote command
    Input(io::Error),
}

impl SshFailure {
    fn from_exit(code: Option<i32>, stderr: &[u8]) -> Self {
        let stderr = String::from_utf8_lossy(stderr).trim().to_string();
        match code {
            Some(SSH_CONNECTION_FAILURE) | None => SshFailure::Connection(stderr),
            Some(_) => SshFailure::Command(stderr),
        }
    }

    fn into_store_error(self, operation: StoreOperation, path: &dyn std::fmt::Display) -> StoreError {
        match self {
            SshFailure::Spawn(e) => StoreError::Unreachable(format!("failed to run ssh: {}", e)),
            SshFailure::Connection(stderr) if is_auth_failure(&stderr) => {
                StoreError::AuthFailed(stderr)
            }
            SshFailure::Connection(stderr) => StoreError::Unreachable(stderr),
            SshFailure::Command(stderr) => StoreError::transfer(operation, path, stderr),
            SshFailure::Input(e) => {
                StoreError::transfer(operation, path, format!("cannot stream local content: {}", e))
            }
        }
    }
}

fn is_auth_failure(stderr: &str) -> bool {
    stderr.contains("Permission denied") || stderr.contains("Host key verification failed")
}

/// Remote store on a host reachable with `ssh`
pub struct SshStore {
    /// SSH destination (user@host or host alias)
    destination: String,
    /// Absolute or home-relative directory on the remote host
    root: String,
    marker: RepoPath,
    port: Option<u16>,
    connect_timeout: u64,
}

impl SshStore {
    pub fn new(destination: impl Into<String>, root: impl Into<String>, marker: RepoPath) -> Self {
        Self {
            destination: destination.into(),
            root: root.into(),
            marker,
            port: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    pub fn with_connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout = seconds;
        self
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Remote location of a repository path, shell-quoted
    fn remote(&self, path: &RepoPath) -> String {
        quote(&join_remote(&self.root, path.as_str()))
    }

    fn remote_parent(&self, path: &RepoPath) -> String {
        match path.parent() {
            Some(parent) => self.remote(&parent),
            None => quote(&self.root),
        }
    }

    /// Shell fragment removing emptied ancestors of `path`, nearest first
    fn prune_script(&self, path: &RepoPath) -> String {
        let removals: Vec<String> = path
            .ancestors()
            .map(|dir| format!("rmdir {}", self.remote(&dir)))
            .collect();
        if removals.is_empty() {
            return String::from("true");
        }
        format!("{{ {}; }} 2>/dev/null; true", removals.join(" && "))
    }

    fn ssh_command(&self, script: &str) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg(format!("ConnectTimeout={}", self.connect_timeout));
        if let Some(port) = self.port {
            cmd.arg("-p").arg(port.to_string());
        }
        cmd.arg(&self.destination).arg(script);
        cmd
    }

    /// Run a shell script on the remote host, optionally streaming stdin
    fn run(&self, script: &str, input: Option<&mut dyn Read>) -> Result<Vec<u8>, SshFailure> {
        trace!(destination = %self.destination, script, "ssh");
        let mut child = self
            .ssh_command(script)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(SshFailure::Spawn)?;

        let mut streamed = Ok(());
        if let Some(input) = input {
            if let Some(mut stdin) = child.stdin.take() {
                streamed = io::copy(input, &mut stdin).and_then(|_| stdin.flush());
            }
        }

        let output = child.wait_with_output().map_err(SshFailure::Spawn)?;
        settle(output, streamed)
    }

    fn exec(
        &self,
        operation: StoreOperation,
        path: &RepoPath,
        script: &str,
        input: Option<&mut dyn Read>,
    ) -> StoreResult<Vec<u8>> {
        self.run(script, input)
            .map_err(|failure| failure.into_store_error(operation, path))
    }
}

impl RemoteStore for SshStore {
    fn display_name(&self) -> String {
        format!("ssh:{}:{}", self.destination, self.root)
    }

    fn init(&mut self) -> StoreResult<()> {
        let script = format!("mkdir -p {}", quote(&self.root));
        self.run(&script, None).map_err(|failure| match failure {
            SshFailure::Command(stderr) => {
                StoreError::Unreachable(format!("cannot prepare {}: {}", self.root, stderr))
            }
            other => other.into_store_error(StoreOperation::Put, &self.root),
        })?;
        debug!(destination = %self.destination, root = %self.root, "ssh store ready");
        Ok(())
    }

    fn get_marker(&mut self) -> StoreResult<Option<RevisionId>> {
        let marker = self.remote(&self.marker);
        let script = format!("if [ -f {m} ]; then cat {m}; fi", m = marker);
        let content = self.exec(StoreOperation::ReadMarker, &self.marker, &script, None)?;
        Ok(RevisionId::parse(&String::from_utf8_lossy(&content)))
    }

    fn put_marker(&mut self, revision: &RevisionId) -> StoreResult<()> {
        let marker = self.remote(&self.marker);
        let tmp = quote(&format!(
            "{}.tmp",
            join_remote(&self.root, self.marker.as_str())
        ));
        let script = format!(
            "mkdir -p {} && cat > {} && mv -f {} {}",
            self.remote_parent(&self.marker),
            tmp,
            tmp,
            marker
        );
        let mut content = revision.as_str().as_bytes();
        self.exec(
            StoreOperation::WriteMarker,
            &self.marker,
            &script,
            Some(&mut content),
        )?;
        Ok(())
    }

    fn put(&mut self, content: &mut dyn Read, destination: &RepoPath) -> StoreResult<()> {
        let script = format!(
            "mkdir -p {} && cat > {}",
            self.remote_parent(destination),
            self.remote(destination)
        );
        self.exec(StoreOperation::Put, destination, &script, Some(content))?;
        debug!(path = %destination, "ssh put");
        Ok(())
    }

    fn copy(&mut self, source: &RepoPath, destination: &RepoPath) -> StoreResult<()> {
        let script = format!(
            "if [ -f {src} ]; then mkdir -p {parent} && cp -f {src} {dst}; fi",
            src = self.remote(source),
            parent = self.remote_parent(destination),
            dst = self.remote(destination)
        );
        self.exec(StoreOperation::Copy, source, &script, None)?;
        Ok(())
    }

    fn rename(&mut self, source: &RepoPath, destination: &RepoPath) -> StoreResult<()> {
        let script = format!(
            "if [ -e {src} ]; then mkdir -p {parent} && mv -f {src} {dst} && {prune}; \
             elif [ ! -e {dst} ]; then echo 'source does not exist' >&2; exit 3; fi",
            src = self.remote(source),
            parent = self.remote_parent(destination),
            dst = self.remote(destination),
            prune = self.prune_script(source)
        );
        self.exec(StoreOperation::Rename, source, &script, None)?;
        Ok(())
    }

    fn unlink(&mut self, path: &RepoPath) -> StoreResult<()> {
        let script = format!("rm -f {} && {}", self.remote(path), self.prune_script(path));
        self.exec(StoreOperation::Unlink, path, &script, None)?;
        Ok(())
    }

    fn clean_up(&mut self) {
        // every operation is its own ssh session
        trace!(destination = %self.destination, "ssh store released");
    }
}

/// Outcome of one ssh session
///
/// A non-zero exit wins over a streaming error, since a remote that dies
/// mid-transfer also breaks the pipe. A streaming error after a clean exit
/// means the remote received truncated content.
fn settle(output: Output, streamed: io::Result<()>) -> Result<Vec<u8>, SshFailure> {
    if !output.status.success() {
        return Err(SshFailure::from_exit(output.status.code(), &output.stderr));
    }
    streamed.map_err(SshFailure::Input)?;
    Ok(output.stdout)
}

/// Join a remote root and a relative path with `/`
fn join_remote(root: &str, path: &str) -> String {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", root, path)
    }
}

/// Quote a string for safe use in POSIX shell commands
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

//! Scratch git repositories for integration tests.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Commit id recorded for test submodules; never resolved
const GITLINK_COMMIT: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// A git repository in a temp directory, on branch `main`
pub struct GitRepo {
    dir: TempDir,
}

impl GitRepo {
    pub fn new() -> Self {
        let repo = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        repo.git(&["init", "-q"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run git in the repository, panicking on failure, returning stdout
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .arg("-C")
            .arg(self.path())
            .args([
                "-c",
                "user.name=Test Author",
                "-c",
                "user.email=author@example.com",
                "-c",
                "commit.gpgsign=false",
            ])
            .args(args)
            .env("GIT_AUTHOR_DATE", "1700000000 +0000")
            .env("GIT_COMMITTER_DATE", "1700000000 +0000")
            .output()
            .expect("git must be installed to run integration tests");
        assert!(
            output.status.success(),
            "git {:?} failed:\n{}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    pub fn file_path(&self, relative: &str) -> PathBuf {
        self.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.file_path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
        self
    }

    pub fn remove(&self, relative: &str) -> &Self {
        self.git(&["rm", "-q", relative]);
        self
    }

    pub fn rename(&self, from: &str, to: &str) -> &Self {
        if let Some(parent) = self.file_path(to).parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        self.git(&["mv", from, to]);
        self
    }

    /// Stage everything and commit, returning the new commit id
    pub fn commit(&self, message: &str) -> String {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "-m", message]);
        self.head()
    }

    /// Record a submodule commit at `relative` without cloning anything
    ///
    /// The empty directory keeps `add -A` from staging the entry's removal.
    pub fn add_gitlink(&self, relative: &str) -> &Self {
        std::fs::create_dir_all(self.file_path(relative)).unwrap();
        let info = format!("160000,{},{}", GITLINK_COMMIT, relative);
        self.git(&["update-index", "--add", "--cacheinfo", &info]);
        self
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    pub fn checkout_new_branch(&self, name: &str) -> &Self {
        self.git(&["checkout", "-q", "-b", name]);
        self
    }

    pub fn checkout(&self, name: &str) -> &Self {
        self.git(&["checkout", "-q", name]);
        self
    }
}

/// Two commits exercising every bucket
///
/// First commit: `file1.txt`..`file4.txt` with distinct contents.
/// Second commit: `file1.txt` modified, `copy/file2.txt` added as an exact
/// copy of `file2.txt`, `file3.txt` renamed to `renamed.txt`, `file4.txt`
/// deleted.
pub struct DeltaFixture {
    pub repo: GitRepo,
    pub first: String,
    pub second: String,
}

impl DeltaFixture {
    pub fn new() -> Self {
        let repo = GitRepo::new();
        repo.write("file1.txt", "first file\n")
            .write("file2.txt", "second file, copied later\n")
            .write("file3.txt", "third file, renamed later\n")
            .write("file4.txt", "fourth file, deleted later\n");
        let first = repo.commit("initial");

        repo.write("file1.txt", "first file, edited\n")
            .write("copy/file2.txt", "second file, copied later\n")
            .rename("file3.txt", "renamed.txt")
            .remove("file4.txt");
        let second = repo.commit("delta");

        Self {
            repo,
            first,
            second,
        }
    }
}

//! Interrupted deployments resume on the next run.

use std::fs;
use std::path::Path;

use crate::common::{list_files, GitRepo};
use revdeploy::domain::ports::RemoteStore;
use revdeploy::infrastructure::{GitRevisionSource, LocalDirStore};
use revdeploy::{DeployError, DeployState, Deployment, Project, RepoPath, Workspace};

fn workspace(repo: &Path, remote_root: &Path) -> Workspace {
    Workspace::new().with_project(
        Project::new("site", Box::new(GitRevisionSource::new(repo))).with_remote(
            "production",
            Box::new(LocalDirStore::new(
                remote_root,
                RepoPath::new(".revision").unwrap(),
            )),
        ),
    )
}

#[test]
fn failed_upload_keeps_old_marker_and_next_run_converges() {
    let repo = GitRepo::new();
    repo.write("a.txt", "a1\n").write("b.txt", "b1\n");
    let first = repo.commit("one");
    let remote = tempfile::tempdir().unwrap();
    let mut ws = workspace(repo.path(), remote.path());
    Deployment::new(&mut ws).start().unwrap();

    repo.write("a.txt", "a2\n").write("b.txt", "b2\n");
    let second = repo.commit("two");

    // a directory where a file should go makes the upload fail
    fs::remove_file(remote.path().join("b.txt")).unwrap();
    fs::create_dir(remote.path().join("b.txt")).unwrap();

    let mut deployment = Deployment::new(&mut ws);
    let err = deployment.start().unwrap_err();
    assert!(matches!(err, DeployError::Transfer { .. }), "{err}");
    assert_eq!(deployment.state(), DeployState::Failed);
    drop(deployment);

    assert_eq!(
        fs::read_to_string(remote.path().join(".revision")).unwrap(),
        first
    );
    assert_eq!(
        fs::read_to_string(remote.path().join("a.txt")).unwrap(),
        "a2\n"
    );

    fs::remove_dir(remote.path().join("b.txt")).unwrap();
    Deployment::new(&mut ws).start().unwrap();

    assert_eq!(
        fs::read_to_string(remote.path().join("b.txt")).unwrap(),
        "b2\n"
    );
    assert_eq!(
        fs::read_to_string(remote.path().join(".revision")).unwrap(),
        second
    );
}

#[test]
fn locked_remote_is_unreachable_until_released() {
    let repo = GitRepo::new();
    repo.write("a.txt", "a\n");
    repo.commit("one");
    let remote = tempfile::tempdir().unwrap();
    let mut ws = workspace(repo.path(), remote.path());

    let mut other = LocalDirStore::new(remote.path(), RepoPath::new(".revision").unwrap());
    other.init().unwrap();

    let err = Deployment::new(&mut ws).start().unwrap_err();
    assert!(matches!(err, DeployError::RemoteUnreachable(_)), "{err}");
    assert!(!remote.path().join("a.txt").exists());

    other.clean_up();
    Deployment::new(&mut ws).start().unwrap();
    assert_eq!(list_files(remote.path()), vec![".revdeploy.lock", ".revision", "a.txt"]);
}

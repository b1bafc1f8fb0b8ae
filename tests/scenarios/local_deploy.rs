//! First install followed by incremental updates into a local directory.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::common::{list_files, DeltaFixture, GitRepo};
use revdeploy::domain::ports::{DeployEvent, DeploymentObserver};
use revdeploy::infrastructure::{GitRevisionSource, LocalDirStore};
use revdeploy::{
    ChangeStats, DeployMode, DeployOutcome, Deployment, Project, ProjectTarget, RepoPath,
    RevisionId, Workspace,
};

const MARKER: &str = ".revision";

fn workspace(repo: &Path, remote_root: &Path) -> Workspace {
    Workspace::new().with_project(
        Project::new("site", Box::new(GitRevisionSource::new(repo))).with_remote(
            "production",
            Box::new(LocalDirStore::new(
                remote_root,
                RepoPath::new(MARKER).unwrap(),
            )),
        ),
    )
}

fn deploy(workspace: &mut Workspace, install: bool) -> DeployOutcome {
    let mut deployment = Deployment::new(workspace);
    deployment.set_install(install);
    deployment.start().unwrap()
}

fn marker(remote_root: &Path) -> String {
    fs::read_to_string(remote_root.join(MARKER)).unwrap()
}

/// Deployed files, excluding bookkeeping
fn deployed(remote_root: &Path) -> Vec<String> {
    list_files(remote_root)
        .into_iter()
        .filter(|f| f != MARKER && f != ".revdeploy.lock")
        .collect()
}

struct EventNames(Mutex<Vec<&'static str>>);

impl DeploymentObserver for EventNames {
    fn on_event(&self, event: &DeployEvent) {
        self.0.lock().unwrap().push(event.name());
    }
}

#[test]
fn first_deploy_installs_the_newest_tree() {
    let fixture = DeltaFixture::new();
    let remote = tempfile::tempdir().unwrap();
    let mut ws = workspace(fixture.repo.path(), remote.path());

    let outcome = deploy(&mut ws, false);

    let report = outcome.report().unwrap();
    assert_eq!(report.mode, DeployMode::Install);
    assert_eq!(report.baseline, RevisionId::parse(&fixture.first));
    assert_eq!(report.deployed, RevisionId::parse(&fixture.second));
    assert_eq!(report.stats.added, 4);

    assert_eq!(
        deployed(remote.path()),
        vec!["copy/file2.txt", "file1.txt", "file2.txt", "renamed.txt"]
    );
    assert_eq!(marker(remote.path()), fixture.second);
}

#[test]
fn incremental_deploy_replays_each_bucket() {
    let fixture = DeltaFixture::new();
    let remote = tempfile::tempdir().unwrap();
    fixture.repo.checkout(&fixture.first);

    // deploy the first commit from a detached HEAD, then move back to main
    let mut ws = workspace(fixture.repo.path(), remote.path());
    deploy(&mut ws, false);
    assert_eq!(marker(remote.path()), fixture.first);
    assert_eq!(
        deployed(remote.path()),
        vec!["file1.txt", "file2.txt", "file3.txt", "file4.txt"]
    );
    fixture.repo.checkout("main");

    let outcome = deploy(&mut ws, false);

    let report = outcome.report().unwrap();
    assert_eq!(report.mode, DeployMode::Update);
    assert_eq!(
        report.stats,
        ChangeStats {
            added: 0,
            modified: 1,
            copied: 1,
            renamed: 1,
            deleted: 1,
        }
    );
    assert_eq!(
        deployed(remote.path()),
        vec!["copy/file2.txt", "file1.txt", "file2.txt", "renamed.txt"]
    );
    assert_eq!(
        fs::read_to_string(remote.path().join("file1.txt")).unwrap(),
        "first file, edited\n"
    );
    assert_eq!(
        fs::read_to_string(remote.path().join("copy/file2.txt")).unwrap(),
        "second file, copied later\n"
    );
    assert_eq!(marker(remote.path()), fixture.second);
}

#[test]
fn unchanged_repository_is_up_to_date() {
    let fixture = DeltaFixture::new();
    let remote = tempfile::tempdir().unwrap();
    let mut ws = workspace(fixture.repo.path(), remote.path());
    deploy(&mut ws, false);

    let names = Arc::new(EventNames(Mutex::new(Vec::new())));
    let mut deployment = Deployment::new(&mut ws);
    deployment.add_observer(names.clone());
    let outcome = deployment.start().unwrap();
    drop(deployment);

    assert_eq!(
        outcome,
        DeployOutcome::UpToDate {
            revision: RevisionId::parse(&fixture.second).unwrap()
        }
    );
    assert_eq!(*names.0.lock().unwrap(), vec!["start", "up_to_date", "end"]);
}

#[test]
fn install_flag_redeploys_over_existing_marker() {
    let fixture = DeltaFixture::new();
    let remote = tempfile::tempdir().unwrap();
    let mut ws = workspace(fixture.repo.path(), remote.path());
    deploy(&mut ws, false);
    fs::remove_file(remote.path().join("file1.txt")).unwrap();

    let outcome = deploy(&mut ws, true);

    assert_eq!(outcome.report().unwrap().mode, DeployMode::Install);
    assert!(remote.path().join("file1.txt").is_file());
}

#[test]
fn long_lived_workspace_sees_new_commits() {
    let repo = GitRepo::new();
    repo.write("index.html", "v1\n");
    repo.commit("v1");
    let remote = tempfile::tempdir().unwrap();
    let mut ws = workspace(repo.path(), remote.path());
    deploy(&mut ws, false);

    repo.write("index.html", "v2\n").write("assets/app.js", "js\n");
    let head = repo.commit("v2");
    let outcome = deploy(&mut ws, false);

    let stats = outcome.report().unwrap().stats;
    assert_eq!((stats.added, stats.modified), (1, 1));
    assert_eq!(marker(remote.path()), head);
    assert_eq!(
        fs::read_to_string(remote.path().join("index.html")).unwrap(),
        "v2\n"
    );
}

#[test]
fn deleting_the_last_file_prunes_its_directory() {
    let repo = GitRepo::new();
    repo.write("keep.txt", "k\n").write("old/deep/gone.txt", "g\n");
    repo.commit("one");
    let remote = tempfile::tempdir().unwrap();
    let mut ws = workspace(repo.path(), remote.path());
    deploy(&mut ws, false);
    assert!(remote.path().join("old/deep/gone.txt").is_file());

    repo.remove("old/deep/gone.txt");
    repo.commit("two");
    deploy(&mut ws, false);

    assert!(!remote.path().join("old").exists());
    assert_eq!(deployed(remote.path()), vec!["keep.txt"]);
}

#[test]
fn deploys_selected_branch() {
    let fixture = DeltaFixture::new();
    fixture.repo.checkout_new_branch("release");
    fixture.repo.write("release-notes.md", "notes\n");
    let release_head = fixture.repo.commit("notes");
    fixture.repo.checkout("main");

    let remote = tempfile::tempdir().unwrap();
    let mut ws = workspace(fixture.repo.path(), remote.path());
    let mut deployment =
        Deployment::for_target(&mut ws, ProjectTarget::new(0, 0).with_branch("release")).unwrap();
    deployment.start().unwrap();
    drop(deployment);

    assert!(remote.path().join("release-notes.md").is_file());
    assert_eq!(marker(remote.path()), release_head);
}

#[test]
fn empty_repository_deploys_nothing() {
    let repo = GitRepo::new();
    let remote = tempfile::tempdir().unwrap();
    let mut ws = workspace(repo.path(), remote.path());

    let outcome = deploy(&mut ws, false);

    let report = outcome.report().unwrap();
    assert_eq!(report.deployed, None);
    assert!(!report.has_changes());
    assert!(!remote.path().join(MARKER).exists());
}

#[test]
fn update_of_file_with_quoted_name_reaches_remote() {
    let repo = GitRepo::new();
    repo.write("say\"hi\".txt", "hello\n");
    repo.commit("one");
    let remote = tempfile::tempdir().unwrap();
    deploy(&mut workspace(repo.path(), remote.path()), false);

    repo.write("say\"hi\".txt", "hello again\n");
    let head = repo.commit("two");
    let outcome = deploy(&mut workspace(repo.path(), remote.path()), false);

    assert_eq!(outcome.report().unwrap().mode, DeployMode::Update);
    assert_eq!(
        fs::read_to_string(remote.path().join("say\"hi\".txt")).unwrap(),
        "hello again\n"
    );
    assert_eq!(marker(remote.path()), head);
}

#[test]
fn repository_with_submodule_installs_its_files() {
    let repo = GitRepo::new();
    repo.write("top.txt", "top\n").add_gitlink("vendor/lib");
    let head = repo.commit("with submodule");
    let remote = tempfile::tempdir().unwrap();

    let outcome = deploy(&mut workspace(repo.path(), remote.path()), false);

    assert_eq!(outcome.report().unwrap().stats.added, 1);
    assert_eq!(deployed(remote.path()), vec!["top.txt"]);
    assert_eq!(marker(remote.path()), head);
}
